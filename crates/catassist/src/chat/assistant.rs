//! Client for an OpenAI-compatible chat completion API.

use rand::Rng;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use url::Url;

use super::breaker::{BreakerStats, UpstreamBreaker};
use super::error::AssistantError;

const COMPLETIONS_PATH: &str = "chat/completions";

/// Reply used when the upstream answered without any message content.
pub const FALLBACK_REPLY: &str = "Sorry, I lost track of that!";

const SYSTEM_PROMPT: &str = "You are CatAssist, a friendly and helpful AI student assistant.
You remember previous messages in this conversation and maintain context.
You help users plan study sessions, summarize workloads, track deadlines,
and give supportive, realistic academic advice in a casual human tone.
Never repeat the same info unless the user asks for it again.
If context isn't enough, ask polite clarifying questions.";

/// Configuration for the assistant client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Base URL of the completion API, e.g. `https://api.openai.com/v1/`
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub system_prompt: String,
    /// Consecutive upstream failures before requests are refused
    pub breaker_threshold: u32,
    pub breaker_cooldown_secs: u64,
    /// Bearer key, only ever read from the environment
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.6,
            max_tokens: 500,
            timeout_secs: 30,
            system_prompt: SYSTEM_PROMPT.to_string(),
            breaker_threshold: 5,
            breaker_cooldown_secs: 30,
            api_key: None,
        }
    }
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<&'a ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: Option<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Whether the assistant can take requests, as reported by `GET /chat/status`.
#[derive(Debug, Clone, Serialize)]
pub struct AssistantStatus {
    pub configured: bool,
    pub model: String,
    pub breaker: BreakerStats,
}

/// Sends conversations to the completion API behind a circuit breaker.
pub struct AssistantClient {
    client: Client,
    endpoint: Url,
    config: AssistantConfig,
    system: ChatMessage,
    breaker: UpstreamBreaker,
}

impl AssistantClient {
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let mut base = config.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)?.join(COMPLETIONS_PATH)?;
        let system = ChatMessage::new("system", &config.system_prompt);
        let breaker = UpstreamBreaker::new(
            config.breaker_threshold,
            Duration::from_secs(config.breaker_cooldown_secs),
        );

        Ok(Self {
            client,
            endpoint,
            config,
            system,
            breaker,
        })
    }

    /// Returns true if an API key is present.
    pub fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    pub fn status(&self) -> AssistantStatus {
        AssistantStatus {
            configured: self.is_configured(),
            model: self.config.model.clone(),
            breaker: self.breaker.stats(),
        }
    }

    /// Asks the completion API to continue a conversation.
    ///
    /// The system persona is prepended to `messages`.
    pub async fn reply(&self, messages: &[ChatMessage]) -> Result<String, AssistantError> {
        let correlation_id = generate_correlation_id();

        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(AssistantError::NotConfigured),
        };

        if let Err(e) = self.breaker.check() {
            warn!(
                correlation_id = %correlation_id,
                error = %e,
                "Rejecting assistant request"
            );
            return Err(e);
        }

        if messages.is_empty() {
            return Err(AssistantError::InvalidRequest {
                message: "conversation has no messages".to_string(),
            });
        }

        info!(
            correlation_id = %correlation_id,
            turns = messages.len(),
            "Requesting assistant completion"
        );

        let start = Instant::now();
        let result = self.request_completion(api_key, messages).await;
        self.breaker.record(&result);

        match &result {
            Ok(_) => {
                info!(
                    correlation_id = %correlation_id,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Assistant completion succeeded"
                );
            }
            Err(e) => {
                error!(
                    correlation_id = %correlation_id,
                    error = %e,
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Assistant completion failed"
                );
            }
        }

        result
    }

    async fn request_completion(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
    ) -> Result<String, AssistantError> {
        let body = CompletionRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            messages: std::iter::once(&self.system).chain(messages).collect(),
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::UnexpectedResponse {
                message: format!(
                    "completion returned status {}: {}",
                    status,
                    text.chars().take(200).collect::<String>()
                ),
            });
        }

        let parsed: CompletionResponse =
            response
                .json()
                .await
                .map_err(|e| AssistantError::UnexpectedResponse {
                    message: format!("Failed to parse completion: {}", e),
                })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty());

        Ok(content.unwrap_or_else(|| FALLBACK_REPLY.to_string()))
    }
}

fn generate_correlation_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    let random: u32 = rand::thread_rng().gen();
    format!("{:x}-{:08x}", timestamp & 0xFFFFFFFF, random)
}
