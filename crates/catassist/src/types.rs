use std::time::Duration;
use thiserror::Error;

use crate::chat::{AssistantClient, AssistantError, IntentRouter};
use crate::config::AppConfig;
use crate::db::{AdvisorDb, DbError};
use crate::planner::PlanBuilder;
use crate::session::SessionStore;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Assistant(#[from] AssistantError),

    #[error("Invalid intent pattern: {0}")]
    Intent(#[from] regex::Error),
}

/// Everything a request handler needs, shared through `State<Arc<AppState>>`.
pub struct AppState {
    pub config: AppConfig,
    pub db: AdvisorDb,
    pub planner: PlanBuilder,
    pub sessions: SessionStore,
    pub intents: IntentRouter,
    pub assistant: AssistantClient,
}

impl AppState {
    /// Builds the state around an already opened database.
    pub fn new(config: AppConfig, db: AdvisorDb) -> Result<Self, StateError> {
        let planner = PlanBuilder::new(config.planner.clone());
        let sessions = SessionStore::new(Duration::from_secs(config.session_ttl_secs));
        let intents = IntentRouter::new()?;
        let assistant = AssistantClient::new(config.assistant.clone())?;

        Ok(Self {
            config,
            db,
            planner,
            sessions,
            intents,
            assistant,
        })
    }

    /// Opens the configured database file and builds the state.
    pub fn open(config: AppConfig) -> Result<Self, StateError> {
        let db = AdvisorDb::open(&config.database_path)?;
        Self::new(config, db)
    }
}
