/// Keyword routing of chat messages to intents
use regex::Regex;

/// What a chat message is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Curriculum,
    TakenCourses,
    MissingRequired,
    CreditsNextSemester,
    RecommendedClasses,
    AvailableProfessors,
    ClassLocations,
    CurriculumOverview,
    Scenario,
    Schedule,
    Help,
}

/// Matches lower-cased messages against intent patterns, first match wins.
pub struct IntentRouter {
    routes: Vec<(Intent, Regex)>,
}

impl IntentRouter {
    pub fn new() -> Result<Self, regex::Error> {
        let patterns: [(Intent, &str); 10] = [
            (Intent::Curriculum, r"what is my curricul"),
            (Intent::TakenCourses, r"have i already taken"),
            (Intent::MissingRequired, r"missing any required"),
            (
                Intent::CreditsNextSemester,
                r"how many credits do i need for next semester",
            ),
            (
                Intent::RecommendedClasses,
                r"what classes should i take next semester",
            ),
            (Intent::AvailableProfessors, r"which professors are available"),
            (
                Intent::ClassLocations,
                r"where are classes|where is this|where are the classes",
            ),
            (Intent::CurriculumOverview, r"\b(?:curriculum|major|degree)\b"),
            (
                Intent::Scenario,
                r"\b(?:scenario|juggling|what am i working|my focus)\b",
            ),
            (Intent::Schedule, r"\b(?:due|schedule|week|tomorrow|today)\b"),
        ];

        let routes = patterns
            .into_iter()
            .map(|(intent, pattern)| Regex::new(pattern).map(|re| (intent, re)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { routes })
    }

    /// Classifies a message; anything unmatched falls back to [`Intent::Help`].
    pub fn classify(&self, message: &str) -> Intent {
        let message = message.to_lowercase();
        self.routes
            .iter()
            .find(|(_, re)| re.is_match(&message))
            .map(|(intent, _)| *intent)
            .unwrap_or(Intent::Help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_questions() {
        let router = IntentRouter::new().unwrap();

        let cases = [
            ("What is my curriculam?", Intent::Curriculum),
            ("What classes have I already taken so far?", Intent::TakenCourses),
            (
                "Am I missing any required classes from the curriculam?",
                Intent::MissingRequired,
            ),
            (
                "How many credits do I need for next semester?",
                Intent::CreditsNextSemester,
            ),
            (
                "What classes should I take next semester?",
                Intent::RecommendedClasses,
            ),
            (
                "Which professors are available for the classes am taking?",
                Intent::AvailableProfessors,
            ),
            ("Where are classes located?", Intent::ClassLocations),
            ("Tell me about my major", Intent::CurriculumOverview),
            ("Tell me my scenario", Intent::Scenario),
            ("What's due this week?", Intent::Schedule),
            ("Summarize my schedule for tomorrow", Intent::Schedule),
            ("hello there", Intent::Help),
        ];

        for (message, expected) in cases {
            assert_eq!(router.classify(message), expected, "{}", message);
        }
    }

    #[test]
    fn test_earlier_intents_win() {
        let router = IntentRouter::new().unwrap();

        // Mentions both "curriculum" and "week"
        assert_eq!(
            router.classify("How is my curriculum going this week?"),
            Intent::CurriculumOverview
        );
        // "major" only as part of another word
        assert_eq!(router.classify("majority rules"), Intent::Help);
    }
}
