use crate::{PlanError, SessionSummary, StateSurvey, StorageError, WorkoutLog};

pub const NO_FEEDBACK_NOTE: &str = "No specific feedback from previous session recorded.";

/// Sends the system instruction and the serialized context to a language model and returns the
/// unprocessed response text.
#[allow(async_fn_in_trait)]
pub trait PlanGenerator {
    fn name(&self) -> &str;
    async fn request_plan(
        &self,
        system_instruction: &str,
        context: &PlanContext,
    ) -> Result<String, StorageError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanContext {
    pub recent_target_logs: Vec<SessionSummary>,
    pub recent_other_logs: Vec<WorkoutLog>,
    pub state_survey: StateSurvey,
    pub user_feedback: UserFeedback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFeedback {
    pub note: String,
}

impl Default for UserFeedback {
    fn default() -> Self {
        Self {
            note: NO_FEEDBACK_NOTE.to_string(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GenerationError {
    #[error("plan generation already in progress")]
    InProgress,
    #[error("plan request failed: {0}")]
    Request(StorageError),
    #[error("plan response is empty")]
    EmptyResponse,
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Failed generation together with the response text, if any was received.
#[derive(Debug)]
pub struct GenerationFailure {
    pub error: GenerationError,
    pub raw_content: Option<String>,
}

impl From<GenerationError> for GenerationFailure {
    fn from(error: GenerationError) -> Self {
        Self {
            error,
            raw_content: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_generation_error_display() {
        assert_eq!(
            GenerationError::Request(StorageError::NoConnection).to_string(),
            "plan request failed: no connection"
        );
        assert_eq!(
            GenerationError::from(PlanError::Empty).to_string(),
            "no exercises found in the plan"
        );
    }

    #[test]
    fn test_user_feedback_default() {
        assert_eq!(
            UserFeedback::default().note,
            "No specific feedback from previous session recorded."
        );
    }
}
