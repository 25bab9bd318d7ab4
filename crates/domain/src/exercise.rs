use derive_more::{Deref, Display};

use crate::{BodyPart, BodyPartID, CreateError, ReadError};

#[allow(async_fn_in_trait)]
pub trait ExerciseLibraryRepository {
    async fn read_body_parts(&self) -> Result<Vec<BodyPart>, ReadError>;
    async fn read_library_exercises(&self, body_part: &BodyPart)
    -> Result<Vec<Exercise>, ReadError>;
    async fn find_library_exercise(
        &self,
        body_part: &BodyPart,
        name: &ExerciseName,
    ) -> Result<Option<Exercise>, ReadError>;
    async fn create_library_exercise(
        &self,
        body_part: &BodyPart,
        name: ExerciseName,
    ) -> Result<Exercise, CreateError>;
}

#[derive(Deref, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExerciseID(String);

impl From<String> for ExerciseID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ExerciseID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for ExerciseID {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exercise {
    pub id: ExerciseID,
    pub name: String,
    pub body_part: BodyPartID,
    pub kind: ExerciseKind,
}

impl Exercise {
    #[must_use]
    pub fn new(id: impl Into<ExerciseID>, name: impl Into<String>, body_part: BodyPartID) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            body_part,
            kind: ExerciseKind::Standard { suggestion: None },
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Suggestion) -> Self {
        self.kind = ExerciseKind::Standard {
            suggestion: Some(suggestion),
        };
        self
    }

    #[must_use]
    pub fn is_warmup(&self) -> bool {
        matches!(self.kind, ExerciseKind::Warmup { .. })
    }

    #[must_use]
    pub fn suggestion(&self) -> Option<&Suggestion> {
        match &self.kind {
            ExerciseKind::Standard { suggestion } => suggestion.as_ref(),
            ExerciseKind::Warmup { .. } => None,
        }
    }

    #[must_use]
    pub fn warmup_steps(&self) -> &[WarmupStep] {
        match &self.kind {
            ExerciseKind::Warmup { steps } => steps,
            ExerciseKind::Standard { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExerciseKind {
    Standard { suggestion: Option<Suggestion> },
    /// Read-only list of preparatory movements, never logged or persisted.
    Warmup { steps: Vec<WarmupStep> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub sets: String,
    pub reps: String,
    pub weight: String,
    pub rpe: Option<String>,
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarmupStep {
    pub action: String,
    pub reps: String,
    pub note: Option<String>,
}

#[derive(Deref, Debug, Display, Clone, PartialEq, Eq)]
pub struct ExerciseName(String);

impl ExerciseName {
    pub const MAX_LEN: usize = 64;

    pub fn new(name: &str) -> Result<Self, ExerciseNameError> {
        let trimmed_name = name.trim();

        if trimmed_name.is_empty() {
            return Err(ExerciseNameError::Empty);
        }

        let len = trimmed_name.chars().count();

        if len > Self::MAX_LEN {
            return Err(ExerciseNameError::TooLong(len));
        }

        Ok(ExerciseName(trimmed_name.to_string()))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ExerciseNameError {
    #[error("Exercise name must not be empty")]
    Empty,
    #[error("Exercise name must be 64 characters or fewer ({0} > 64)")]
    TooLong(usize),
}
