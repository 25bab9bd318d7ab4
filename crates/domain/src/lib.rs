#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod catalog;

mod body_part;
mod error;
mod exercise;
mod generation;
mod history;
mod operation_log;
mod plan;
mod screen;
mod service;
mod survey;
mod training;
mod workout;

pub use body_part::{BodyPart, BodyPartID, default_body_parts};
pub use error::{CreateError, ReadError, StorageError};
pub use exercise::{
    Exercise, ExerciseID, ExerciseKind, ExerciseLibraryRepository, ExerciseName,
    ExerciseNameError, Suggestion, WarmupStep,
};
pub use generation::{
    GenerationError, GenerationFailure, NO_FEEDBACK_NOTE, PlanContext, PlanGenerator,
    UserFeedback,
};
pub use history::{
    BodyPartFilter, ExerciseSummary, History, HistoryConfig, LogQuery, LoggedSet,
    MAX_TARGET_SESSIONS, OtherHistory, SessionSummary, TargetHistory, WorkoutLog,
    WorkoutLogRepository, fetch_history, group_by_date,
};
pub use operation_log::{OperationLog, OperationLogEntry, preview};
pub use plan::{Plan, PlanDetails, PlanError, ROOT_KEY, WARMUP_ID, WARMUP_NAME, parse_plan};
pub use screen::{
    ExercisesScreen, FailedGeneration, GeneratingScreen, RateFatigueScreen, Screen,
    SetEditorScreen, SummaryScreen, SurveyScreen, TransitionError,
};
pub use service::Service;
pub use survey::{
    Diet, Doms, FatigueScore, FatigueScoreError, Feedback, FeedbackRepository,
    MANUAL_ENTRY_NOTE, OtherActivity, Sleep, StateSurvey, Stress,
};
pub use training::{
    RPE, RPEError, Reps, RepsError, SetID, SetLog, Weight, WeightError, extract_number,
};
pub use workout::{EditorExit, SetEditor, WorkoutSession};
