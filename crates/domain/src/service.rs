use std::cell::Cell;

use chrono::NaiveDate;
use log::{debug, error, info, warn};

use crate::{
    BodyPart, CreateError, Exercise, ExerciseLibraryRepository, ExerciseName, FatigueScore,
    Feedback, FeedbackRepository, GenerationError, GenerationFailure, HistoryConfig,
    OperationLog, Plan, PlanContext, PlanGenerator, ReadError, StateSurvey, UserFeedback,
    WorkoutLog, WorkoutLogRepository, WorkoutSession, default_body_parts, fetch_history,
    parse_plan, preview,
};

pub struct Service<R, G> {
    repository: R,
    generator: G,
    system_instruction: String,
    history: HistoryConfig,
    generating: Cell<bool>,
}

impl<R, G> Service<R, G> {
    pub fn new(repository: R, generator: G, system_instruction: impl Into<String>) -> Self {
        Self {
            repository,
            generator,
            system_instruction: system_instruction.into(),
            history: HistoryConfig::default(),
            generating: Cell::new(false),
        }
    }

    #[must_use]
    pub fn with_history_config(mut self, history: HistoryConfig) -> Self {
        self.history = history;
        self
    }

    pub fn is_generating(&self) -> bool {
        self.generating.get()
    }
}

/// Clears the generating flag when dropped, also if the generation future is dropped early.
struct GeneratingGuard<'a>(&'a Cell<bool>);

impl<'a> GeneratingGuard<'a> {
    fn acquire(generating: &'a Cell<bool>) -> Option<Self> {
        if generating.replace(true) {
            None
        } else {
            Some(Self(generating))
        }
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

impl<R: ExerciseLibraryRepository, G> Service<R, G> {
    /// Falls back to the built-in body parts if the library cannot be read.
    pub async fn get_body_parts(&self) -> Vec<BodyPart> {
        match log_on_error!(
            self.repository.read_body_parts(),
            ReadError,
            "get",
            "body parts"
        ) {
            Ok(body_parts) if !body_parts.is_empty() => body_parts,
            _ => default_body_parts(),
        }
    }

    pub async fn get_library_exercises(&self, body_part: &BodyPart) -> Vec<Exercise> {
        log_on_error!(
            self.repository.read_library_exercises(body_part),
            ReadError,
            "get",
            "library exercises"
        )
        .unwrap_or_default()
    }

    pub async fn create_custom_exercise(
        &self,
        body_part: &BodyPart,
        name: ExerciseName,
    ) -> Result<Exercise, CreateError> {
        if log_on_error!(
            self.repository.find_library_exercise(body_part, &name),
            ReadError,
            "find",
            "library exercise"
        )?
        .is_some()
        {
            return Err(CreateError::Conflict);
        }
        log_on_error!(
            self.repository.create_library_exercise(body_part, name),
            CreateError,
            "create",
            "library exercise"
        )
    }
}

impl<R: WorkoutLogRepository, G: PlanGenerator> Service<R, G> {
    /// Generates a plan from the workout history and the survey.
    ///
    /// Only one generation may run at a time. The progress is reported in the operation log.
    pub async fn generate_plan(
        &self,
        body_part: &BodyPart,
        survey: &StateSurvey,
        today: NaiveDate,
        operation_log: &mut OperationLog,
    ) -> Result<Plan, GenerationFailure> {
        let Some(_guard) = GeneratingGuard::acquire(&self.generating) else {
            return Err(GenerationError::InProgress.into());
        };

        let result = self
            .run_generation(body_part, survey, today, operation_log)
            .await;

        match &result {
            Ok(plan) => {
                info!("generated plan with {} exercises", plan.exercises.len());
                operation_log.push("✨ 计划生成完成! 正在跳转...");
            }
            Err(failure) => {
                warn!("failed to generate plan: {}", failure.error);
                operation_log.push(format!("❌ 生成失败: {}", failure.error));
            }
        }

        result
    }

    async fn run_generation(
        &self,
        body_part: &BodyPart,
        survey: &StateSurvey,
        today: NaiveDate,
        operation_log: &mut OperationLog,
    ) -> Result<Plan, GenerationFailure> {
        operation_log.push("🚀 初始化 AI 训练计划生成任务...");
        operation_log.push(format!(
            "📍 目标部位: {} (ID: {})",
            body_part.name,
            body_part.id.as_ref()
        ));
        operation_log.push("⏳ 正在读取历史训练数据...");

        let history = fetch_history(
            &self.repository,
            body_part.id,
            self.history,
            today,
            operation_log,
        )
        .await;

        operation_log.push("🛠️ 正在构建 Prompt 上下文...");
        let context = PlanContext {
            recent_target_logs: history.target_sessions,
            recent_other_logs: history.other_logs,
            state_survey: survey.clone(),
            user_feedback: UserFeedback::default(),
        };

        operation_log.push(format!("📡 正在请求 {} API...", self.generator.name()));
        let content = match self
            .generator
            .request_plan(&self.system_instruction, &context)
            .await
        {
            Ok(content) => content,
            Err(err) => {
                if err.is_no_connection() {
                    debug!("failed to request plan: {err}");
                } else {
                    error!("failed to request plan: {err}");
                }
                return Err(GenerationError::Request(err).into());
            }
        };

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        operation_log.push("📥 收到 LLM 原始响应:");
        operation_log.push(preview(&content, 300));
        operation_log.push("⚙️ 正在解析响应数据...");

        parse_plan(&content, body_part.id).map_err(|err| GenerationFailure {
            error: err.into(),
            raw_content: Some(content),
        })
    }
}

impl<R: WorkoutLogRepository + FeedbackRepository, G> Service<R, G> {
    /// Persists the performed sets and the fatigue score, then clears the session.
    ///
    /// The session stays untouched if the sets cannot be stored. A failure to store the fatigue
    /// score is only logged.
    pub async fn finish_workout(
        &self,
        session: &mut WorkoutSession,
        fatigue_score: FatigueScore,
        date: NaiveDate,
    ) -> Result<Vec<WorkoutLog>, CreateError> {
        let records = session.records(date);

        if !records.is_empty() {
            log_on_error!(
                self.repository.create_workout_logs(records.clone()),
                CreateError,
                "create",
                "workout logs"
            )?;
        }

        if let Err(err) = self
            .repository
            .create_feedback(Feedback::manual_entry(date, fatigue_score))
            .await
        {
            warn!("failed to create feedback: {err}");
        }

        session.clear();

        Ok(records)
    }
}
