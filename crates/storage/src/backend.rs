use bubblelift_domain as domain;
use bubblelift_web_app::{Settings, SYSTEM_INSTRUCTION};

use crate::{
    llm::LLM,
    local_storage::LocalStorage,
    rest::{GlooNetSendRequest, REST},
};

/// Persistence backend selected in the settings.
pub enum Backend {
    Supabase(REST<GlooNetSendRequest>),
    LocalStorage(LocalStorage),
}

impl Backend {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        match settings.backend {
            bubblelift_web_app::Backend::Supabase => {
                Backend::Supabase(REST::new(settings.supabase.clone()))
            }
            bubblelift_web_app::Backend::LocalStorage => Backend::LocalStorage(LocalStorage),
        }
    }
}

pub type Service = domain::Service<Backend, LLM<GlooNetSendRequest>>;

/// Creates the service for the backend, plan provider and history depth chosen in the settings.
#[must_use]
pub fn service(settings: &Settings) -> Service {
    domain::Service::new(
        Backend::from_settings(settings),
        LLM::from_settings(settings),
        SYSTEM_INSTRUCTION,
    )
    .with_history_config(settings.history_config())
}

impl domain::WorkoutLogRepository for Backend {
    async fn read_workout_logs(
        &self,
        query: &domain::LogQuery,
    ) -> Result<Vec<domain::WorkoutLog>, domain::ReadError> {
        match self {
            Backend::Supabase(rest) => rest.read_workout_logs(query).await,
            Backend::LocalStorage(local_storage) => local_storage.read_workout_logs(query).await,
        }
    }

    async fn create_workout_logs(
        &self,
        logs: Vec<domain::WorkoutLog>,
    ) -> Result<(), domain::CreateError> {
        match self {
            Backend::Supabase(rest) => rest.create_workout_logs(logs).await,
            Backend::LocalStorage(local_storage) => local_storage.create_workout_logs(logs).await,
        }
    }
}

impl domain::ExerciseLibraryRepository for Backend {
    async fn read_body_parts(&self) -> Result<Vec<domain::BodyPart>, domain::ReadError> {
        match self {
            Backend::Supabase(rest) => rest.read_body_parts().await,
            Backend::LocalStorage(local_storage) => local_storage.read_body_parts().await,
        }
    }

    async fn read_library_exercises(
        &self,
        body_part: &domain::BodyPart,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        match self {
            Backend::Supabase(rest) => rest.read_library_exercises(body_part).await,
            Backend::LocalStorage(local_storage) => {
                local_storage.read_library_exercises(body_part).await
            }
        }
    }

    async fn find_library_exercise(
        &self,
        body_part: &domain::BodyPart,
        name: &domain::ExerciseName,
    ) -> Result<Option<domain::Exercise>, domain::ReadError> {
        match self {
            Backend::Supabase(rest) => rest.find_library_exercise(body_part, name).await,
            Backend::LocalStorage(local_storage) => {
                local_storage.find_library_exercise(body_part, name).await
            }
        }
    }

    async fn create_library_exercise(
        &self,
        body_part: &domain::BodyPart,
        name: domain::ExerciseName,
    ) -> Result<domain::Exercise, domain::CreateError> {
        match self {
            Backend::Supabase(rest) => rest.create_library_exercise(body_part, name).await,
            Backend::LocalStorage(local_storage) => {
                local_storage.create_library_exercise(body_part, name).await
            }
        }
    }
}

impl domain::FeedbackRepository for Backend {
    async fn create_feedback(&self, feedback: domain::Feedback) -> Result<(), domain::CreateError> {
        match self {
            Backend::Supabase(rest) => rest.create_feedback(feedback).await,
            Backend::LocalStorage(local_storage) => local_storage.create_feedback(feedback).await,
        }
    }
}
