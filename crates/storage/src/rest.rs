//! Supabase REST
//!
//! Workout logs, the exercise library and user feedback are stored in Supabase tables, which are
//! accessed through the PostgREST interface at `{url}/rest/v1/{table}`.

use bubblelift_domain as domain;
use bubblelift_web_app::SupabaseSettings;
use chrono::NaiveDate;
use gloo_net::http::{Request, RequestBuilder, Response};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[allow(async_fn_in_trait)]
pub trait SendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error>;
}

#[derive(Clone, Copy, Default)]
pub struct GlooNetSendRequest;

impl SendRequest for GlooNetSendRequest {
    async fn send_request(&self, request: Request) -> Result<Response, gloo_net::Error> {
        request.send().await
    }
}

const WORKOUT_LOGS_TABLE: &str = "workout_logs";
const EXERCISE_LIBRARY_TABLE: &str = "exercise_library";
const BODY_PART_LIBRARY_TABLE: &str = "body_part_library";
const USER_FEEDBACK_TABLE: &str = "user_feedback";

#[derive(Clone)]
pub struct REST<S: SendRequest> {
    pub sender: S,
    pub supabase: SupabaseSettings,
}

impl REST<GlooNetSendRequest> {
    #[must_use]
    pub fn new(supabase: SupabaseSettings) -> Self {
        Self {
            sender: GlooNetSendRequest,
            supabase,
        }
    }
}

impl<S: SendRequest> REST<S> {
    fn url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.supabase.url.trim_end_matches('/'))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.supabase.anon_key)
            .header("Authorization", &format!("Bearer {}", self.supabase.anon_key))
    }

    fn get(&self, table: &str, params: Vec<(&'static str, String)>) -> RequestBuilder {
        self.authorize(Request::get(&self.url(table)).query(params))
    }

    fn post(&self, table: &str) -> RequestBuilder {
        self.authorize(Request::post(&self.url(table)))
    }

    async fn fetch<T>(&self, request: Request) -> Result<T, domain::StorageError>
    where
        T: 'static + for<'de> serde::Deserialize<'de>,
    {
        match self.sender.send_request(request).await {
            Ok(response) => {
                if response.ok() {
                    match response.json::<T>().await {
                        Ok(data) => Ok(data),
                        Err(error) => Err(domain::StorageError::Other(
                            format!("deserialization failed: {error}").into(),
                        )),
                    }
                } else {
                    Err(domain::StorageError::Other(
                        format!("{} {}", response.status(), response.status_text()).into(),
                    ))
                }
            }
            Err(_) => Err(domain::StorageError::NoConnection),
        }
    }

    async fn fetch_no_content(&self, request: Request) -> Result<(), domain::StorageError> {
        match self.sender.send_request(request).await {
            Ok(response) => {
                if response.ok() {
                    Ok(())
                } else {
                    Err(domain::StorageError::Other(
                        format!("{} {}", response.status(), response.status_text()).into(),
                    ))
                }
            }
            Err(_) => Err(domain::StorageError::NoConnection),
        }
    }
}

fn build_error(error: gloo_net::Error) -> domain::StorageError {
    domain::StorageError::Other(Box::new(error))
}

impl<S: SendRequest> domain::WorkoutLogRepository for REST<S> {
    async fn read_workout_logs(
        &self,
        query: &domain::LogQuery,
    ) -> Result<Vec<domain::WorkoutLog>, domain::ReadError> {
        let request = self
            .get(WORKOUT_LOGS_TABLE, log_query_params(query))
            .build()
            .map_err(build_error)?;
        let rows = self.fetch::<Vec<serde_json::Value>>(request).await?;
        Ok(convert_workout_logs(rows))
    }

    async fn create_workout_logs(
        &self,
        logs: Vec<domain::WorkoutLog>,
    ) -> Result<(), domain::CreateError> {
        let request = self
            .post(WORKOUT_LOGS_TABLE)
            .header("Prefer", "return=minimal")
            .json(&logs.into_iter().map(WorkoutLog::from).collect::<Vec<_>>())
            .map_err(build_error)?;
        Ok(self.fetch_no_content(request).await?)
    }
}

impl<S: SendRequest> domain::ExerciseLibraryRepository for REST<S> {
    async fn read_body_parts(&self) -> Result<Vec<domain::BodyPart>, domain::ReadError> {
        let request = self
            .get(BODY_PART_LIBRARY_TABLE, vec![("select", "*".to_string())])
            .build()
            .map_err(build_error)?;
        Ok(self
            .fetch::<Vec<BodyPart>>(request)
            .await?
            .into_iter()
            .filter_map(|body_part| {
                domain::BodyPart::try_from(body_part)
                    .inspect_err(|err| warn!("skipping body part: {err}"))
                    .ok()
            })
            .collect())
    }

    async fn read_library_exercises(
        &self,
        body_part: &domain::BodyPart,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let request = self
            .get(
                EXERCISE_LIBRARY_TABLE,
                vec![
                    ("select", "*".to_string()),
                    ("body_part", format!("eq.{}", body_part.name)),
                ],
            )
            .build()
            .map_err(build_error)?;
        Ok(self
            .fetch::<Vec<LibraryExercise>>(request)
            .await?
            .into_iter()
            .map(|exercise| exercise.into_domain(body_part.id))
            .collect())
    }

    async fn find_library_exercise(
        &self,
        body_part: &domain::BodyPart,
        name: &domain::ExerciseName,
    ) -> Result<Option<domain::Exercise>, domain::ReadError> {
        let request = self
            .get(
                EXERCISE_LIBRARY_TABLE,
                vec![
                    ("select", "*".to_string()),
                    ("body_part", format!("eq.{}", body_part.name)),
                    ("exercise_name", format!("eq.{name}")),
                    ("limit", "1".to_string()),
                ],
            )
            .build()
            .map_err(build_error)?;
        Ok(self
            .fetch::<Vec<LibraryExercise>>(request)
            .await?
            .into_iter()
            .next()
            .map(|exercise| exercise.into_domain(body_part.id)))
    }

    async fn create_library_exercise(
        &self,
        body_part: &domain::BodyPart,
        name: domain::ExerciseName,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let request = self
            .post(EXERCISE_LIBRARY_TABLE)
            .header("Prefer", "return=representation")
            .json(&json!({
                "exercise_name": name.as_str(),
                "body_part": body_part.name,
            }))
            .map_err(build_error)?;
        self.fetch::<Vec<LibraryExercise>>(request)
            .await?
            .into_iter()
            .next()
            .map(|exercise| exercise.into_domain(body_part.id))
            .ok_or_else(|| domain::CreateError::Other("no exercise returned".into()))
    }
}

impl<S: SendRequest> domain::FeedbackRepository for REST<S> {
    async fn create_feedback(&self, feedback: domain::Feedback) -> Result<(), domain::CreateError> {
        let request = self
            .post(USER_FEEDBACK_TABLE)
            .header("Prefer", "return=minimal")
            .json(&Feedback::from(feedback))
            .map_err(build_error)?;
        Ok(self.fetch_no_content(request).await?)
    }
}

/// Converts a log query into PostgREST query parameters.
pub fn log_query_params(query: &domain::LogQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("select", "*".to_string())];
    params.push((
        "body_part",
        match query.body_part {
            domain::BodyPartFilter::Equal(id) => format!("eq.{}", id.as_ref()),
            domain::BodyPartFilter::NotEqual(id) => format!("neq.{}", id.as_ref()),
        },
    ));
    if let Some(since) = query.since {
        params.push(("date", format!("gte.{since}")));
    }
    params.push(("order", "date.desc".to_string()));
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

/// Converts stored rows one by one and drops rows that cannot be represented, e.g. malformed
/// rows or logs of unknown body parts.
pub(crate) fn convert_workout_logs(rows: Vec<serde_json::Value>) -> Vec<domain::WorkoutLog> {
    rows.into_iter()
        .filter_map(|row| {
            serde_json::from_value::<WorkoutLog>(row)
                .map_err(ConversionError::from)
                .and_then(domain::WorkoutLog::try_from)
                .inspect_err(|err| warn!("skipping workout log: {err}"))
                .ok()
        })
        .collect()
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("unknown body part \"{0}\"")]
    UnknownBodyPart(String),
    #[error(transparent)]
    Reps(#[from] domain::RepsError),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

impl From<serde_json::Error> for ConversionError {
    fn from(value: serde_json::Error) -> Self {
        ConversionError::InvalidRow(value.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub body_part: String,
    pub exercise: String,
    pub sets: Vec<LoggedSet>,
    pub date: NaiveDate,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggedSet {
    pub set: u32,
    #[serde(deserialize_with = "deserialize_reps")]
    pub reps: u32,
    pub weight_kg: f32,
    #[serde(default)]
    pub rpe: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Accepts fractional repetitions, which older clients stored, by rounding them.
fn deserialize_reps<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let reps = f32::deserialize(deserializer)?;
    Ok(domain::Reps::saturating(reps).into())
}

impl From<domain::WorkoutLog> for WorkoutLog {
    fn from(value: domain::WorkoutLog) -> Self {
        Self {
            body_part: value.body_part.as_ref().to_string(),
            exercise: value.exercise,
            sets: value.sets.into_iter().map(LoggedSet::from).collect(),
            date: value.date,
        }
    }
}

impl TryFrom<WorkoutLog> for domain::WorkoutLog {
    type Error = ConversionError;

    fn try_from(value: WorkoutLog) -> Result<Self, Self::Error> {
        let body_part = domain::BodyPartID::resolve(&value.body_part)
            .ok_or_else(|| ConversionError::UnknownBodyPart(value.body_part.clone()))?;
        Ok(Self {
            body_part,
            exercise: value.exercise,
            sets: value
                .sets
                .into_iter()
                .map(domain::LoggedSet::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            date: value.date,
        })
    }
}

impl From<domain::LoggedSet> for LoggedSet {
    fn from(value: domain::LoggedSet) -> Self {
        Self {
            set: value.set,
            reps: value.reps.into(),
            weight_kg: value.weight.into(),
            rpe: value.rpe.map(f32::from),
            note: value.note,
        }
    }
}

impl TryFrom<LoggedSet> for domain::LoggedSet {
    type Error = ConversionError;

    fn try_from(value: LoggedSet) -> Result<Self, Self::Error> {
        Ok(Self {
            set: value.set,
            reps: domain::Reps::new(value.reps)?,
            weight: domain::Weight::saturating(value.weight_kg),
            rpe: value.rpe.and_then(domain::RPE::saturating),
            note: value.note,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BodyPart {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl TryFrom<BodyPart> for domain::BodyPart {
    type Error = ConversionError;

    fn try_from(value: BodyPart) -> Result<Self, Self::Error> {
        let id = domain::BodyPartID::resolve(&value.id)
            .or_else(|| domain::BodyPartID::resolve(&value.name))
            .ok_or_else(|| ConversionError::UnknownBodyPart(value.id.clone()))?;
        Ok(Self {
            id,
            name: value.name,
            color: value.color.unwrap_or_else(|| id.color().to_string()),
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LibraryExercise {
    pub id: u64,
    pub exercise_name: String,
    pub body_part: String,
}

impl LibraryExercise {
    fn into_domain(self, body_part: domain::BodyPartID) -> domain::Exercise {
        domain::Exercise::new(self.id, self.exercise_name, body_part)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub date: NaiveDate,
    pub fatigue_score: u8,
    pub note: String,
}

impl From<domain::Feedback> for Feedback {
    fn from(value: domain::Feedback) -> Self {
        Self {
            date: value.date,
            fatigue_score: value.fatigue_score.into(),
            note: value.note,
        }
    }
}
