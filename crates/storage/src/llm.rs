//! Plan generation
//!
//! DeepSeek is accessed through its OpenAI compatible chat completion endpoint, Gemini through the
//! `generateContent` endpoint of the Generative Language API. Both receive the plan context as
//! pretty-printed JSON in the user message.

use bubblelift_domain as domain;
use bubblelift_web_app::{Provider, ProviderSettings, Settings};
use chrono::NaiveDate;
use gloo_net::http::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::rest::{GlooNetSendRequest, LoggedSet, SendRequest, WorkoutLog};

pub struct LLM<S: SendRequest> {
    pub sender: S,
    pub provider: Provider,
    pub settings: ProviderSettings,
}

impl LLM<GlooNetSendRequest> {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            sender: GlooNetSendRequest,
            provider: settings.provider,
            settings: settings.provider_settings().clone(),
        }
    }
}

impl<S: SendRequest> LLM<S> {
    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn chat_completion_request(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<Request, gloo_net::Error> {
        Request::post(&format!("{}/chat/completions", self.base_url()))
            .header(
                "Authorization",
                &format!("Bearer {}", self.settings.api_key),
            )
            .json(&ChatCompletionRequest {
                model: &self.settings.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: system_instruction,
                    },
                    ChatMessage {
                        role: "user",
                        content: user_prompt,
                    },
                ],
                stream: false,
            })
    }

    fn generate_content_request(
        &self,
        system_instruction: &str,
        user_prompt: &str,
    ) -> Result<Request, gloo_net::Error> {
        Request::post(&format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url(),
            self.settings.model
        ))
        .query([("key", &self.settings.api_key)])
        .json(&GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: user_prompt }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: system_instruction,
                }],
            },
        })
    }

    async fn send(&self, request: Request) -> Result<Response, domain::StorageError> {
        match self.sender.send_request(request).await {
            Ok(response) => {
                if response.ok() {
                    Ok(response)
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

impl<S: SendRequest> domain::PlanGenerator for LLM<S> {
    fn name(&self) -> &str {
        match self.provider {
            Provider::DeepSeek => "DeepSeek",
            Provider::Gemini => "Gemini",
        }
    }

    async fn request_plan(
        &self,
        system_instruction: &str,
        context: &domain::PlanContext,
    ) -> Result<String, domain::StorageError> {
        if self.settings.api_key.is_empty() {
            return Err(domain::StorageError::Other(
                format!("no API key configured for {}", self.name()).into(),
            ));
        }

        let user_prompt = user_prompt(context)?;

        match self.provider {
            Provider::DeepSeek => {
                let request = self
                    .chat_completion_request(system_instruction, &user_prompt)
                    .map_err(|err| domain::StorageError::Other(Box::new(err)))?;
                let response = self.send(request).await?;
                Ok(response
                    .json::<ChatCompletionResponse>()
                    .await
                    .map_err(deserialization_error)?
                    .content())
            }
            Provider::Gemini => {
                let request = self
                    .generate_content_request(system_instruction, &user_prompt)
                    .map_err(|err| domain::StorageError::Other(Box::new(err)))?;
                let response = self.send(request).await?;
                Ok(response
                    .json::<GenerateContentResponse>()
                    .await
                    .map_err(deserialization_error)?
                    .text())
            }
        }
    }
}

fn deserialization_error(error: gloo_net::Error) -> domain::StorageError {
    domain::StorageError::Other(format!("deserialization failed: {error}").into())
}

/// Serializes the plan context into the user message.
pub fn user_prompt(context: &domain::PlanContext) -> Result<String, domain::StorageError> {
    serde_json::to_string_pretty(&PlanContext::from(context))
        .map_err(|err| domain::StorageError::Other(Box::new(err)))
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl ChatCompletionResponse {
    fn content(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default()
    }
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    fn text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Deserialize, Debug)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize, Debug)]
struct PlanContext {
    recent_target_logs: Vec<Session>,
    recent_other_logs: Vec<WorkoutLog>,
    state_survey: StateSurvey,
    user_feedback: UserFeedback,
}

impl From<&domain::PlanContext> for PlanContext {
    fn from(value: &domain::PlanContext) -> Self {
        Self {
            recent_target_logs: value.recent_target_logs.iter().map(Session::from).collect(),
            recent_other_logs: value
                .recent_other_logs
                .iter()
                .cloned()
                .map(WorkoutLog::from)
                .collect(),
            state_survey: StateSurvey::from(&value.state_survey),
            user_feedback: UserFeedback {
                note: value.user_feedback.note.clone(),
            },
        }
    }
}

#[derive(Serialize, Debug)]
struct Session {
    date: NaiveDate,
    exercises: Vec<SessionExercise>,
}

impl From<&domain::SessionSummary> for Session {
    fn from(value: &domain::SessionSummary) -> Self {
        Self {
            date: value.date,
            exercises: value
                .exercises
                .iter()
                .map(|exercise| SessionExercise {
                    name: exercise.name.clone(),
                    sets: exercise.sets.iter().cloned().map(LoggedSet::from).collect(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize, Debug)]
struct SessionExercise {
    name: String,
    sets: Vec<LoggedSet>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct StateSurvey {
    sleep: String,
    diet: String,
    doms: String,
    doms_part: String,
    stress: String,
    other_activity: String,
}

impl From<&domain::StateSurvey> for StateSurvey {
    fn from(value: &domain::StateSurvey) -> Self {
        Self {
            sleep: value.sleep.as_ref().to_string(),
            diet: value.diet.as_ref().to_string(),
            doms: value.doms().as_ref().to_string(),
            doms_part: value.doms_part().unwrap_or_default().to_string(),
            stress: value.stress.as_ref().to_string(),
            other_activity: value.other_activity.as_ref().to_string(),
        }
    }
}

#[derive(Serialize, Debug)]
struct UserFeedback {
    note: String,
}
