use std::collections::VecDeque;

use bubblelift_domain as domain;
use bubblelift_web_app::{Settings, SettingsRepository, log};
use gloo_storage::Storage as GlooStorage;
use serde::{Serialize, de::DeserializeOwned};

use crate::rest::{Feedback, LibraryExercise, WorkoutLog, convert_workout_logs};

const KEY_SETTINGS: &str = "settings";
const KEY_LOG: &str = "log";
const KEY_WORKOUT_LOGS: &str = "workout logs";
const KEY_CUSTOM_EXERCISES: &str = "custom exercises";
const KEY_FEEDBACK: &str = "feedback";

fn read<T: DeserializeOwned + Default>(key: &str) -> Result<T, gloo_storage::errors::StorageError> {
    match gloo_storage::LocalStorage::get(key) {
        Ok(value) => Ok(value),
        Err(err) => match err {
            gloo_storage::errors::StorageError::KeyNotFound(_) => Ok(T::default()),
            err => Err(err),
        },
    }
}

fn write<T: Serialize>(key: &str, value: T) -> Result<(), gloo_storage::errors::StorageError> {
    gloo_storage::LocalStorage::set(key, value)
}

fn storage_error(error: gloo_storage::errors::StorageError) -> domain::StorageError {
    domain::StorageError::Other(Box::new(error))
}

pub struct UI;

impl SettingsRepository for UI {
    async fn read_settings(&self) -> Result<Settings, String> {
        read(KEY_SETTINGS).map_err(|err| err.to_string())
    }

    async fn write_settings(&self, settings: Settings) -> Result<(), String> {
        write(KEY_SETTINGS, settings).map_err(|err| err.to_string())
    }
}

pub struct Log;

impl log::Repository for Log {
    fn read_entries(&self) -> Result<VecDeque<log::Entry>, log::Error> {
        read(KEY_LOG).map_err(|err| log::Error::Unknown(err.to_string()))
    }

    fn write_entry(&self, entry: log::Entry) -> Result<(), log::Error> {
        let mut entries = self.read_entries()?;
        log::prepend_entry(&mut entries, entry);
        write(KEY_LOG, entries).map_err(|err| log::Error::Unknown(err.to_string()))
    }
}

/// Offline backend keeping all data in the browser's local storage.
///
/// The exercise library consists of the built-in catalog and the exercises added by the user.
pub struct LocalStorage;

impl domain::WorkoutLogRepository for LocalStorage {
    async fn read_workout_logs(
        &self,
        query: &domain::LogQuery,
    ) -> Result<Vec<domain::WorkoutLog>, domain::ReadError> {
        let rows = read::<Vec<serde_json::Value>>(KEY_WORKOUT_LOGS).map_err(storage_error)?;
        Ok(query.apply(convert_workout_logs(rows)))
    }

    async fn create_workout_logs(
        &self,
        logs: Vec<domain::WorkoutLog>,
    ) -> Result<(), domain::CreateError> {
        let mut stored =
            read::<Vec<serde_json::Value>>(KEY_WORKOUT_LOGS).map_err(storage_error)?;
        for log in logs {
            stored.push(
                serde_json::to_value(WorkoutLog::from(log))
                    .map_err(|err| domain::StorageError::Other(Box::new(err)))?,
            );
        }
        Ok(write(KEY_WORKOUT_LOGS, stored).map_err(storage_error)?)
    }
}

impl domain::ExerciseLibraryRepository for LocalStorage {
    async fn read_body_parts(&self) -> Result<Vec<domain::BodyPart>, domain::ReadError> {
        Ok(domain::default_body_parts())
    }

    async fn read_library_exercises(
        &self,
        body_part: &domain::BodyPart,
    ) -> Result<Vec<domain::Exercise>, domain::ReadError> {
        let mut exercises = domain::catalog::exercises(body_part.id);
        exercises.extend(custom_exercises(body_part)?.into_iter().map(|exercise| {
            domain::Exercise::new(exercise.id, exercise.exercise_name, body_part.id)
        }));
        Ok(exercises)
    }

    async fn find_library_exercise(
        &self,
        body_part: &domain::BodyPart,
        name: &domain::ExerciseName,
    ) -> Result<Option<domain::Exercise>, domain::ReadError> {
        Ok(self
            .read_library_exercises(body_part)
            .await?
            .into_iter()
            .find(|exercise| exercise.name == **name))
    }

    async fn create_library_exercise(
        &self,
        body_part: &domain::BodyPart,
        name: domain::ExerciseName,
    ) -> Result<domain::Exercise, domain::CreateError> {
        let mut stored =
            read::<Vec<LibraryExercise>>(KEY_CUSTOM_EXERCISES).map_err(storage_error)?;
        let exercise = LibraryExercise {
            id: stored.iter().map(|exercise| exercise.id).max().unwrap_or(0) + 1,
            exercise_name: name.to_string(),
            body_part: body_part.name.clone(),
        };
        stored.push(exercise.clone());
        write(KEY_CUSTOM_EXERCISES, stored).map_err(storage_error)?;
        Ok(domain::Exercise::new(
            exercise.id,
            exercise.exercise_name,
            body_part.id,
        ))
    }
}

impl domain::FeedbackRepository for LocalStorage {
    async fn create_feedback(&self, feedback: domain::Feedback) -> Result<(), domain::CreateError> {
        let mut stored = read::<Vec<Feedback>>(KEY_FEEDBACK).map_err(storage_error)?;
        stored.push(Feedback::from(feedback));
        Ok(write(KEY_FEEDBACK, stored).map_err(storage_error)?)
    }
}

fn custom_exercises(
    body_part: &domain::BodyPart,
) -> Result<Vec<LibraryExercise>, domain::StorageError> {
    Ok(read::<Vec<LibraryExercise>>(KEY_CUSTOM_EXERCISES)
        .map_err(storage_error)?
        .into_iter()
        .filter(|exercise| exercise.body_part == body_part.name)
        .collect())
}

#[cfg(test)]
mod tests {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    mod wasm {
        use bubblelift_domain::{
            ExerciseLibraryRepository, FeedbackRepository, WorkoutLogRepository,
        };
        use bubblelift_web_app::log::Repository;
        use chrono::NaiveDate;
        use pretty_assertions::assert_eq;
        use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

        use super::super::*;
        use crate::tests::data::{WORKOUT_LOG, WORKOUT_LOG_2, WORKOUT_LOG_3, WORKOUT_LOGS};

        wasm_bindgen_test_configure!(run_in_browser);

        #[wasm_bindgen_test]
        async fn test_settings() {
            gloo_storage::LocalStorage::clear();

            assert_eq!(UI.read_settings().await, Ok(Settings::default()));

            let settings = Settings {
                backend: bubblelift_web_app::Backend::LocalStorage,
                ..Settings::default()
            };
            UI.write_settings(settings.clone()).await.unwrap();

            assert_eq!(UI.read_settings().await, Ok(settings));
        }

        #[wasm_bindgen_test]
        fn test_log() {
            gloo_storage::LocalStorage::clear();

            for i in 0..=log::MAX_ENTRIES {
                Log.write_entry(log::Entry {
                    time: "Nov 26 07:05:09".to_string(),
                    level: ::log::Level::Info,
                    target: String::new(),
                    message: i.to_string(),
                })
                .unwrap();
            }

            let entries = Log.read_entries().unwrap();
            assert_eq!(entries.len(), log::MAX_ENTRIES);
            assert_eq!(
                entries.front().map(|entry| entry.message.as_str()),
                Some("100")
            );
        }

        #[wasm_bindgen_test]
        async fn test_workout_logs() {
            gloo_storage::LocalStorage::clear();

            LocalStorage
                .create_workout_logs(WORKOUT_LOGS.clone())
                .await
                .unwrap();

            assert_eq!(
                LocalStorage
                    .read_workout_logs(&domain::LogQuery {
                        body_part: domain::BodyPartFilter::Equal(domain::BodyPartID::Chest),
                        since: None,
                        limit: Some(20),
                    })
                    .await
                    .unwrap(),
                vec![WORKOUT_LOG_2.clone(), WORKOUT_LOG.clone()]
            );
            assert_eq!(
                LocalStorage
                    .read_workout_logs(&domain::LogQuery {
                        body_part: domain::BodyPartFilter::NotEqual(domain::BodyPartID::Chest),
                        since: NaiveDate::from_ymd_opt(2025, 11, 21),
                        limit: None,
                    })
                    .await
                    .unwrap(),
                vec![WORKOUT_LOG_3.clone()]
            );
        }

        #[wasm_bindgen_test]
        async fn test_custom_exercises() {
            gloo_storage::LocalStorage::clear();
            let chest = domain::BodyPart::from(domain::BodyPartID::Chest);
            let name = domain::ExerciseName::new("器械推胸").unwrap();

            assert_eq!(
                LocalStorage
                    .find_library_exercise(&chest, &name)
                    .await
                    .unwrap(),
                None
            );

            let exercise = LocalStorage
                .create_library_exercise(&chest, name.clone())
                .await
                .unwrap();

            assert_eq!(
                exercise,
                domain::Exercise::new(1_u64, "器械推胸", domain::BodyPartID::Chest)
            );
            assert_eq!(
                LocalStorage
                    .find_library_exercise(&chest, &name)
                    .await
                    .unwrap(),
                Some(exercise.clone())
            );
            assert_eq!(
                LocalStorage
                    .read_library_exercises(&chest)
                    .await
                    .unwrap()
                    .last(),
                Some(&exercise)
            );
            assert!(
                LocalStorage
                    .read_library_exercises(&domain::BodyPart::from(domain::BodyPartID::Back))
                    .await
                    .unwrap()
                    .iter()
                    .all(|exercise| exercise.name != "器械推胸")
            );
        }

        #[wasm_bindgen_test]
        async fn test_feedback() {
            gloo_storage::LocalStorage::clear();

            LocalStorage
                .create_feedback(domain::Feedback::manual_entry(
                    NaiveDate::from_ymd_opt(2025, 11, 26).unwrap(),
                    domain::FatigueScore::new(7).unwrap(),
                ))
                .await
                .unwrap();

            assert_eq!(
                read::<Vec<Feedback>>(KEY_FEEDBACK).unwrap(),
                vec![Feedback {
                    date: NaiveDate::from_ymd_opt(2025, 11, 26).unwrap(),
                    fatigue_score: 7,
                    note: "App Manual Entry".to_string(),
                }]
            );
        }
    }
}
