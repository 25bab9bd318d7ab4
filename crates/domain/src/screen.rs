//! Screen flow of the client
//!
//! ```text
//! Home -> Survey -> Generating -> Exercises <-> SetEditor
//!           ^           |            |
//!           +-----------+            +-> RateFatigue -> Summary -> Home
//! ```
//!
//! Every screen owns the data it displays. A rejected transition leaves the current screen
//! untouched.

use std::mem;

use chrono::NaiveDate;

use crate::{
    BodyPart, EditorExit, ExerciseID, FatigueScore, GenerationFailure, OperationLog, Plan,
    SetEditor, StateSurvey, WorkoutLog, WorkoutSession,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Screen {
    #[default]
    Home,
    Survey(SurveyScreen),
    Generating(GeneratingScreen),
    Exercises(ExercisesScreen),
    SetEditor(SetEditorScreen),
    RateFatigue(RateFatigueScreen),
    Summary(SummaryScreen),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurveyScreen {
    pub body_part: BodyPart,
    pub survey: StateSurvey,
    pub last_failure: Option<FailedGeneration>,
}

/// Displayable outcome of a failed plan generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedGeneration {
    pub message: String,
    pub raw_content: Option<String>,
    pub operation_log: OperationLog,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratingScreen {
    pub body_part: BodyPart,
    pub survey: StateSurvey,
    pub operation_log: OperationLog,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExercisesScreen {
    pub body_part: BodyPart,
    pub session: WorkoutSession,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetEditorScreen {
    pub body_part: BodyPart,
    pub session: WorkoutSession,
    pub editor: SetEditor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateFatigueScreen {
    pub body_part: BodyPart,
    pub session: WorkoutSession,
    pub fatigue_score: FatigueScore,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryScreen {
    pub body_part: BodyPart,
    pub date: NaiveDate,
    pub records: Vec<WorkoutLog>,
    pub fatigue_score: FatigueScore,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} on {screen} screen")]
    Invalid {
        screen: &'static str,
        action: &'static str,
    },
}

impl Screen {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Survey(_) => "survey",
            Screen::Generating(_) => "generating",
            Screen::Exercises(_) => "exercises",
            Screen::SetEditor(_) => "set editor",
            Screen::RateFatigue(_) => "rate fatigue",
            Screen::Summary(_) => "summary",
        }
    }

    pub fn select_body_part(&mut self, body_part: BodyPart) -> Result<(), TransitionError> {
        self.transition("select body part", |screen| match screen {
            Screen::Home => Ok(Screen::Survey(SurveyScreen {
                body_part,
                survey: StateSurvey::default(),
                last_failure: None,
            })),
            other => Err(other),
        })
    }

    pub fn close_survey(&mut self) -> Result<(), TransitionError> {
        self.transition("close survey", |screen| match screen {
            Screen::Survey(_) => Ok(Screen::Home),
            other => Err(other),
        })
    }

    pub fn start_generation(&mut self) -> Result<(), TransitionError> {
        self.transition("start generation", |screen| match screen {
            Screen::Survey(survey) => Ok(Screen::Generating(GeneratingScreen {
                body_part: survey.body_part,
                survey: survey.survey,
                operation_log: OperationLog::new(),
            })),
            other => Err(other),
        })
    }

    pub fn plan_loaded(&mut self, plan: Plan) -> Result<(), TransitionError> {
        self.transition("load plan", |screen| match screen {
            Screen::Generating(generating) => Ok(Screen::Exercises(ExercisesScreen {
                session: WorkoutSession::from_plan(generating.body_part.id, plan),
                body_part: generating.body_part,
            })),
            other => Err(other),
        })
    }

    /// Returns to the survey, keeping the failure and the received response for display.
    pub fn generation_failed(&mut self, failure: &GenerationFailure) -> Result<(), TransitionError> {
        self.transition("record generation failure", |screen| match screen {
            Screen::Generating(generating) => Ok(Screen::Survey(SurveyScreen {
                body_part: generating.body_part,
                survey: generating.survey,
                last_failure: Some(FailedGeneration {
                    message: failure.error.to_string(),
                    raw_content: failure.raw_content.clone(),
                    operation_log: generating.operation_log,
                }),
            })),
            other => Err(other),
        })
    }

    /// Skips generation and starts the workout with a local plan.
    pub fn use_plan(&mut self, plan: Plan) -> Result<(), TransitionError> {
        self.transition("use local plan", |screen| match screen {
            Screen::Survey(survey) => Ok(Screen::Exercises(ExercisesScreen {
                session: WorkoutSession::from_plan(survey.body_part.id, plan),
                body_part: survey.body_part,
            })),
            other => Err(other),
        })
    }

    pub fn select_exercise(&mut self, id: &ExerciseID) -> Result<(), TransitionError> {
        self.transition("select exercise", |screen| match screen {
            Screen::Exercises(exercises) => match exercises.session.open_editor(id) {
                Some(editor) => Ok(Screen::SetEditor(SetEditorScreen {
                    body_part: exercises.body_part,
                    session: exercises.session,
                    editor,
                })),
                None => Err(Screen::Exercises(exercises)),
            },
            other => Err(other),
        })
    }

    pub fn close_editor(&mut self, exit: EditorExit) -> Result<(), TransitionError> {
        self.transition("close editor", |screen| match screen {
            Screen::SetEditor(SetEditorScreen {
                body_part,
                mut session,
                editor,
            }) => {
                session.close_editor(editor, exit);
                Ok(Screen::Exercises(ExercisesScreen { body_part, session }))
            }
            other => Err(other),
        })
    }

    /// Leaves the workout, discarding plan details, logged sets and completion marks.
    pub fn go_home(&mut self) -> Result<(), TransitionError> {
        self.transition("go home", |screen| match screen {
            Screen::Exercises(_) | Screen::Summary(_) => Ok(Screen::Home),
            other => Err(other),
        })
    }

    pub fn finish(&mut self) -> Result<(), TransitionError> {
        self.transition("finish workout", |screen| match screen {
            Screen::Exercises(exercises) => Ok(Screen::RateFatigue(RateFatigueScreen {
                body_part: exercises.body_part,
                session: exercises.session,
                fatigue_score: FatigueScore::default(),
            })),
            other => Err(other),
        })
    }

    pub fn cancel_finish(&mut self) -> Result<(), TransitionError> {
        self.transition("cancel finish", |screen| match screen {
            Screen::RateFatigue(rate) => Ok(Screen::Exercises(ExercisesScreen {
                body_part: rate.body_part,
                session: rate.session,
            })),
            other => Err(other),
        })
    }

    pub fn workout_saved(
        &mut self,
        date: NaiveDate,
        records: Vec<WorkoutLog>,
    ) -> Result<(), TransitionError> {
        self.transition("complete workout", |screen| match screen {
            Screen::RateFatigue(rate) => Ok(Screen::Summary(SummaryScreen {
                body_part: rate.body_part,
                date,
                records,
                fatigue_score: rate.fatigue_score,
            })),
            other => Err(other),
        })
    }

    /// Returns to the exercise list with the workout intact.
    pub fn save_failed(&mut self) -> Result<(), TransitionError> {
        self.cancel_finish()
    }

    fn transition(
        &mut self,
        action: &'static str,
        f: impl FnOnce(Screen) -> Result<Screen, Screen>,
    ) -> Result<(), TransitionError> {
        match f(mem::take(self)) {
            Ok(next) => {
                *self = next;
                Ok(())
            }
            Err(previous) => {
                let screen = previous.name();
                *self = previous;
                Err(TransitionError::Invalid { screen, action })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{BodyPartID, GenerationError, PlanError, catalog, parse_plan};

    fn chest() -> BodyPart {
        BodyPart::from(BodyPartID::Chest)
    }

    fn exercises_screen() -> Screen {
        let mut screen = Screen::Home;
        screen.select_body_part(chest()).unwrap();
        screen.use_plan(catalog::fallback_plan(&chest())).unwrap();
        screen
    }

    #[test]
    fn test_generation_success() {
        let mut screen = Screen::Home;
        screen.select_body_part(chest()).unwrap();
        screen.start_generation().unwrap();
        assert_eq!(screen.name(), "generating");

        let plan = parse_plan(
            r#"{"训练计划": {"卧推": {"表格": [{"重量": "20kg", "次数": 8}]}}}"#,
            BodyPartID::Chest,
        )
        .unwrap();
        screen.plan_loaded(plan).unwrap();

        let Screen::Exercises(exercises) = &screen else {
            panic!("unexpected screen {}", screen.name());
        };
        assert_eq!(exercises.session.exercises().len(), 1);
        assert_eq!(exercises.session.sets(&"ai_main_0".into()).len(), 1);
    }

    #[test]
    fn test_generation_failure_returns_to_survey() {
        let mut screen = Screen::Home;
        screen.select_body_part(chest()).unwrap();
        screen.start_generation().unwrap();
        if let Screen::Generating(generating) = &mut screen {
            generating.operation_log.push("⚙️ 正在解析响应数据...");
        }

        screen
            .generation_failed(&GenerationFailure {
                error: GenerationError::Plan(PlanError::Structure),
                raw_content: Some("{}".to_string()),
            })
            .unwrap();

        let Screen::Survey(survey) = &screen else {
            panic!("unexpected screen {}", screen.name());
        };
        let failure = survey.last_failure.as_ref().unwrap();
        assert_eq!(failure.message, "plan is missing the '训练计划' root object");
        assert_eq!(failure.raw_content.as_deref(), Some("{}"));
        assert_eq!(failure.operation_log.messages(), vec!["⚙️ 正在解析响应数据..."]);
    }

    #[test]
    fn test_invalid_transition_leaves_state_unchanged() {
        let mut screen = exercises_screen();
        let before = screen.clone();

        assert_eq!(
            screen.start_generation(),
            Err(TransitionError::Invalid {
                screen: "exercises",
                action: "start generation",
            })
        );
        assert_eq!(screen, before);

        assert!(screen.select_exercise(&"unknown".into()).is_err());
        assert_eq!(screen, before);

        assert!(screen.workout_saved(NaiveDate::MIN, vec![]).is_err());
        assert_eq!(screen, before);
    }

    #[test]
    fn test_set_editor_round_trip() {
        let mut screen = exercises_screen();
        screen.select_exercise(&"bench_press".into()).unwrap();

        if let Screen::SetEditor(editor) = &mut screen {
            editor.editor.add_set();
        }
        screen.close_editor(EditorExit::Save).unwrap();

        let Screen::Exercises(exercises) = &screen else {
            panic!("unexpected screen {}", screen.name());
        };
        assert_eq!(exercises.session.sets(&"bench_press".into()).len(), 2);
        assert!(exercises.session.is_completed(&"bench_press".into()));
    }

    #[test]
    fn test_finish_flow() {
        let mut screen = exercises_screen();
        screen.finish().unwrap();
        screen.save_failed().unwrap();
        assert_eq!(screen.name(), "exercises");

        screen.finish().unwrap();
        screen.workout_saved(NaiveDate::MIN, vec![]).unwrap();
        assert_eq!(screen.name(), "summary");

        screen.go_home().unwrap();
        assert_eq!(screen, Screen::Home);
    }

    #[test]
    fn test_close_survey() {
        let mut screen = Screen::Home;
        assert!(screen.close_survey().is_err());
        screen.select_body_part(chest()).unwrap();
        screen.close_survey().unwrap();
        assert_eq!(screen, Screen::Home);
    }
}
