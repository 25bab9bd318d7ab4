use chrono::NaiveDate;
use derive_more::Into;
use strum::{AsRefStr, EnumIter, EnumString};

use crate::CreateError;

#[allow(async_fn_in_trait)]
pub trait FeedbackRepository {
    async fn create_feedback(&self, feedback: Feedback) -> Result<(), CreateError>;
}

/// Pre-workout self-assessment passed to plan generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateSurvey {
    pub sleep: Sleep,
    pub diet: Diet,
    doms: Doms,
    doms_part: Option<String>,
    pub stress: Stress,
    pub other_activity: OtherActivity,
}

impl StateSurvey {
    #[must_use]
    pub fn doms(&self) -> Doms {
        self.doms
    }

    /// Body part affected by delayed onset muscle soreness.
    #[must_use]
    pub fn doms_part(&self) -> Option<&str> {
        self.doms_part.as_deref()
    }

    pub fn set_doms(&mut self, doms: Doms) {
        self.doms = doms;
        if doms == Doms::Absent {
            self.doms_part = None;
        }
    }

    pub fn set_doms_part(&mut self, part: impl Into<String>) {
        if self.doms != Doms::Absent {
            self.doms_part = Some(part.into());
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
pub enum Sleep {
    #[strum(serialize = "差")]
    Poor,
    #[strum(serialize = "一般")]
    Normal,
    #[default]
    #[strum(serialize = "好")]
    Good,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
pub enum Diet {
    #[strum(serialize = "少")]
    Low,
    #[default]
    #[strum(serialize = "正常")]
    Normal,
    #[strum(serialize = "多")]
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
pub enum Doms {
    #[strum(serialize = "严重")]
    Severe,
    #[strum(serialize = "轻微")]
    Mild,
    #[default]
    #[strum(serialize = "无感")]
    Absent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
pub enum Stress {
    #[strum(serialize = "大")]
    High,
    #[strum(serialize = "轻微")]
    Mild,
    #[default]
    #[strum(serialize = "放松")]
    Relaxed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, EnumString, EnumIter)]
pub enum OtherActivity {
    #[default]
    #[strum(serialize = "无")]
    Rest,
    #[strum(serialize = "健身前打了羽毛球")]
    BadmintonBefore,
    #[strum(serialize = "健身后要打羽毛球")]
    BadmintonAfter,
}

#[derive(Debug, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct FatigueScore(u8);

impl FatigueScore {
    pub const MIN: u8 = 5;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self, FatigueScoreError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(FatigueScoreError::OutOfRange(value));
        }

        Ok(Self(value))
    }
}

impl Default for FatigueScore {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<&str> for FatigueScore {
    type Error = FatigueScoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u8>() {
            Ok(parsed_value) => FatigueScore::new(parsed_value),
            Err(_) => Err(FatigueScoreError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FatigueScoreError {
    #[error("Fatigue score must be in the range 5 to 10 ({0})")]
    OutOfRange(u8),
    #[error("Fatigue score must be an integer")]
    ParseError,
}

pub const MANUAL_ENTRY_NOTE: &str = "App Manual Entry";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub date: NaiveDate,
    pub fatigue_score: FatigueScore,
    pub note: String,
}

impl Feedback {
    #[must_use]
    pub fn manual_entry(date: NaiveDate, fatigue_score: FatigueScore) -> Self {
        Self {
            date,
            fatigue_score,
            note: MANUAL_ENTRY_NOTE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_state_survey_default() {
        let survey = StateSurvey::default();
        assert_eq!(survey.sleep.as_ref(), "好");
        assert_eq!(survey.diet.as_ref(), "正常");
        assert_eq!(survey.doms().as_ref(), "无感");
        assert_eq!(survey.doms_part(), None);
        assert_eq!(survey.stress.as_ref(), "放松");
        assert_eq!(survey.other_activity.as_ref(), "无");
    }

    #[test]
    fn test_state_survey_doms_part() {
        let mut survey = StateSurvey::default();

        survey.set_doms_part("腿");
        assert_eq!(survey.doms_part(), None);

        survey.set_doms(Doms::Mild);
        survey.set_doms_part("腿");
        assert_eq!(survey.doms_part(), Some("腿"));

        survey.set_doms(Doms::Severe);
        assert_eq!(survey.doms_part(), Some("腿"));

        survey.set_doms(Doms::Absent);
        assert_eq!(survey.doms_part(), None);
    }

    #[test]
    fn test_survey_options() {
        assert_eq!(
            OtherActivity::iter()
                .map(|o| o.as_ref().to_string())
                .collect::<Vec<_>>(),
            vec!["无", "健身前打了羽毛球", "健身后要打羽毛球"]
        );
        assert_eq!("一般".parse::<Sleep>(), Ok(Sleep::Normal));
        assert_eq!("多".parse::<Diet>(), Ok(Diet::High));
        assert_eq!("轻微".parse::<Stress>(), Ok(Stress::Mild));
    }

    #[rstest]
    #[case(4, Err(FatigueScoreError::OutOfRange(4)))]
    #[case(5, Ok(FatigueScore(5)))]
    #[case(10, Ok(FatigueScore(10)))]
    #[case(11, Err(FatigueScoreError::OutOfRange(11)))]
    fn test_fatigue_score_new(
        #[case] value: u8,
        #[case] expected: Result<FatigueScore, FatigueScoreError>,
    ) {
        assert_eq!(FatigueScore::new(value), expected);
    }

    #[rstest]
    #[case("8", Ok(FatigueScore(8)))]
    #[case("x", Err(FatigueScoreError::ParseError))]
    fn test_fatigue_score_try_from_str(
        #[case] value: &str,
        #[case] expected: Result<FatigueScore, FatigueScoreError>,
    ) {
        assert_eq!(FatigueScore::try_from(value), expected);
    }

    #[test]
    fn test_feedback_manual_entry() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 26).unwrap();
        assert_eq!(
            Feedback::manual_entry(date, FatigueScore::default()),
            Feedback {
                date,
                fatigue_score: FatigueScore(5),
                note: "App Manual Entry".to_string(),
            }
        );
    }
}
