use chrono::{Days, NaiveDate};
use log::warn;

use crate::{BodyPartID, CreateError, OperationLog, RPE, ReadError, Reps, Weight};

#[allow(async_fn_in_trait)]
pub trait WorkoutLogRepository {
    /// Returns the matching logs, most recent first.
    async fn read_workout_logs(&self, query: &LogQuery) -> Result<Vec<WorkoutLog>, ReadError>;
    async fn create_workout_logs(&self, logs: Vec<WorkoutLog>) -> Result<(), CreateError>;
}

/// Persisted record of one exercise performed on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutLog {
    pub body_part: BodyPartID,
    pub exercise: String,
    pub sets: Vec<LoggedSet>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggedSet {
    /// 1-based position within the exercise.
    pub set: u32,
    pub reps: Reps,
    pub weight: Weight,
    pub rpe: Option<RPE>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyPartFilter {
    Equal(BodyPartID),
    NotEqual(BodyPartID),
}

/// Read filter for workout logs. Results are always ordered by date, most recent first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub body_part: BodyPartFilter,
    pub since: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl LogQuery {
    #[must_use]
    pub fn matches(&self, log: &WorkoutLog) -> bool {
        let body_part = match self.body_part {
            BodyPartFilter::Equal(id) => log.body_part == id,
            BodyPartFilter::NotEqual(id) => log.body_part != id,
        };
        body_part && self.since.is_none_or(|since| log.date >= since)
    }

    /// Filters, orders and limits logs the same way the remote store does.
    #[must_use]
    pub fn apply(&self, logs: Vec<WorkoutLog>) -> Vec<WorkoutLog> {
        let mut result = logs
            .into_iter()
            .filter(|log| self.matches(log))
            .collect::<Vec<_>>();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = self.limit {
            result.truncate(limit);
        }
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetHistory {
    /// The most recent logs.
    RecentLogs(usize),
    /// All logs of the most recent distinct dates.
    RecentDates(usize),
}

impl Default for TargetHistory {
    fn default() -> Self {
        TargetHistory::RecentLogs(20)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherHistory {
    /// The most recent logs.
    RecentLogs(usize),
    /// Logs of the given number of days up to and including today.
    TrailingDays(u64),
}

impl Default for OtherHistory {
    fn default() -> Self {
        OtherHistory::RecentLogs(20)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    pub target: TargetHistory,
    pub other: OtherHistory,
}

pub const MAX_TARGET_SESSIONS: usize = 4;
const RECENT_DATES_ROWS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    pub target_sessions: Vec<SessionSummary>,
    pub other_logs: Vec<WorkoutLog>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub date: NaiveDate,
    pub exercises: Vec<ExerciseSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSummary {
    pub name: String,
    pub sets: Vec<LoggedSet>,
}

/// Collects the history used as context for plan generation.
///
/// Read errors are reported in the operation log and replaced by empty results.
pub async fn fetch_history<R: WorkoutLogRepository>(
    repository: &R,
    body_part: BodyPartID,
    config: HistoryConfig,
    today: NaiveDate,
    operation_log: &mut OperationLog,
) -> History {
    let target_logs = match repository
        .read_workout_logs(&target_query(body_part, config.target))
        .await
    {
        Ok(logs) => {
            if logs.is_empty() {
                operation_log.push(format!(
                    "⚠️ 未找到同部位历史数据 (ID: {})",
                    body_part.as_ref()
                ));
            } else {
                operation_log.push(format!("✅ 成功获取 {} 条同部位记录", logs.len()));
            }
            match config.target {
                TargetHistory::RecentLogs(_) => logs,
                TargetHistory::RecentDates(dates) => retain_recent_dates(logs, dates),
            }
        }
        Err(err) => {
            warn!("failed to read target workout logs: {err}");
            operation_log.push(format!("❌ 数据库错误 (Target): {err}"));
            vec![]
        }
    };

    let other_logs = match repository
        .read_workout_logs(&other_query(body_part, config.other, today))
        .await
    {
        Ok(logs) => {
            operation_log.push(format!("✅ 成功获取 {} 条其他部位记录", logs.len()));
            logs
        }
        Err(err) => {
            warn!("failed to read other workout logs: {err}");
            operation_log.push(format!("❌ 数据库错误 (Other): {err}"));
            vec![]
        }
    };

    History {
        target_sessions: group_by_date(&target_logs),
        other_logs,
    }
}

fn target_query(body_part: BodyPartID, target: TargetHistory) -> LogQuery {
    LogQuery {
        body_part: BodyPartFilter::Equal(body_part),
        since: None,
        limit: Some(match target {
            TargetHistory::RecentLogs(limit) => limit,
            TargetHistory::RecentDates(_) => RECENT_DATES_ROWS,
        }),
    }
}

fn other_query(body_part: BodyPartID, other: OtherHistory, today: NaiveDate) -> LogQuery {
    match other {
        OtherHistory::RecentLogs(limit) => LogQuery {
            body_part: BodyPartFilter::NotEqual(body_part),
            since: None,
            limit: Some(limit),
        },
        OtherHistory::TrailingDays(days) => LogQuery {
            body_part: BodyPartFilter::NotEqual(body_part),
            since: today.checked_sub_days(Days::new(days.saturating_sub(1))),
            limit: None,
        },
    }
}

fn retain_recent_dates(logs: Vec<WorkoutLog>, dates: usize) -> Vec<WorkoutLog> {
    let mut recent_dates = Vec::<NaiveDate>::new();
    logs.into_iter()
        .filter(|log| {
            if recent_dates.contains(&log.date) {
                return true;
            }
            if recent_dates.len() < dates {
                recent_dates.push(log.date);
                return true;
            }
            false
        })
        .collect()
}

/// Groups logs into sessions by date in order of first appearance.
#[must_use]
pub fn group_by_date(logs: &[WorkoutLog]) -> Vec<SessionSummary> {
    let mut sessions = Vec::<SessionSummary>::new();
    for log in logs {
        let exercise = ExerciseSummary {
            name: log.exercise.clone(),
            sets: log.sets.clone(),
        };
        match sessions.iter_mut().find(|s| s.date == log.date) {
            Some(session) => session.exercises.push(exercise),
            None => sessions.push(SessionSummary {
                date: log.date,
                exercises: vec![exercise],
            }),
        }
    }
    sessions.truncate(MAX_TARGET_SESSIONS);
    sessions
}
