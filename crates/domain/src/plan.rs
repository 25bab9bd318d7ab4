//! Plan ingestion
//!
//! A generated plan arrives as free text: a natural-language preamble followed by one JSON
//! object. The object's root key `训练计划` holds the plan body, whose entries are classified
//! by their shape:
//!
//! - an array under a key containing `热身` is the warm-up,
//! - any other array is a list of accessory drills,
//! - an object is a main lift with an optional `表格` table of sets,
//! - everything else is skipped.

use std::{collections::BTreeMap, sync::LazyLock};

use log::debug;
use regex::Regex;
use serde_json::{Map, Value};

use crate::{
    BodyPartID, Exercise, ExerciseID, ExerciseKind, RPE, Reps, SetID, SetLog, Suggestion,
    WarmupStep, Weight, extract_number,
};

pub const ROOT_KEY: &str = "训练计划";
pub const WARMUP_ID: &str = "ai_warmup_combined";
pub const WARMUP_NAME: &str = "热身环节";

const DATE_KEY: &str = "日期";
const WARMUP_MARKER: &str = "热身";
const MAIN_LIFT_MARKERS: [&str; 2] = ["主项:", "主项："];
const MAIN_SET_TEMPOS: [&str; 2] = ["冲击", "主力"];

const TABLE_KEY: &str = "表格";
const GOAL_KEY: &str = "目标";
const ACTION_KEY: &str = "动作";
const REPS_KEY: &str = "次数";
const WEIGHT_KEY: &str = "重量";
const RPE_KEY: &str = "RPE";
const TEMPO_KEY: &str = "节奏";
const NOTE_KEY: &str = "备注";

const SUMMARY_KEYS: [&str; 1] = ["summary"];
const ADJUSTMENT_KEYS: [&str; 2] = ["adjustments", "fatigue_adjustments"];
const FEEDBACK_KEYS: [&str; 2] = ["notes", "post_workout_feedback_required"];

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub exercises: Vec<Exercise>,
    pub set_logs: BTreeMap<ExerciseID, Vec<SetLog>>,
    pub details: PlanDetails,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanDetails {
    pub summary: String,
    pub adjustments: String,
    pub feedback_required: Vec<String>,
    /// Complete, unmodified response text.
    pub raw_content: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("failed to parse plan: {0}")]
    Parse(String),
    #[error("plan is missing the '{ROOT_KEY}' root object")]
    Structure,
    #[error("no exercises found in the plan")]
    Empty,
}

enum PlanEntry<'a> {
    Date,
    Warmup(&'a [Value]),
    Drills(&'a [Value]),
    MainLift(&'a Map<String, Value>),
    Unrecognized,
}

impl<'a> PlanEntry<'a> {
    fn classify(key: &str, value: &'a Value) -> Self {
        if key == DATE_KEY {
            return PlanEntry::Date;
        }
        match value {
            Value::Array(items) if key.contains(WARMUP_MARKER) => PlanEntry::Warmup(items),
            Value::Array(items) => PlanEntry::Drills(items),
            Value::Object(body) => PlanEntry::MainLift(body),
            _ => PlanEntry::Unrecognized,
        }
    }
}

/// Converts a generated response into exercises, pre-filled sets and plan details.
pub fn parse_plan(content: &str, body_part: BodyPartID) -> Result<Plan, PlanError> {
    let (preamble, candidate) = split_response(content);
    let json = strip_code_fences(candidate);

    let root = serde_json::from_str::<Value>(&json).map_err(|err| {
        PlanError::Parse(format!(
            "{err} ({})",
            json.chars().take(100).collect::<String>()
        ))
    })?;

    let Some(body) = root.get(ROOT_KEY).and_then(Value::as_object) else {
        return Err(PlanError::Structure);
    };

    let mut builder = PlanBuilder::new(body_part);

    for (index, (key, value)) in body.iter().enumerate() {
        match PlanEntry::classify(key, value) {
            PlanEntry::Date => {}
            PlanEntry::Warmup(items) => builder.add_warmup(items),
            PlanEntry::Drills(items) => builder.add_drills(index, items),
            PlanEntry::MainLift(lift) => builder.add_main_lift(index, key, lift),
            PlanEntry::Unrecognized => debug!("skipping unrecognized plan entry \"{key}\""),
        }
    }

    if builder.exercises.is_empty() {
        return Err(PlanError::Empty);
    }

    Ok(Plan {
        exercises: builder.exercises,
        set_logs: builder.set_logs,
        details: plan_details(&root, body, preamble, content),
    })
}

/// Splits the response into the preamble and the JSON candidate spanning from the first `{` to
/// the last `}`.
fn split_response(content: &str) -> (&str, &str) {
    match (content.find('{'), content.rfind('}')) {
        (Some(first), Some(last)) if first < last => {
            (content[..first].trim(), &content[first..=last])
        }
        _ => ("", content),
    }
}

fn strip_code_fences(candidate: &str) -> String {
    candidate
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

struct PlanBuilder {
    body_part: BodyPartID,
    exercises: Vec<Exercise>,
    set_logs: BTreeMap<ExerciseID, Vec<SetLog>>,
    warmup: Option<usize>,
}

impl PlanBuilder {
    fn new(body_part: BodyPartID) -> Self {
        Self {
            body_part,
            exercises: vec![],
            set_logs: BTreeMap::new(),
            warmup: None,
        }
    }

    fn add_warmup(&mut self, items: &[Value]) {
        let steps = items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| WarmupStep {
                action: field_text(item, ACTION_KEY).unwrap_or_default(),
                reps: field_text(item, REPS_KEY).unwrap_or_default(),
                note: field_text(item, NOTE_KEY),
            });

        if let Some(index) = self.warmup {
            if let ExerciseKind::Warmup { steps: existing } = &mut self.exercises[index].kind {
                existing.extend(steps);
            }
            return;
        }

        self.warmup = Some(self.exercises.len());
        self.exercises.push(Exercise {
            id: WARMUP_ID.into(),
            name: WARMUP_NAME.to_string(),
            body_part: self.body_part,
            kind: ExerciseKind::Warmup {
                steps: steps.collect(),
            },
        });
    }

    fn add_drills(&mut self, index: usize, items: &[Value]) {
        for (i, item) in items.iter().enumerate() {
            let Some(item) = item.as_object() else {
                continue;
            };
            let Some(action) = field_text(item, ACTION_KEY) else {
                continue;
            };
            self.exercises.push(
                Exercise::new(format!("ai_misc_{index}_{i}"), action, self.body_part)
                    .with_suggestion(Suggestion {
                        sets: "1组".to_string(),
                        reps: format!("{}次", field_text(item, REPS_KEY).unwrap_or_default()),
                        weight: "自重/轻重量".to_string(),
                        rpe: None,
                        reasoning: field_text(item, NOTE_KEY),
                    }),
            );
        }
    }

    fn add_main_lift(&mut self, index: usize, key: &str, lift: &Map<String, Value>) {
        let id = ExerciseID::from(format!("ai_main_{index}"));
        let rows = lift
            .get(TABLE_KEY)
            .and_then(Value::as_array)
            .map(|rows| rows.iter().filter_map(Value::as_object).collect::<Vec<_>>())
            .unwrap_or_default();

        self.exercises.push(
            Exercise::new(id.clone(), exercise_name(key), self.body_part)
                .with_suggestion(main_lift_suggestion(&rows, field_text(lift, GOAL_KEY))),
        );

        if !rows.is_empty() {
            let sets = rows
                .iter()
                .enumerate()
                .map(|(i, row)| planned_set(&id, i, row))
                .collect();
            self.set_logs.insert(id, sets);
        }
    }
}

fn planned_set(exercise_id: &ExerciseID, index: usize, row: &Map<String, Value>) -> SetLog {
    let number = |key: &str| extract_number(&field_text(row, key).unwrap_or_default());
    SetLog {
        id: SetID::from(format!("auto_{exercise_id}_{index}")),
        weight: Weight::saturating(number(WEIGHT_KEY)),
        reps: Reps::saturating(number(REPS_KEY)),
        rpe: RPE::saturating(number(RPE_KEY)),
        note: field_text(row, TEMPO_KEY).or_else(|| field_text(row, NOTE_KEY)),
    }
}

fn main_lift_suggestion(rows: &[&Map<String, Value>], goal: Option<String>) -> Suggestion {
    let main_row = rows
        .iter()
        .find(|row| {
            field_text(row, TEMPO_KEY)
                .is_some_and(|tempo| MAIN_SET_TEMPOS.iter().any(|m| tempo.contains(m)))
        })
        .or(rows.last());

    Suggestion {
        sets: format!("{}组", rows.len()),
        reps: main_row
            .and_then(|row| field_text(row, REPS_KEY))
            .map_or_else(|| "-".to_string(), |reps| format!("{reps}次")),
        weight: main_row
            .and_then(|row| field_text(row, WEIGHT_KEY))
            .unwrap_or_else(|| "-".to_string()),
        rpe: main_row.and_then(|row| field_text(row, RPE_KEY)),
        reasoning: goal,
    }
}

/// Removes the main lift marker and any parenthetical annotation from a plan key.
fn exercise_name(key: &str) -> String {
    let mut name = key.to_string();
    for marker in MAIN_LIFT_MARKERS {
        name = name.replace(marker, "");
    }
    let name = strip_parentheticals(name.trim());
    let name = name.trim();
    if name.is_empty() {
        key.trim().to_string()
    } else {
        name.to_string()
    }
}

fn strip_parentheticals(text: &str) -> String {
    PARENTHETICAL.replace_all(text, "").into_owned()
}

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(（].*?[)）]").unwrap());

fn plan_details(
    root: &Value,
    body: &Map<String, Value>,
    preamble: &str,
    content: &str,
) -> PlanDetails {
    let summary = first_text(root, &SUMMARY_KEYS)
        .or_else(|| Some(preamble.to_string()).filter(|p| !p.is_empty()))
        .unwrap_or_else(|| match body.get(DATE_KEY) {
            Some(date) => format!("Date: {}\nNo additional summary provided.", text(date)),
            None => "No summary provided.".to_string(),
        });

    PlanDetails {
        summary,
        adjustments: first_text(root, &ADJUSTMENT_KEYS).unwrap_or_default(),
        feedback_required: FEEDBACK_KEYS
            .iter()
            .find_map(|key| root.get(*key))
            .map(feedback_items)
            .unwrap_or_default(),
        raw_content: content.to_string(),
    }
}

fn first_text(root: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| root.get(*key))
        .map(text)
        .find(|t| !t.trim().is_empty())
}

fn feedback_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(text)
            .filter(|item| !item.trim().is_empty())
            .collect(),
        Value::Null => vec![],
        other => {
            let item = text(other);
            if item.trim().is_empty() {
                vec![]
            } else {
                vec![item]
            }
        }
    }
}

fn field_text(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .filter(|value| !value.is_null())
        .map(text)
        .filter(|t| !t.is_empty())
}

fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    const SCENARIO: &str = r#"前言文字 {"训练计划": {"日期":"11.26","热身":[{"动作":"拉伉","次数":10}],"主项：卧推": {"目标":"x","表格":[{"重量":"20kg","次数":8,"RPE":8,"节奏":"主力"}]}}}"#;

    const FULL_RESPONSE: &str = r#"本次训练属于第 3 周推进期，主要目标是突破推举重量。

```json
{
  "训练计划": {
    "日期": "11.26",
    "热身（8-10 分钟）": [
      {"动作": "动态肩部拉伸", "次数": 10},
      {"动作": "轻度空中杠铃推举", "次数": 10},
      {"动作": "鞭力带肩部外旋", "次数": 10, "备注": "激活肩袖"}
    ],
    "主项：坐姿哑铃推举（增加强度）": {
      "目标": "今天开始挑战 20kg × 6。",
      "表格": [
        {"组": 1, "重量": "12kg", "次数": 12, "RPE": 6, "节奏": "热身"},
        {"组": 2, "重量": "14kg", "次数": 10, "RPE": 7, "节奏": "主力"},
        {"组": 3, "重量": "20kg", "次数": 6, "RPE": 9.5, "节奏": "小冲击"}
      ],
      "要点": ["保持胸部挺拔"]
    },
    "侧平举（加量控制）": {
      "目标": "稍微增加一些重量。",
      "表格": [
        {"组": 1, "重量": "8kg", "次数": 10, "RPE": 7, "节奏": "(舒缓)"},
        {"组": 2, "重量": "6kg", "次数": 14, "RPE": 8}
      ]
    }
  }
}
```"#;

    #[test]
    fn test_parse_plan_scenario() {
        let plan = parse_plan(SCENARIO, BodyPartID::Chest).unwrap();

        assert_eq!(plan.exercises.len(), 2);
        assert!(plan.exercises[0].is_warmup());
        assert_eq!(plan.exercises[0].id, ExerciseID::from(WARMUP_ID));
        assert_eq!(
            plan.exercises[0].warmup_steps(),
            &[WarmupStep {
                action: "拉伉".to_string(),
                reps: "10".to_string(),
                note: None,
            }]
        );
        assert_eq!(plan.exercises[1].name, "卧推");
        assert_eq!(plan.exercises[1].id, ExerciseID::from("ai_main_2"));

        let sets = &plan.set_logs[&plan.exercises[1].id];
        assert_eq!(sets.len(), 1);
        assert_approx_eq!(f32::from(sets[0].weight), 20.0);
        assert_eq!(u32::from(sets[0].reps), 8);
        assert_eq!(sets[0].rpe, Some(RPE::EIGHT));
        assert_eq!(sets[0].note.as_deref(), Some("主力"));
        assert_eq!(sets[0].id, SetID::from("auto_ai_main_2_0"));

        assert!(!plan.set_logs.contains_key(&ExerciseID::from(WARMUP_ID)));
        assert_eq!(plan.details.summary, "前言文字");
        assert_eq!(plan.details.raw_content, SCENARIO);
    }

    #[test]
    fn test_parse_plan_full_response() {
        let plan = parse_plan(FULL_RESPONSE, BodyPartID::Shoulders).unwrap();

        assert_eq!(
            plan.exercises
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>(),
            vec!["热身环节", "坐姿哑铃推举", "侧平举"]
        );
        assert_eq!(plan.exercises[0].warmup_steps().len(), 3);
        assert_eq!(
            plan.exercises[0].warmup_steps()[2].note.as_deref(),
            Some("激活肩袖")
        );
        assert!(plan.exercises.iter().all(|e| e.body_part == BodyPartID::Shoulders));

        assert_eq!(
            plan.exercises[1].suggestion(),
            Some(&Suggestion {
                sets: "3组".to_string(),
                reps: "10次".to_string(),
                weight: "14kg".to_string(),
                rpe: Some("7".to_string()),
                reasoning: Some("今天开始挑战 20kg × 6。".to_string()),
            })
        );
        let press = &plan.set_logs[&plan.exercises[1].id];
        assert_eq!(press.len(), 3);
        assert_eq!(press[2].rpe.map(f32::from), Some(9.5));

        let raises = &plan.set_logs[&plan.exercises[2].id];
        assert_eq!(raises[0].note.as_deref(), Some("(舒缓)"));
        assert_eq!(raises[1].note, None);
        assert_eq!(
            plan.exercises[2].suggestion().map(|s| s.weight.as_str()),
            Some("6kg")
        );

        assert_eq!(
            plan.details.summary,
            "本次训练属于第 3 周推进期，主要目标是突破推举重量。\n\n```json"
        );
        assert_eq!(plan.details.raw_content, FULL_RESPONSE);
    }

    #[test]
    fn test_parse_plan_single_warmup_for_multiple_warmup_entries() {
        let content = r#"{"训练计划": {
            "热身 A": [{"动作": "开合跳", "次数": "30秒"}],
            "深蹲": {"表格": [{"重量": "60kg", "次数": "8次"}]},
            "热身 B": [{"动作": "弹力带", "次数": 15}, {"动作": "臀桥", "次数": 12}]
        }}"#;

        let plan = parse_plan(content, BodyPartID::Legs).unwrap();

        assert_eq!(plan.exercises.iter().filter(|e| e.is_warmup()).count(), 1);
        assert_eq!(plan.exercises[0].warmup_steps().len(), 3);
        assert_eq!(plan.exercises[0].warmup_steps()[0].reps, "30秒");
        assert_eq!(plan.exercises[1].name, "深蹲");
    }

    #[test]
    fn test_parse_plan_drills() {
        let content = r#"{"训练计划": {"拉伸": [{"动作": "猫牛式", "次数": 10, "备注": "缓慢"}, {"次数": 3}, "x"]}}"#;

        let plan = parse_plan(content, BodyPartID::Core).unwrap();

        assert_eq!(
            plan.exercises,
            vec![
                Exercise::new("ai_misc_0_0", "猫牛式", BodyPartID::Core).with_suggestion(
                    Suggestion {
                        sets: "1组".to_string(),
                        reps: "10次".to_string(),
                        weight: "自重/轻重量".to_string(),
                        rpe: None,
                        reasoning: Some("缓慢".to_string()),
                    }
                )
            ]
        );
        assert!(plan.set_logs.is_empty());
    }

    #[test]
    fn test_parse_plan_main_lift_without_table() {
        let content = r#"{"训练计划": {"主项:硬拉 (技术)": {"目标": "技术练习"}}}"#;

        let plan = parse_plan(content, BodyPartID::Back).unwrap();

        assert_eq!(plan.exercises[0].name, "硬拉");
        assert_eq!(
            plan.exercises[0].suggestion().map(|s| (s.sets.as_str(), s.reps.as_str())),
            Some(("0组", "-"))
        );
        assert!(plan.set_logs.is_empty());
    }

    #[test]
    fn test_parse_plan_skips_unrecognized_entries() {
        let content = r#"{"训练计划": {"日期": "11.26", "备注": "多喝水", "组间休息": 90, "卷腹": {"表格": []}}}"#;

        let plan = parse_plan(content, BodyPartID::Core).unwrap();

        assert_eq!(plan.exercises.len(), 1);
        assert_eq!(plan.exercises[0].id, ExerciseID::from("ai_main_3"));
    }

    #[rstest]
    #[case::no_braces("今天休息，没有计划。")]
    #[case::unbalanced(r#"计划如下 {"训练计划": {"卧推": {"表格": []}"#)]
    #[case::reversed_braces("} 不是 JSON {")]
    #[case::invalid_json(r#"{"训练计划": {卧推}}"#)]
    fn test_parse_plan_parse_error(#[case] content: &str) {
        assert!(matches!(
            parse_plan(content, BodyPartID::Chest),
            Err(PlanError::Parse(_))
        ));
    }

    #[rstest]
    #[case::missing_root(r#"{"plan": {"卧推": {}}}"#)]
    #[case::root_not_object(r#"{"训练计划": ["卧推"]}"#)]
    fn test_parse_plan_structure_error(#[case] content: &str) {
        assert_eq!(
            parse_plan(content, BodyPartID::Chest),
            Err(PlanError::Structure)
        );
    }

    #[rstest]
    #[case::only_date(r#"{"训练计划": {"日期": "11.26"}}"#)]
    #[case::only_scalars(r#"{"训练计划": {"说明": "休息日", "时长": 30}}"#)]
    #[case::drills_without_action(r#"{"训练计划": {"拉伸": [{"次数": 10}]}}"#)]
    fn test_parse_plan_empty_error(#[case] content: &str) {
        assert_eq!(parse_plan(content, BodyPartID::Chest), Err(PlanError::Empty));
    }

    #[test]
    fn test_parse_plan_details_from_top_level_keys() {
        let content = r#"前言 {
            "summary": "推进期第 2 周",
            "fatigue_adjustments": "减少一组",
            "post_workout_feedback_required": ["肩部是否酸痛", "", "睡眠"],
            "训练计划": {"卧推": {"表格": [{"重量": 40, "次数": 8}]}}
        }"#;

        let details = parse_plan(content, BodyPartID::Chest).unwrap().details;

        assert_eq!(
            details,
            PlanDetails {
                summary: "推进期第 2 周".to_string(),
                adjustments: "减少一组".to_string(),
                feedback_required: vec!["肩部是否酸痛".to_string(), "睡眠".to_string()],
                raw_content: content.to_string(),
            }
        );
    }

    #[rstest]
    #[case::date(
        r#"{"训练计划": {"日期": "11.26", "卧推": {}}}"#,
        "Date: 11.26\nNo additional summary provided."
    )]
    #[case::no_date(r#"{"训练计划": {"卧推": {}}}"#, "No summary provided.")]
    fn test_parse_plan_summary_fallback(#[case] content: &str, #[case] expected: &str) {
        assert_eq!(
            parse_plan(content, BodyPartID::Chest).unwrap().details.summary,
            expected
        );
    }

    #[test]
    fn test_parse_plan_notes_as_single_string() {
        let content = r#"{"notes": "注意膝盖", "训练计划": {"深蹲": {}}}"#;
        assert_eq!(
            parse_plan(content, BodyPartID::Legs)
                .unwrap()
                .details
                .feedback_required,
            vec!["注意膝盖".to_string()]
        );
    }

    #[rstest]
    #[case(r#"{"重量": "20kg", "次数": "8次", "RPE": "RPE 9.5"}"#, 20.0, 8, Some(9.5))]
    #[case(r#"{"重量": "自重", "次数": "-", "RPE": "-"}"#, 0.0, 0, None)]
    #[case(r#"{"重量": 17.5, "次数": 12}"#, 17.5, 12, None)]
    #[case(r#"{}"#, 0.0, 0, None)]
    fn test_planned_set(
        #[case] row: &str,
        #[case] weight: f32,
        #[case] reps: u32,
        #[case] rpe: Option<f32>,
    ) {
        let row = serde_json::from_str::<Map<String, Value>>(row).unwrap();
        let set = planned_set(&ExerciseID::from("ai_main_1"), 0, &row);
        assert_approx_eq!(f32::from(set.weight), weight);
        assert_eq!(u32::from(set.reps), reps);
        assert_eq!(set.rpe.map(f32::from), rpe);
    }

    #[rstest]
    #[case("主项：坐姿哑铃推举（增加强度）", "坐姿哑铃推举")]
    #[case("主项:卧推", "卧推")]
    #[case("侧平举（加量控制）", "侧平举")]
    #[case("面拉 (轻重量) 收尾（慢）", "面拉  收尾")]
    #[case("引体（未闭合", "引体（未闭合")]
    #[case("（全部注释）", "（全部注释）")]
    #[case("硬拉（传统）（减量）", "硬拉")]
    #[case("划船(宽握）", "划船")]
    fn test_exercise_name(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(exercise_name(key), expected);
    }

    #[rstest]
    #[case("abc {\"a\": 1} def", ("abc", "{\"a\": 1}"))]
    #[case("{\"a\": {}}", ("", "{\"a\": {}}"))]
    #[case("no json", ("", "no json"))]
    fn test_split_response(#[case] content: &str, #[case] expected: (&str, &str)) {
        assert_eq!(split_response(content), expected);
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }
}
