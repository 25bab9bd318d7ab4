//! Built-in exercise library
//!
//! Used whenever the remote exercise library is unavailable and as the template of the local
//! fallback plan, which never touches the network.

use std::collections::BTreeMap;

use crate::{BodyPart, BodyPartID, Exercise, Plan, PlanDetails};

pub const FALLBACK_SUMMARY: &str = "本地默认训练计划";

struct LibraryEntry {
    id: &'static str,
    name: &'static str,
}

const CHEST: &[LibraryEntry] = &[
    LibraryEntry {
        id: "bench_press",
        name: "平板卧推",
    },
    LibraryEntry {
        id: "incline_bench",
        name: "上斜卧推",
    },
    LibraryEntry {
        id: "dumbbell_fly",
        name: "哑铃飞鸟",
    },
    LibraryEntry {
        id: "push_up",
        name: "俯卧撑",
    },
    LibraryEntry {
        id: "cable_crossover",
        name: "绳索夹胸",
    },
];

const BACK: &[LibraryEntry] = &[
    LibraryEntry {
        id: "wide_grip_pull_up",
        name: "宽握引体",
    },
    LibraryEntry {
        id: "narrow_grip_pull_up",
        name: "窄握引体",
    },
    LibraryEntry {
        id: "wide_grip_lat_pulldown",
        name: "宽握高位下拉",
    },
    LibraryEntry {
        id: "t_bar_row",
        name: "T杠划船",
    },
    LibraryEntry {
        id: "seated_row",
        name: "坐姿划船",
    },
    LibraryEntry {
        id: "bicep_training",
        name: "二头肌训练",
    },
    LibraryEntry {
        id: "hyperextension",
        name: "反向挺身",
    },
];

const LEGS: &[LibraryEntry] = &[
    LibraryEntry {
        id: "squat",
        name: "深蹲",
    },
    LibraryEntry {
        id: "romanian_deadlift",
        name: "罗马尼亚硬拉",
    },
    LibraryEntry {
        id: "leg_extension",
        name: "腿屈伸",
    },
    LibraryEntry {
        id: "leg_press",
        name: "腿举",
    },
    LibraryEntry {
        id: "lunge",
        name: "箭步蹲",
    },
];

const SHOULDERS: &[LibraryEntry] = &[
    LibraryEntry {
        id: "overhead_press",
        name: "站姿推举",
    },
    LibraryEntry {
        id: "lateral_raise",
        name: "侧平举",
    },
    LibraryEntry {
        id: "face_pull",
        name: "面拉",
    },
    LibraryEntry {
        id: "front_raise",
        name: "前平举",
    },
];

const CORE: &[LibraryEntry] = &[
    LibraryEntry {
        id: "plank",
        name: "平板支撑",
    },
    LibraryEntry {
        id: "crunch",
        name: "卷腹",
    },
    LibraryEntry {
        id: "leg_raise",
        name: "举腿",
    },
    LibraryEntry {
        id: "russian_twist",
        name: "俄罗斯转体",
    },
];

fn entries(body_part: BodyPartID) -> &'static [LibraryEntry] {
    match body_part {
        BodyPartID::Chest => CHEST,
        BodyPartID::Back => BACK,
        BodyPartID::Legs => LEGS,
        BodyPartID::Shoulders => SHOULDERS,
        BodyPartID::Core => CORE,
        BodyPartID::Upper1
        | BodyPartID::Lower1
        | BodyPartID::Upper2
        | BodyPartID::Lower2
        | BodyPartID::Custom => &[],
    }
}

#[must_use]
pub fn exercises(body_part: BodyPartID) -> Vec<Exercise> {
    entries(body_part)
        .iter()
        .map(|entry| Exercise::new(entry.id, entry.name, body_part))
        .collect()
}

/// Deterministic plan used when plan generation fails or is skipped.
#[must_use]
pub fn fallback_plan(body_part: &BodyPart) -> Plan {
    Plan {
        exercises: exercises(body_part.id),
        set_logs: BTreeMap::new(),
        details: PlanDetails {
            summary: format!("{FALLBACK_SUMMARY}（{}）", body_part.name),
            adjustments: String::new(),
            feedback_required: vec![],
            raw_content: String::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(BodyPartID::Chest, 5)]
    #[case(BodyPartID::Back, 7)]
    #[case(BodyPartID::Legs, 5)]
    #[case(BodyPartID::Shoulders, 4)]
    #[case(BodyPartID::Core, 4)]
    #[case(BodyPartID::Upper1, 0)]
    #[case(BodyPartID::Custom, 0)]
    fn test_exercises(#[case] body_part: BodyPartID, #[case] expected_len: usize) {
        let exercises = exercises(body_part);
        assert_eq!(exercises.len(), expected_len);
        assert!(exercises.iter().all(|e| e.body_part == body_part && !e.is_warmup()));
    }

    #[test]
    fn test_fallback_plan() {
        let plan = fallback_plan(&BodyPart::from(BodyPartID::Shoulders));
        assert_eq!(
            plan.exercises
                .iter()
                .map(|e| e.name.as_str())
                .collect::<Vec<_>>(),
            vec!["站姿推举", "侧平举", "面拉", "前平举"]
        );
        assert!(plan.set_logs.is_empty());
        assert_eq!(plan.details.summary, "本地默认训练计划（肩）");
        assert!(plan.details.raw_content.is_empty());
    }
}
