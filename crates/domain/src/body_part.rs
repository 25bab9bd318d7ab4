use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator};

#[derive(
    Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, AsRefStr, EnumString, EnumIter,
)]
pub enum BodyPartID {
    #[strum(serialize = "chest")]
    Chest,
    #[strum(serialize = "back")]
    Back,
    #[strum(serialize = "legs")]
    Legs,
    #[strum(serialize = "shoulders")]
    Shoulders,
    #[strum(serialize = "core")]
    Core,
    #[strum(serialize = "upper1")]
    Upper1,
    #[strum(serialize = "lower1")]
    Lower1,
    #[strum(serialize = "upper2")]
    Upper2,
    #[strum(serialize = "lower2")]
    Lower2,
    #[strum(serialize = "custom")]
    Custom,
}

impl BodyPartID {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BodyPartID::Chest => "胸",
            BodyPartID::Back => "背",
            BodyPartID::Legs => "腿",
            BodyPartID::Shoulders => "肩",
            BodyPartID::Core => "核心",
            BodyPartID::Upper1 => "上肢 A",
            BodyPartID::Lower1 => "下肢 A",
            BodyPartID::Upper2 => "上肢 B",
            BodyPartID::Lower2 => "下肢 B",
            BodyPartID::Custom => "自定义",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            BodyPartID::Chest => "bg-blue-100 text-blue-600",
            BodyPartID::Back => "bg-indigo-100 text-indigo-600",
            BodyPartID::Legs => "bg-rose-100 text-rose-600",
            BodyPartID::Shoulders => "bg-orange-100 text-orange-600",
            BodyPartID::Core => "bg-emerald-100 text-emerald-600",
            BodyPartID::Upper1 | BodyPartID::Upper2 => "bg-sky-100 text-sky-600",
            BodyPartID::Lower1 | BodyPartID::Lower2 => "bg-amber-100 text-amber-600",
            BodyPartID::Custom => "bg-slate-100 text-slate-600",
        }
    }

    /// Body parts offered on the home screen.
    #[must_use]
    pub fn is_default(self) -> bool {
        matches!(
            self,
            BodyPartID::Chest
                | BodyPartID::Back
                | BodyPartID::Legs
                | BodyPartID::Shoulders
                | BodyPartID::Core
        )
    }

    /// Resolves a body part by its identifier or, failing that, by its display name.
    #[must_use]
    pub fn resolve(id_or_name: &str) -> Option<BodyPartID> {
        let trimmed = id_or_name.trim();
        trimmed
            .parse::<BodyPartID>()
            .ok()
            .or_else(|| BodyPartID::iter().find(|id| id.name() == trimmed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPart {
    pub id: BodyPartID,
    pub name: String,
    pub color: String,
}

impl From<BodyPartID> for BodyPart {
    fn from(id: BodyPartID) -> Self {
        Self {
            id,
            name: id.name().to_string(),
            color: id.color().to_string(),
        }
    }
}

#[must_use]
pub fn default_body_parts() -> Vec<BodyPart> {
    BodyPartID::iter()
        .filter(|id| id.is_default())
        .map(BodyPart::from)
        .collect()
}
