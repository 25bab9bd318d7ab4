use std::{fmt, sync::LazyLock};

use derive_more::{Deref, Display, Into};
use regex::Regex;
use uuid::Uuid;

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, PartialOrd)]
pub struct Weight(f32);

impl Weight {
    pub const ZERO: Weight = Weight(0.0);
    pub const MAX: f32 = 999.9;

    pub fn new(value: f32) -> Result<Self, WeightError> {
        if !(0.0..1000.0).contains(&value) {
            return Err(WeightError::OutOfRange);
        }

        if ((value * 10.0).round() - value * 10.0).abs() > 1e-3 {
            return Err(WeightError::InvalidResolution);
        }

        Ok(Self(value))
    }

    /// Rounds to the 0.1 kg resolution and clamps into the valid range.
    #[must_use]
    pub fn saturating(value: f32) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(((value * 10.0).round() / 10.0).clamp(0.0, Self::MAX))
    }

    #[must_use]
    pub fn adjust(self, delta: f32) -> Self {
        Self::saturating(self.0 + delta)
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 <= 0.0
    }
}

impl TryFrom<&str> for Weight {
    type Error = WeightError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.replace(',', ".").trim().parse::<f32>() {
            Ok(parsed_value) => Weight::new(parsed_value),
            Err(_) => Err(WeightError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum WeightError {
    #[error("Weight must be in the range 0.0 to 999.9 kg")]
    OutOfRange,
    #[error("Weight must be a multiple of 0.1 kg")]
    InvalidResolution,
    #[error("Weight must be a decimal")]
    ParseError,
}

#[derive(Debug, Default, Display, Clone, Copy, Into, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reps(u32);

impl Reps {
    pub const ZERO: Reps = Reps(0);
    pub const MAX: u32 = 999;

    pub fn new(value: u32) -> Result<Self, RepsError> {
        if value > Self::MAX {
            return Err(RepsError::OutOfRange);
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn saturating(value: f32) -> Self {
        if value.is_nan() || value <= 0.0 {
            return Self::ZERO;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Self((value.round() as u32).min(Self::MAX))
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<&str> for Reps {
    type Error = RepsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<u32>() {
            Ok(parsed_value) => Reps::new(parsed_value),
            Err(_) => Err(RepsError::ParseError),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RepsError {
    #[error("Reps must be in the range 0 to 999")]
    OutOfRange,
    #[error("Reps must be an integer")]
    ParseError,
}

/// Rate of perceived exertion, stored in tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RPE(u8);

impl RPE {
    pub const ONE: RPE = RPE(10);
    pub const FIVE: RPE = RPE(50);
    pub const SIX: RPE = RPE(60);
    pub const SEVEN: RPE = RPE(70);
    pub const EIGHT: RPE = RPE(80);
    pub const NINE: RPE = RPE(90);
    pub const TEN: RPE = RPE(100);

    pub fn new(value: f32) -> Result<Self, RPEError> {
        if !(1.0..=10.0).contains(&value) {
            return Err(RPEError::OutOfRange);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let v = (value * 10.0).round() as u8;

        if v % 5 != 0 {
            return Err(RPEError::InvalidResolution);
        }

        Ok(Self(v))
    }

    /// Rounds to the nearest half step and caps at 10. Values that round to zero mean that no
    /// RPE was given.
    #[must_use]
    pub fn saturating(value: f32) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        let half_steps = (value.clamp(0.0, 10.0) * 2.0).round();
        if half_steps < 1.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Self((half_steps as u8) * 5).max(Self::ONE))
    }
}

impl From<RPE> for f32 {
    fn from(value: RPE) -> Self {
        f32::from(value.0) / 10.0
    }
}

impl TryFrom<&str> for RPE {
    type Error = RPEError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().parse::<f32>() {
            Ok(parsed_value) => RPE::new(parsed_value),
            Err(_) => Err(RPEError::ParseError),
        }
    }
}

impl fmt::Display for RPE {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", f32::from(*self))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum RPEError {
    #[error("RPE must be in the range 1.0 to 10.0")]
    OutOfRange,
    #[error("RPE must be a multiple of 0.5")]
    InvalidResolution,
    #[error("RPE must be a decimal")]
    ParseError,
}

#[derive(Deref, Debug, Display, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SetID(String);

impl SetID {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl From<String> for SetID {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SetID {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetLog {
    pub id: SetID,
    pub weight: Weight,
    pub reps: Reps,
    pub rpe: Option<RPE>,
    pub note: Option<String>,
}

impl SetLog {
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Weight::ZERO, Reps::ZERO)
    }

    #[must_use]
    pub fn new(weight: Weight, reps: Reps) -> Self {
        Self {
            id: SetID::generate(),
            weight,
            reps,
            rpe: None,
            note: None,
        }
    }

    /// Only performed sets are persisted.
    #[must_use]
    pub fn is_performed(&self) -> bool {
        !self.weight.is_zero() || !self.reps.is_zero()
    }
}

/// Extracts a number from decorated text such as `"20kg"`, `"8次"` or `"RPE 9.5"`.
///
/// Every character that is neither an ASCII digit nor a dot is removed and the longest leading
/// decimal of the remainder is parsed. Text without any parsable number yields zero.
#[must_use]
pub fn extract_number(text: &str) -> f32 {
    let filtered = NON_NUMERIC.replace_all(text, "");
    LEADING_DECIMAL
        .find(&filtered)
        .map_or("", |m| m.as_str())
        .parse::<f32>()
        .unwrap_or(0.0)
}

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.]").unwrap());

static LEADING_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*\.?[0-9]*").unwrap());
