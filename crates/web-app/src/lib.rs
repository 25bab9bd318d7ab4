#![warn(clippy::pedantic)]

pub mod log;
mod settings;

pub use settings::{
    Backend, OtherHistorySetting, Provider, ProviderSettings, SYSTEM_INSTRUCTION, Settings,
    SettingsRepository, SupabaseSettings, TargetHistorySetting,
};
