use bubblelift_domain::{HistoryConfig, OtherHistory, TargetHistory};

#[allow(async_fn_in_trait)]
pub trait SettingsRepository {
    async fn read_settings(&self) -> Result<Settings, String>;
    async fn write_settings(&self, settings: Settings) -> Result<(), String>;
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub provider: Provider,
    pub deepseek: ProviderSettings,
    pub gemini: ProviderSettings,
    pub supabase: SupabaseSettings,
    pub backend: Backend,
    pub target_history: TargetHistorySetting,
    pub other_history: OtherHistorySetting,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: Provider::DeepSeek,
            deepseek: ProviderSettings {
                api_key: String::new(),
                model: "deepseek-reasoner".to_string(),
                base_url: "https://api.deepseek.com".to_string(),
            },
            gemini: ProviderSettings {
                api_key: String::new(),
                model: "gemini-2.5-flash".to_string(),
                base_url: "https://generativelanguage.googleapis.com".to_string(),
            },
            supabase: SupabaseSettings::default(),
            backend: Backend::Supabase,
            target_history: TargetHistorySetting::RecentLogs(20),
            other_history: OtherHistorySetting::RecentLogs(20),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn provider_settings(&self) -> &ProviderSettings {
        match self.provider {
            Provider::DeepSeek => &self.deepseek,
            Provider::Gemini => &self.gemini,
        }
    }

    #[must_use]
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            target: self.target_history.into(),
            other: self.other_history.into(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    DeepSeek,
    Gemini,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Supabase,
    LocalStorage,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetHistorySetting {
    RecentLogs(usize),
    RecentDates(usize),
}

impl From<TargetHistorySetting> for TargetHistory {
    fn from(value: TargetHistorySetting) -> Self {
        match value {
            TargetHistorySetting::RecentLogs(logs) => TargetHistory::RecentLogs(logs),
            TargetHistorySetting::RecentDates(dates) => TargetHistory::RecentDates(dates),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtherHistorySetting {
    RecentLogs(usize),
    TrailingDays(u64),
}

impl From<OtherHistorySetting> for OtherHistory {
    fn from(value: OtherHistorySetting) -> Self {
        match value {
            OtherHistorySetting::RecentLogs(logs) => OtherHistory::RecentLogs(logs),
            OtherHistorySetting::TrailingDays(days) => OtherHistory::TrailingDays(days),
        }
    }
}

pub const SYSTEM_INSTRUCTION: &str = r#"你是一名专业的私人健身教练，擅长力量训练编程、双重渐进、疲劳管理与 RPE 调控。

请根据用户提供的 JSON 数据（recent_target_logs、recent_other_logs、state_survey、user_feedback）为下一次训练生成计划。

先用一段文字概述本次训练：所处的训练周期阶段、主要目标、今日的动作以及与上次相比的调整理由。

然后输出一个 JSON 对象，结构如下，不要包含任何 markdown 格式：

{
  "训练计划": {
    "日期": "11.26",
    "热身": [
      {"动作": "动态肩部拉伸", "次数": 10, "备注": "激活肩袖"}
    ],
    "主项：坐姿哑铃推举": {
      "目标": "挑战 20kg × 6",
      "表格": [
        {"组": 1, "重量": "14kg", "次数": 10, "RPE": 7, "节奏": "主力"}
      ]
    }
  }
}

每组给出确定的次数，不要给出次数范围。"#;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.provider_settings().model, "deepseek-reasoner");
        assert_eq!(settings.history_config(), HistoryConfig::default());
    }

    #[test]
    fn test_settings_history_config() {
        let settings = Settings {
            target_history: TargetHistorySetting::RecentDates(4),
            other_history: OtherHistorySetting::TrailingDays(7),
            ..Settings::default()
        };
        assert_eq!(
            settings.history_config(),
            HistoryConfig {
                target: TargetHistory::RecentDates(4),
                other: OtherHistory::TrailingDays(7),
            }
        );
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let settings = serde_json::from_str::<Settings>(
            r#"{"provider": "Gemini", "gemini": {"api_key": "key", "model": "gemini-2.5-pro", "base_url": "https://example.com"}}"#,
        )
        .unwrap();

        assert_eq!(settings.provider, Provider::Gemini);
        assert_eq!(settings.provider_settings().api_key, "key");
        assert_eq!(settings.deepseek, Settings::default().deepseek);
        assert_eq!(settings.backend, Backend::Supabase);
    }

    #[test]
    fn test_system_instruction_contains_root_key() {
        assert!(SYSTEM_INSTRUCTION.contains(bubblelift_domain::ROOT_KEY));
    }
}
