use serde::{Deserialize, Serialize};

/// Configuration from config.toml in the data directory. Every field has a
/// default so a missing or partial file always yields a usable config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub reminder: ReminderConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Seconds between reminder ticks in interactive mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Arm the reminder automatically when the interactive menu starts.
    #[serde(default = "default_true")]
    pub auto_start: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            interval_secs: default_interval_secs(),
            auto_start: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// ANSI colors in interactive output.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig { color: true }
    }
}

fn default_interval_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_on_empty_document() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.reminder.interval_secs, 10);
        assert!(config.reminder.auto_start);
        assert!(config.ui.color);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: AppConfig = toml::from_str("[reminder]\ninterval_secs = 30\n").unwrap();
        assert_eq!(config.reminder.interval_secs, 30);
        assert!(config.reminder.auto_start);
        assert!(config.ui.color);
    }
}
