use std::{collections::HashMap, fs};

use timer_core::DEFAULT_SYNC_TOPIC;

#[derive(Debug, Clone)]
pub struct Settings {
    pub default_seconds: i64,
    pub sync_topic: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_seconds: 180,
            sync_topic: DEFAULT_SYNC_TOPIC.to_string(),
        }
    }
}

/// Defaults, overlaid by `timebox.toml` in the working directory, overlaid
/// by `TIMEBOX__*` environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("timebox.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("default_seconds") {
                apply_default_seconds(&mut settings, v);
            }
            if let Some(v) = file_cfg.get("sync_topic") {
                settings.sync_topic = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("TIMEBOX__DEFAULT_SECONDS") {
        apply_default_seconds(&mut settings, &v);
    }
    if let Ok(v) = std::env::var("TIMEBOX__SYNC_TOPIC") {
        settings.sync_topic = v;
    }

    settings
}

fn apply_default_seconds(settings: &mut Settings, raw: &str) {
    if let Ok(parsed) = raw.parse::<i64>() {
        if parsed > 0 {
            settings.default_seconds = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_session_default() {
        let settings = Settings::default();
        assert_eq!(settings.default_seconds, 180);
        assert_eq!(settings.sync_topic, DEFAULT_SYNC_TOPIC);
    }

    #[test]
    fn ignores_unparseable_or_non_positive_seconds() {
        let mut settings = Settings::default();
        apply_default_seconds(&mut settings, "not-a-number");
        assert_eq!(settings.default_seconds, 180);
        apply_default_seconds(&mut settings, "-5");
        assert_eq!(settings.default_seconds, 180);
        apply_default_seconds(&mut settings, "90");
        assert_eq!(settings.default_seconds, 90);
    }
}
