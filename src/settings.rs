//! Engine settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before the first
//!   `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before the first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub lexicon: LexiconSettings,
    pub generation: GenerationSettings,
    pub scoring: ScoringSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LexiconSettings {
    pub path: String,
    pub default_topic: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationSettings {
    pub sample_cap: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub ngram_bin: String,
    pub lm_path: String,
    pub order: u32,
    pub timeout_secs: u64,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    if s.lexicon.default_topic.is_empty() {
        return Err(SettingsError::InvalidValue {
            field: "lexicon.default_topic".to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if s.generation.sample_cap == 0 {
        return Err(SettingsError::InvalidValue {
            field: "generation.sample_cap".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    if !(1..=9).contains(&s.scoring.order) {
        return Err(SettingsError::InvalidValue {
            field: "scoring.order".to_string(),
            reason: "must be between 1 and 9".to_string(),
        });
    }
    if s.scoring.timeout_secs == 0 {
        return Err(SettingsError::InvalidValue {
            field: "scoring.timeout_secs".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_toml_is_valid() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.generation.sample_cap, 20);
        assert_eq!(s.scoring.order, 4);
        assert_eq!(s.lexicon.default_topic, "丽人类");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_cap = DEFAULT_SETTINGS_TOML.replace("sample_cap = 20", "sample_cap = 0");
        assert!(matches!(
            parse_settings_toml(&bad_cap),
            Err(SettingsError::InvalidValue { .. })
        ));

        let bad_order = DEFAULT_SETTINGS_TOML.replace("order = 4", "order = 12");
        assert!(matches!(
            parse_settings_toml(&bad_order),
            Err(SettingsError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_garbage_toml_rejected() {
        assert!(matches!(
            parse_settings_toml("not toml at all ["),
            Err(SettingsError::Parse(_))
        ));
    }
}
