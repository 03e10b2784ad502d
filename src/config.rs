//! Configuration management for chat
//!
//! This module holds the fixed model table, the resolved [`Settings`] and the
//! resolver that merges compiled-in defaults, persisted values and
//! command-line overrides. It also reads the gateway configuration from the
//! environment.

use std::fmt;

/// Fallback when a resolved temperature is outside (0.0, 2.0)
pub const FALLBACK_TEMPERATURE: f64 = 1.0;

/// Fallback when a resolved retain count is outside [0, 9]
pub const FALLBACK_RETAIN: usize = 3;

/// Largest accepted retain count
pub const MAX_RETAIN: usize = 9;

/// Default OpenAI-compatible API base
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const DEFAULT_INSTRUCTIONS: &str = "If you are asked to complete a complex task, break the task into \
multiple steps and reason your way through each step. Otherwise, keep responses short and direct.";

/// Short user-facing model key
///
/// Each key maps to exactly one provider model identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum ModelKey {
    /// gpt-3.5-turbo
    #[default]
    #[value(name = "3.5")]
    Gpt35,
    /// gpt-4o
    #[value(name = "4o")]
    Gpt4o,
    /// o3-mini
    #[value(name = "o3")]
    O3Mini,
}

impl ModelKey {
    /// Every key in the table, in display order
    pub const ALL: [ModelKey; 3] = [ModelKey::Gpt35, ModelKey::Gpt4o, ModelKey::O3Mini];

    /// The short key as typed on the command line and stored on disk
    pub fn key(&self) -> &'static str {
        match self {
            Self::Gpt35 => "3.5",
            Self::Gpt4o => "4o",
            Self::O3Mini => "o3",
        }
    }

    /// The provider's full model identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::config::ModelKey;
    ///
    /// assert_eq!(ModelKey::Gpt4o.model_id(), "gpt-4o");
    /// ```
    pub fn model_id(&self) -> &'static str {
        match self {
            Self::Gpt35 => "gpt-3.5-turbo",
            Self::Gpt4o => "gpt-4o",
            Self::O3Mini => "o3-mini",
        }
    }

    /// Looks up a short key; `None` if it is not in the table
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw, possibly partial, setting values from one source
///
/// Both the state file and the command line produce a layer. Values are kept
/// raw (an unknown model key, a negative retain) so that validation happens in
/// exactly one place: [`Settings::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsLayer {
    /// Short model key
    pub model: Option<String>,
    /// Sampling temperature
    pub temperature: Option<f64>,
    /// System instructions
    pub instructions: Option<String>,
    /// Number of retained pairs
    pub retain: Option<i64>,
    /// Whether replies are bordered
    pub border: Option<bool>,
}

/// Fully resolved, validated settings for one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Selected model
    pub model: ModelKey,
    /// Temperature strictly inside (0.0, 2.0)
    pub temperature: f64,
    /// System instructions sent first in every request
    pub instructions: String,
    /// Retained user/assistant pairs, 0..=9
    pub retain: usize,
    /// Print a border around replies
    pub border: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ModelKey::default(),
            temperature: FALLBACK_TEMPERATURE,
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            retain: FALLBACK_RETAIN,
            border: true,
        }
    }
}

impl Settings {
    /// Merge defaults, persisted values and CLI values into one settings value
    ///
    /// Per field the CLI wins over the persisted layer, which wins over the
    /// defaults. The winning value is then validated:
    ///
    /// - an unknown model key resets to the baseline key (`3.5`)
    /// - a temperature outside (0.0, 2.0) resets to 1.0
    /// - a retain count outside [0, 9] resets to 3
    ///
    /// Out-of-range values are never an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use chat::config::{Settings, SettingsLayer};
    ///
    /// let persisted = SettingsLayer { retain: Some(5), ..Default::default() };
    /// let cli = SettingsLayer { retain: Some(2), ..Default::default() };
    ///
    /// let settings = Settings::resolve(&Settings::default(), Some(&persisted), &cli);
    /// assert_eq!(settings.retain, 2);
    /// ```
    pub fn resolve(
        defaults: &Settings,
        persisted: Option<&SettingsLayer>,
        cli: &SettingsLayer,
    ) -> Settings {
        let empty = SettingsLayer::default();
        let persisted = persisted.unwrap_or(&empty);

        let model = match cli.model.as_deref().or(persisted.model.as_deref()) {
            Some(key) => ModelKey::from_key(key).unwrap_or_else(|| {
                tracing::warn!("Unknown model key {:?}, using {}", key, ModelKey::default());
                ModelKey::default()
            }),
            None => defaults.model,
        };

        let temperature = cli
            .temperature
            .or(persisted.temperature)
            .unwrap_or(defaults.temperature);
        let temperature = if temperature > 0.0 && temperature < 2.0 {
            temperature
        } else {
            tracing::warn!(
                "Temperature {} outside (0.0, 2.0), using {}",
                temperature,
                FALLBACK_TEMPERATURE
            );
            FALLBACK_TEMPERATURE
        };

        let retain = cli
            .retain
            .or(persisted.retain)
            .unwrap_or(defaults.retain as i64);
        let retain = match usize::try_from(retain) {
            Ok(r) if r <= MAX_RETAIN => r,
            _ => {
                tracing::warn!(
                    "Retain {} outside [0, {}], using {}",
                    retain,
                    MAX_RETAIN,
                    FALLBACK_RETAIN
                );
                FALLBACK_RETAIN
            }
        };

        let instructions = cli
            .instructions
            .clone()
            .or_else(|| persisted.instructions.clone())
            .unwrap_or_else(|| defaults.instructions.clone());

        let border = cli.border.or(persisted.border).unwrap_or(defaults.border);

        Settings {
            model,
            temperature,
            instructions,
            retain,
            border,
        }
    }

    /// Full layer carrying every value of these settings
    pub fn to_layer(&self) -> SettingsLayer {
        SettingsLayer {
            model: Some(self.model.key().to_string()),
            temperature: Some(self.temperature),
            instructions: Some(self.instructions.clone()),
            retain: Some(self.retain as i64),
            border: Some(self.border),
        }
    }
}

/// Completion gateway configuration
///
/// Read from the environment; nothing here is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Base URL of the OpenAI-compatible API (no trailing slash)
    pub api_base: String,
    /// Bearer token; only required once a prompt is actually sent
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    120
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

impl GatewayConfig {
    /// Load the gateway configuration from defaults and environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_vars();
        config
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base) = std::env::var("OPENAI_BASE_URL") {
            let base = base.trim().trim_end_matches('/');
            if !base.is_empty() {
                self.api_base = base.to_string();
            }
        }

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(timeout) = std::env::var("CHAT_TIMEOUT_SECONDS") {
            match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_seconds = secs,
                _ => tracing::warn!("Ignoring invalid CHAT_TIMEOUT_SECONDS: {}", timeout),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn layer_with_retain(retain: i64) -> SettingsLayer {
        SettingsLayer {
            retain: Some(retain),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.model, ModelKey::Gpt35);
        assert_eq!(settings.temperature, 1.0);
        assert_eq!(settings.retain, 3);
        assert!(settings.border);
        assert!(settings.instructions.starts_with("If you are asked"));
    }

    #[test]
    fn test_model_table() {
        assert_eq!(ModelKey::from_key("3.5"), Some(ModelKey::Gpt35));
        assert_eq!(ModelKey::from_key("o3").map(|m| m.model_id()), Some("o3-mini"));
        assert_eq!(ModelKey::from_key("gpt-4"), None);
        for model in ModelKey::ALL {
            assert_eq!(ModelKey::from_key(model.key()), Some(model));
        }
    }

    #[test]
    fn test_resolve_cli_beats_persisted() {
        let settings = Settings::resolve(
            &Settings::default(),
            Some(&layer_with_retain(5)),
            &layer_with_retain(2),
        );
        assert_eq!(settings.retain, 2);
    }

    #[test]
    fn test_resolve_persisted_beats_default() {
        let settings = Settings::resolve(
            &Settings::default(),
            Some(&layer_with_retain(5)),
            &SettingsLayer::default(),
        );
        assert_eq!(settings.retain, 5);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let settings = Settings::resolve(&Settings::default(), None, &SettingsLayer::default());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_resolve_clamps_temperature() {
        let persisted = SettingsLayer {
            temperature: Some(3.7),
            ..Default::default()
        };
        let settings =
            Settings::resolve(&Settings::default(), Some(&persisted), &SettingsLayer::default());
        assert_eq!(settings.temperature, 1.0);
    }

    #[test]
    fn test_resolve_temperature_bounds_are_exclusive() {
        for bad in [0.0, 2.0, -0.5, f64::NAN] {
            let cli = SettingsLayer {
                temperature: Some(bad),
                ..Default::default()
            };
            let settings = Settings::resolve(&Settings::default(), None, &cli);
            assert_eq!(settings.temperature, FALLBACK_TEMPERATURE);
        }

        let cli = SettingsLayer {
            temperature: Some(1.9),
            ..Default::default()
        };
        assert_eq!(Settings::resolve(&Settings::default(), None, &cli).temperature, 1.9);
    }

    #[test]
    fn test_resolve_clamps_retain() {
        for bad in [12, -1, 10] {
            let settings = Settings::resolve(
                &Settings::default(),
                Some(&layer_with_retain(bad)),
                &SettingsLayer::default(),
            );
            assert_eq!(settings.retain, 3, "retain {}", bad);
        }

        for good in [0, 9] {
            let settings =
                Settings::resolve(&Settings::default(), None, &layer_with_retain(good));
            assert_eq!(settings.retain, good as usize);
        }
    }

    #[test]
    fn test_resolve_unknown_model_resets_to_baseline() {
        let persisted = SettingsLayer {
            model: Some("gpt-3.5-turbo".to_string()),
            ..Default::default()
        };
        let defaults = Settings {
            model: ModelKey::Gpt4o,
            ..Settings::default()
        };
        let settings = Settings::resolve(&defaults, Some(&persisted), &SettingsLayer::default());
        assert_eq!(settings.model, ModelKey::Gpt35);
    }

    #[test]
    fn test_resolve_instructions_and_border() {
        let persisted = SettingsLayer {
            instructions: Some("persisted".to_string()),
            border: Some(false),
            ..Default::default()
        };
        let cli = SettingsLayer {
            instructions: Some("from cli".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(&Settings::default(), Some(&persisted), &cli);
        assert_eq!(settings.instructions, "from cli");
        assert!(!settings.border);
    }

    #[test]
    fn test_to_layer_resolves_back_to_same_settings() {
        let settings = Settings {
            model: ModelKey::O3Mini,
            temperature: 0.4,
            instructions: "short".to_string(),
            retain: 7,
            border: false,
        };
        let resolved = Settings::resolve(
            &Settings::default(),
            Some(&settings.to_layer()),
            &SettingsLayer::default(),
        );
        assert_eq!(resolved, settings);
    }

    #[test]
    fn test_gateway_config_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_seconds, 120);
    }

    #[test]
    #[serial]
    fn test_gateway_config_from_env() {
        std::env::set_var("OPENAI_BASE_URL", "http://localhost:9999/v1/");
        std::env::set_var("OPENAI_API_KEY", "sk-test");
        std::env::set_var("CHAT_TIMEOUT_SECONDS", "15");

        let config = GatewayConfig::from_env();
        assert_eq!(config.api_base, "http://localhost:9999/v1");
        assert_eq!(config.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.timeout_seconds, 15);

        std::env::remove_var("OPENAI_BASE_URL");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("CHAT_TIMEOUT_SECONDS");
    }

    #[test]
    #[serial]
    fn test_gateway_config_ignores_bad_timeout() {
        std::env::set_var("CHAT_TIMEOUT_SECONDS", "soon");
        let config = GatewayConfig::from_env();
        assert_eq!(config.timeout_seconds, 120);
        std::env::remove_var("CHAT_TIMEOUT_SECONDS");
    }
}
