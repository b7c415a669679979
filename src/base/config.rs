//! Load configuration from a dotenv file and the process environment via the `config` crate.

use std::{
    collections::BTreeMap,
    ops::Deref,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use thiserror::Error;
use tracing::{debug, instrument};

use super::types::Res;

/// Default location of the settings file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = "../.env";

/// Default directory holding the `*.prompt` templates.
pub const DEFAULT_PROMPTS_DIR: &str = "./prompts/";

/// Default Pivotal Tracker API root.
pub const DEFAULT_PIVOTAL_API_BASE: &str = "https://www.pivotaltracker.com/services/v5";

/// Settings that must be present (and non-empty) before any request is served.
pub const REQUIRED_SETTINGS: [&str; 6] = ["AI_API_KEY", "AI_MODEL", "AI_TEMPERATURE", "AI_MAX_TOKENS", "PIVOTAL_TOKEN", "PIVOTAL_PROJECT_ID"];

/// Settings that are read when present.
pub const OPTIONAL_SETTINGS: [&str; 4] = ["AI_PROVIDER", "AI_API_BASE", "PIVOTAL_API_BASE", "PROMPTS_DIR"];

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(".env file not found in {}", .0.display())]
    EnvFileNotFound(PathBuf),
    #[error("Missing environment variables: {}", .0.join(", "))]
    MissingSettings(Vec<String>),
    #[error("Invalid value `{value}` for {name}: {reason}")]
    InvalidSetting { name: &'static str, value: String, reason: String },
}

/// Completion service backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Anthropic,
    OpenAi,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(LlmProvider::Anthropic),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(format!("unknown provider `{other}` (expected `anthropic` or `openai`)")),
        }
    }
}

/// Read-only mapping from setting name to its raw value.
///
/// Empty values are dropped on construction, so a present key is never `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Build from explicit name/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(_, v)| !v.is_empty())
            .collect();

        Self { values }
    }

    /// Read every known setting from the process environment.
    pub fn from_environment() -> Res<Self> {
        let source = config::Config::builder().add_source(config::Environment::default()).build()?;

        let pairs = REQUIRED_SETTINGS
            .iter()
            .chain(OPTIONAL_SETTINGS.iter())
            .filter_map(|name| source.get_string(&name.to_ascii_lowercase()).ok().map(|value| (*name, value)));

        Ok(Self::from_pairs(pairs))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Names of required settings that are absent, in declaration order.
    pub fn missing(&self) -> Vec<String> {
        REQUIRED_SETTINGS.iter().filter(|name| self.get(name).is_none()).map(|name| name.to_string()).collect()
    }

    fn required(&self, name: &'static str) -> Res<String> {
        self.get(name).map(str::to_string).ok_or_else(|| ConfigError::MissingSettings(vec![name.to_string()]).into())
    }

    fn parse<T>(&self, name: &'static str) -> Res<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let value = self.required(name)?;

        value.trim().parse::<T>().map_err(|e| {
            ConfigError::InvalidSetting {
                name,
                value: value.clone(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Configuration for the assistant.
///
/// Constructed once at startup and handed to the runtime; cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigInner {
    /// Completion service API key (`AI_API_KEY`).
    pub ai_api_key: String,
    /// Completion service backend (`AI_PROVIDER`), defaults to Anthropic.
    pub ai_provider: LlmProvider,
    /// Model identifier (`AI_MODEL`).
    pub ai_model: String,
    /// Sampling temperature (`AI_TEMPERATURE`).
    /// Passed through as-is; the completion service enforces its own range.
    pub ai_temperature: f32,
    /// Max output tokens (`AI_MAX_TOKENS`).
    pub ai_max_tokens: u32,
    /// Optional override of the completion service base URL (`AI_API_BASE`).
    pub ai_api_base: Option<String>,
    /// Pivotal Tracker API token (`PIVOTAL_TOKEN`).
    pub pivotal_token: String,
    /// Pivotal Tracker project ID (`PIVOTAL_PROJECT_ID`).
    pub pivotal_project_id: String,
    /// Pivotal Tracker API root (`PIVOTAL_API_BASE`).
    pub pivotal_api_base: String,
    /// Directory holding the prompt templates (`PROMPTS_DIR`).
    pub prompts_dir: PathBuf,
}

impl Config {
    /// Load the settings file into the process environment, then build the configuration.
    ///
    /// The settings file must exist. Every required setting that is missing is reported at once.
    #[instrument(name = "Config::load", skip_all)]
    pub fn load(env_file: Option<&Path>, prompts_dir: Option<&Path>) -> Res<Self> {
        let env_file = env_file.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE));

        if !env_file.is_file() {
            return Err(ConfigError::EnvFileNotFound(env_file).into());
        }

        dotenvy::from_path(&env_file)?;
        debug!("Loaded settings file `{}`.", env_file.display());

        let settings = Settings::from_environment()?;
        let mut config = Self::from_settings(&settings)?;

        if let Some(dir) = prompts_dir {
            Arc::make_mut(&mut config.inner).prompts_dir = dir.to_path_buf();
        }

        Ok(config)
    }

    /// Validate and convert raw settings.
    pub fn from_settings(settings: &Settings) -> Res<Self> {
        let missing = settings.missing();

        if !missing.is_empty() {
            return Err(ConfigError::MissingSettings(missing).into());
        }

        let ai_provider = match settings.get("AI_PROVIDER") {
            Some(value) => value.parse::<LlmProvider>().map_err(|reason| ConfigError::InvalidSetting {
                name: "AI_PROVIDER",
                value: value.to_string(),
                reason,
            })?,
            None => LlmProvider::default(),
        };

        let inner = ConfigInner {
            ai_api_key: settings.required("AI_API_KEY")?,
            ai_provider,
            ai_model: settings.required("AI_MODEL")?,
            ai_temperature: settings.parse("AI_TEMPERATURE")?,
            ai_max_tokens: settings.parse("AI_MAX_TOKENS")?,
            ai_api_base: settings.get("AI_API_BASE").map(str::to_string),
            pivotal_token: settings.required("PIVOTAL_TOKEN")?,
            pivotal_project_id: settings.required("PIVOTAL_PROJECT_ID")?,
            pivotal_api_base: settings.get("PIVOTAL_API_BASE").unwrap_or(DEFAULT_PIVOTAL_API_BASE).trim_end_matches('/').to_string(),
            prompts_dir: PathBuf::from(settings.get("PROMPTS_DIR").unwrap_or(DEFAULT_PROMPTS_DIR)),
        };

        Ok(Config { inner: Arc::new(inner) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("AI_API_KEY", "sk-test"),
            ("AI_MODEL", "claude-3-5-sonnet-20240620"),
            ("AI_TEMPERATURE", "0.2"),
            ("AI_MAX_TOKENS", "1024"),
            ("PIVOTAL_TOKEN", "pt-test"),
            ("PIVOTAL_PROJECT_ID", "12345"),
        ]
    }

    #[test]
    fn test_from_settings_parses_all_fields() {
        let config = Config::from_settings(&Settings::from_pairs(complete_pairs())).unwrap();

        assert_eq!(config.ai_api_key, "sk-test");
        assert_eq!(config.ai_provider, LlmProvider::Anthropic);
        assert_eq!(config.ai_model, "claude-3-5-sonnet-20240620");
        assert!((config.ai_temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.ai_max_tokens, 1024);
        assert_eq!(config.pivotal_project_id, "12345");
        assert_eq!(config.pivotal_api_base, DEFAULT_PIVOTAL_API_BASE);
        assert_eq!(config.prompts_dir, PathBuf::from(DEFAULT_PROMPTS_DIR));
        assert!(config.ai_api_base.is_none());
    }

    #[test]
    fn test_missing_settings_are_all_reported() {
        let pairs = complete_pairs().into_iter().filter(|(k, _)| *k != "AI_MODEL" && *k != "PIVOTAL_TOKEN");

        let err = Config::from_settings(&Settings::from_pairs(pairs)).unwrap_err();

        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::MissingSettings(missing)) => assert_eq!(missing, &vec!["AI_MODEL".to_string(), "PIVOTAL_TOKEN".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let pairs = complete_pairs().into_iter().map(|(k, v)| if k == "AI_API_KEY" { (k, "") } else { (k, v) });

        let settings = Settings::from_pairs(pairs);

        assert_eq!(settings.missing(), vec!["AI_API_KEY".to_string()]);
    }

    #[test]
    fn test_whitespace_value_is_present() {
        let pairs = complete_pairs().into_iter().map(|(k, v)| if k == "PIVOTAL_TOKEN" { (k, " ") } else { (k, v) });

        let settings = Settings::from_pairs(pairs);

        assert!(settings.missing().is_empty());
        assert_eq!(settings.get("PIVOTAL_TOKEN"), Some(" "));
    }

    #[test]
    fn test_malformed_numeric_setting_propagates() {
        let pairs = complete_pairs().into_iter().map(|(k, v)| if k == "AI_MAX_TOKENS" { (k, "lots") } else { (k, v) });

        let err = Config::from_settings(&Settings::from_pairs(pairs)).unwrap_err();

        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidSetting { name: "AI_MAX_TOKENS", .. })));
    }

    #[test]
    fn test_parseable_numbers_are_not_range_checked() {
        let pairs = complete_pairs().into_iter().map(|(k, v)| match k {
            "AI_TEMPERATURE" => (k, "2.5"),
            "AI_MAX_TOKENS" => (k, "0"),
            _ => (k, v),
        });

        let config = Config::from_settings(&Settings::from_pairs(pairs)).unwrap();

        assert!((config.ai_temperature - 2.5).abs() < f32::EPSILON);
        assert_eq!(config.ai_max_tokens, 0);
    }

    #[test]
    fn test_optional_settings_override_defaults() {
        let mut pairs = complete_pairs();
        pairs.push(("AI_PROVIDER", "OpenAI"));
        pairs.push(("PIVOTAL_API_BASE", "http://localhost:9999/"));
        pairs.push(("PROMPTS_DIR", "/tmp/prompts"));

        let config = Config::from_settings(&Settings::from_pairs(pairs)).unwrap();

        assert_eq!(config.ai_provider, LlmProvider::OpenAi);
        assert_eq!(config.pivotal_api_base, "http://localhost:9999");
        assert_eq!(config.prompts_dir, PathBuf::from("/tmp/prompts"));
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let mut pairs = complete_pairs();
        pairs.push(("AI_PROVIDER", "llamacloud"));

        let err = Config::from_settings(&Settings::from_pairs(pairs)).unwrap_err();

        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::InvalidSetting { name: "AI_PROVIDER", .. })));
    }

    #[test]
    fn test_load_fails_without_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.env");

        let err = Config::load(Some(&missing), None).unwrap_err();

        assert!(matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::EnvFileNotFound(_))));
    }
}
