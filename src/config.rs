use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Trait for types that can retrieve their configuration key from environment variables
pub trait KeyFromEnv {
    /// The environment variable name for this client's API key
    const KEY_NAME: &'static str;

    /// Find the API key by checking environment variables first, then .env file
    fn find_key() -> Option<String> {
        // First try to load .env file (silently fail if not found)
        let _ = dotenvy::dotenv();

        env::var(Self::KEY_NAME)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Like `find_key`, but a missing key is a configuration error.
    fn require_key() -> Result<String, ConfigError> {
        Self::find_key().ok_or(ConfigError::MissingKey(Self::KEY_NAME))
    }
}

/// Which generation backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Gemini,
    Claude,
    DeepSeek,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "claude" | "anthropic" => Ok(Self::Claude),
            "deepseek" => Ok(Self::DeepSeek),
            "mock" => Ok(Self::Mock),
            _ => Err(ConfigError::UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "Gemini"),
            ProviderKind::Claude => write!(f, "Claude"),
            ProviderKind::DeepSeek => write!(f, "DeepSeek"),
            ProviderKind::Mock => write!(f, "Mock"),
        }
    }
}

/// Process-level configuration, read once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub provider: ProviderKind,
    /// Model id override; each backend has its own default.
    pub model: Option<String>,
    /// Drain a streamed response instead of a single round trip.
    pub stream: bool,
    /// Where to write prompt/response transcripts, if anywhere.
    pub transcript_dir: Option<PathBuf>,
}

impl AppConfig {
    pub const PROVIDER_VAR: &'static str = "QUIZ_PROVIDER";
    pub const MODEL_VAR: &'static str = "QUIZ_MODEL";
    pub const STREAM_VAR: &'static str = "QUIZ_STREAM";
    pub const TRANSCRIPT_DIR_VAR: &'static str = "QUIZ_TRANSCRIPT_DIR";

    /// Read configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let provider = match non_blank(Self::PROVIDER_VAR) {
            Some(raw) => raw.parse()?,
            None => ProviderKind::default(),
        };

        Ok(Self {
            provider,
            model: non_blank(Self::MODEL_VAR).map(|m| m.trim().to_string()),
            stream: non_blank(Self::STREAM_VAR).map_or(false, |v| parse_flag(&v)),
            transcript_dir: non_blank(Self::TRANSCRIPT_DIR_VAR).map(PathBuf::from),
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_to_gemini_without_streaming() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.provider, ProviderKind::Gemini);
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup(&[
            ("QUIZ_PROVIDER", "Claude"),
            ("QUIZ_MODEL", " claude-3-5-haiku-latest "),
            ("QUIZ_STREAM", "yes"),
            ("QUIZ_TRANSCRIPT_DIR", "/tmp/quiz"),
        ]))
        .unwrap();
        assert_eq!(config.provider, ProviderKind::Claude);
        assert_eq!(config.model.as_deref(), Some("claude-3-5-haiku-latest"));
        assert!(config.stream);
        assert_eq!(config.transcript_dir, Some(PathBuf::from("/tmp/quiz")));
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let err = AppConfig::from_lookup(lookup(&[("QUIZ_PROVIDER", "bard")])).unwrap_err();
        assert_eq!(err, ConfigError::UnknownProvider("bard".to_string()));
    }

    #[test]
    fn provider_parsing_is_case_insensitive() {
        assert_eq!("GEMINI".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("deepseek".parse::<ProviderKind>().unwrap(), ProviderKind::DeepSeek);
        assert_eq!("Mock".parse::<ProviderKind>().unwrap(), ProviderKind::Mock);
    }
}
