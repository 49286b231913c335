use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_DICTIONARY_PATH: &str = "words.json";
const DEFAULT_TTS_LANGUAGE: &str = "en-US";
const DEFAULT_TTS_VOICE: &str = "en-US-Standard-C";
const DEFAULT_TTS_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be true or false, got {value:?}")]
    InvalidFlag { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dictionary_path: PathBuf,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// Google Cloud key; without it the keyless translate endpoint is used.
    pub api_key: Option<String>,
    pub language: String,
    pub voice: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let enabled = match var("TTS_ENABLED") {
            Some(value) => parse_flag("TTS_ENABLED", &value)?,
            None => true,
        };
        let timeout_secs = match var("TTS_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidNumber {
                    name: "TTS_TIMEOUT_SECS",
                    value,
                })?,
            None => DEFAULT_TTS_TIMEOUT_SECS,
        };

        Ok(Self {
            dictionary_path: var("DICTIONARY_PATH")
                .unwrap_or_else(|| DEFAULT_DICTIONARY_PATH.to_string())
                .into(),
            speech: SpeechConfig {
                enabled,
                api_key: var("GOOGLE_CLOUD_API_KEY"),
                language: var("TTS_LANGUAGE").unwrap_or_else(|| DEFAULT_TTS_LANGUAGE.to_string()),
                voice: var("TTS_VOICE").unwrap_or_else(|| DEFAULT_TTS_VOICE.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
