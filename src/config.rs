use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{FarsisubError, Result};

/// Environment variable consulted when no API key is given on the command line
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "farsisub.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub translate: TranslateConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory scanned for `.srt` files
    pub input_dir: PathBuf,
    /// Directory receiving translated files under the same name
    pub output_dir: PathBuf,
    /// Free-form instructions interpolated into every prompt
    pub instructions_file: PathBuf,
    /// Term mappings and known transcription fixes
    pub glossary_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateConfig {
    /// Base URL of the generation API
    pub endpoint: String,
    /// Model used for translation
    pub model: String,
    /// Language named in the translation directive
    pub target_language: String,
    /// Number of subtitle blocks sent per request
    pub chunk_size: usize,
    /// Pause between backend calls (milliseconds)
    pub chunk_delay_ms: u64,
    /// Extra attempts for a failed chunk
    pub max_retries: u32,
    /// Backoff unit between retries, multiplied by the attempt number (milliseconds)
    pub retry_backoff_ms: u64,
    /// HTTP timeout per request (seconds)
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Prefix output files with a UTF-8 byte-order mark
    pub write_bom: bool,
    /// How to treat responses whose echoed indices differ from the request
    pub index_check: IndexCheck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexCheck {
    /// Log mismatches and keep whatever could be matched
    Warn,
    /// Fail the attempt so the chunk is retried or skipped
    Reject,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            instructions_file: PathBuf::from("instructions.md"),
            glossary_file: PathBuf::from("glossary.json"),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-pro".to_string(),
            target_language: "Persian (Farsi)".to_string(),
            chunk_size: 30,
            chunk_delay_ms: 1000,
            max_retries: 0,
            retry_backoff_ms: 2000,
            timeout_secs: 300,
            temperature: 0.2,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 8192,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_bom: true,
            index_check: IndexCheck::Warn,
        }
    }
}

/// Values given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub chunk_size: Option<usize>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FarsisubError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FarsisubError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| FarsisubError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load `path` if given, else `farsisub.toml` from the working directory, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(model) = overrides.model {
            self.translate.model = model;
        }
        if let Some(dir) = overrides.input_dir {
            self.paths.input_dir = dir;
        }
        if let Some(dir) = overrides.output_dir {
            self.paths.output_dir = dir;
        }
        if let Some(size) = overrides.chunk_size {
            self.translate.chunk_size = size;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.translate.chunk_size == 0 {
            return Err(FarsisubError::Config("chunk_size must be at least 1".to_string()));
        }
        if self.translate.model.trim().is_empty() {
            return Err(FarsisubError::Config("model name must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Pick the API key from the command line first, then from the environment
pub fn resolve_api_key(cli_value: Option<&str>) -> Result<String> {
    let from_env = std::env::var(API_KEY_ENV).ok();
    pick_api_key(cli_value, from_env.as_deref())
}

fn pick_api_key(cli_value: Option<&str>, env_value: Option<&str>) -> Result<String> {
    cli_value
        .or(env_value)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or(FarsisubError::MissingApiKey)
}
