use thiserror::Error;

#[derive(Error, Debug)]
pub enum FarsisubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API key is missing. Set GEMINI_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Input is empty: {0}")]
    EmptyInput(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Backend returned an empty response")]
    EmptyResponse,

    #[error("Backend blocked the request: {0}")]
    Blocked(String),

    #[error("Response indices do not match the request (missing: {missing:?}, unexpected: {unexpected:?})")]
    IndexMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, FarsisubError>;
