use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    Config(String),
    Http(reqwest::Error),
    Backend(String),
    Geocoding(String),
    Narrative(String),
    Worker(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(msg) => write!(f, "configuration error: {msg}"),
            EngineError::Http(e) => write!(f, "HTTP error: {e}"),
            EngineError::Backend(msg) => write!(f, "backend unavailable: {msg}"),
            EngineError::Geocoding(msg) => write!(f, "geocoding failed: {msg}"),
            EngineError::Narrative(msg) => write!(f, "narrative generation failed: {msg}"),
            EngineError::Worker(msg) => write!(f, "worker failed: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::Http(e)
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(e: toml::de::Error) -> Self {
        EngineError::Config(e.to_string())
    }
}

impl From<tokio::task::JoinError> for EngineError {
    fn from(e: tokio::task::JoinError) -> Self {
        EngineError::Worker(e.to_string())
    }
}

impl From<tokio::sync::AcquireError> for EngineError {
    fn from(e: tokio::sync::AcquireError) -> Self {
        EngineError::Worker(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
