//! Error types for scriptcast

use thiserror::Error;

/// Result type alias for scriptcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rendering transcripts
#[derive(Debug, Error)]
pub enum Error {
    /// Required external toolchain (ffmpeg) is absent
    #[error("missing dependency: {0}")]
    MissingDependency(String),

    /// Persisted cache index is unreadable or corrupt
    #[error("cache load error: {0}")]
    CacheLoad(String),

    /// Failure reading or writing an audio artifact or the cache index
    #[error("artifact error: {0}")]
    Artifact(String),

    /// Remote speech synthesis call failed
    #[error("synthesis error: {0}")]
    Synthesis(String),

    /// Transcript file failed to parse as valid structured data
    #[error("transcript error: {0}")]
    Transcript(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
