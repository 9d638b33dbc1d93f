// Provider trait and request types

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use super::errors::{ProviderError, ResolutionError};
use super::models::AudioFormat;

/// What the caller wants resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataType {
    #[default]
    Audio,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
        }
    }
}

impl FromStr for DataType {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            _ => Err(ResolutionError::UnsupportedDataType(s.to_string())),
        }
    }
}

/// A source that can turn a video identifier into an audio stream
#[async_trait]
pub trait AudioProvider: Send + Sync {
    /// Name of the provider (for logging and error tags)
    fn name(&self) -> &'static str;

    /// Resolve the best audio stream for a video
    async fn resolve(&self, video_id: &str) -> Result<AudioFormat, ProviderError>;
}
