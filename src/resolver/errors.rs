// Error types for audio sources and the resolver

use std::time::Duration;

use thiserror::Error;

/// Failure of a single source attempt (one provider call or one mirror call)
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Source did not answer within its timeout
    #[error("Network timeout after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Connection, TLS or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Source answered with a non-success HTTP status
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// Source refused the request (403, 429, bot detection)
    #[error("Blocked by upstream: {0}")]
    Blocked(String),

    /// Metadata tool is not installed
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Payload was reached but has the wrong shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Source answered but offered no usable audio stream
    #[error("No audio stream: {0}")]
    EmptyResult(String),

    /// Every mirror was tried and none produced an error worth reporting
    #[error("All {0} mirrors failed")]
    MirrorsExhausted(usize),
}

impl SourceError {
    /// Whether the source could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::Transport(_)
                | Self::Status { .. }
                | Self::Blocked(_)
                | Self::ToolNotFound(_)
        )
    }

    /// Whether the source was reached but had nothing to offer
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::EmptyResult(_))
    }
}

impl SourceError {
    /// Failure to launch a tool; only a missing binary counts as `ToolNotFound`
    pub fn spawn_failure(program: &str, e: &std::io::Error) -> Self {
        let message = format!("Failed to start {}: {}", program, e);
        if e.kind() == std::io::ErrorKind::NotFound {
            Self::ToolNotFound(message)
        } else {
            Self::Transport(message)
        }
    }
}

// Classify raw tool stderr
impl From<String> for SourceError {
    fn from(s: String) -> Self {
        let lower = s.to_lowercase();

        if lower.contains("timeout") || lower.contains("timed out") {
            return Self::Transport(s);
        }

        if lower.contains("http error 403")
            || lower.contains("http error 429")
            || lower.contains("too many requests")
            || lower.contains("not a bot")
            || lower.contains("blocked")
        {
            return Self::Blocked(s);
        }

        if lower.contains("command not found") {
            return Self::ToolNotFound(s);
        }

        if lower.contains("parse") || lower.contains("json") {
            return Self::InvalidResponse(s);
        }

        Self::Transport(s)
    }
}

// Timeouts carry the request deadline and are mapped in `utils::get_json`
impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return Self::InvalidResponse(e.to_string());
        }

        Self::Transport(e.to_string())
    }
}

/// A source failure tagged with the provider that hit it
#[derive(Debug, Clone, Error)]
#[error("{provider} failed: {source}")]
pub struct ProviderError {
    pub provider: &'static str,
    #[source]
    pub source: SourceError,
}

impl ProviderError {
    pub fn new(provider: &'static str, source: SourceError) -> Self {
        Self { provider, source }
    }
}

/// Terminal outcome of a resolution that produced no audio
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// Every provider failed; carries the last one attempted
    #[error("Could not retrieve audio: {0}")]
    Exhausted(#[source] ProviderError),

    #[error("Could not retrieve audio: no providers available")]
    NoProviders,

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Video identifier is empty")]
    EmptyIdentifier,

    /// HTTP client or tool setup failed before any provider ran
    #[error("Resolver setup failed: {0}")]
    Setup(#[source] SourceError),
}

impl ResolutionError {
    /// The provider failure behind an exhausted resolution
    pub fn last_error(&self) -> Option<&ProviderError> {
        match self {
            Self::Exhausted(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_output_classification() {
        assert!(matches!(
            SourceError::from("ERROR: HTTP Error 403: Forbidden".to_string()),
            SourceError::Blocked(_)
        ));
        assert!(matches!(
            SourceError::from("ERROR: HTTP Error 429: Too Many Requests".to_string()),
            SourceError::Blocked(_)
        ));
        assert!(matches!(
            SourceError::from("Sign in to confirm you're not a bot".to_string()),
            SourceError::Blocked(_)
        ));
        assert!(matches!(
            SourceError::from("sh: 1: yt-dlp: command not found".to_string()),
            SourceError::ToolNotFound(_)
        ));
        assert!(matches!(
            SourceError::from("Invalid JSON: expected value".to_string()),
            SourceError::InvalidResponse(_)
        ));
        assert!(matches!(
            SourceError::from("Timed out after 30s".to_string()),
            SourceError::Transport(_)
        ));
    }

    #[test]
    fn test_status_digits_in_video_id_are_not_blocking() {
        let err = SourceError::from("ERROR: [youtube] ab403cdEFgh: Video unavailable".to_string());
        assert!(matches!(err, SourceError::Transport(_)));

        let err = SourceError::from("ERROR: [youtube] x429robotsXY: Private video".to_string());
        assert!(matches!(err, SourceError::Transport(_)));
    }

    #[test]
    fn test_http_not_found_is_not_missing_tool() {
        let err = SourceError::from("ERROR: unable to download webpage: HTTP Error 404: Not Found".to_string());
        assert!(matches!(err, SourceError::Transport(_)));
    }

    #[test]
    fn test_spawn_failure_classification() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory");
        assert!(matches!(
            SourceError::spawn_failure("yt-dlp", &missing),
            SourceError::ToolNotFound(_)
        ));

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        assert!(matches!(
            SourceError::spawn_failure("yt-dlp", &denied),
            SourceError::Transport(_)
        ));
    }

    #[test]
    fn test_empty_result_is_not_transport() {
        let empty = SourceError::EmptyResult("no audioStreams".to_string());
        assert!(empty.is_empty_result());
        assert!(!empty.is_transport());
        assert!(SourceError::Timeout(Duration::from_secs(5)).is_transport());
    }

    #[test]
    fn test_aggregate_message_names_provider() {
        let err = ResolutionError::Exhausted(ProviderError::new(
            "federated",
            SourceError::MirrorsExhausted(4),
        ));
        let msg = err.to_string();
        assert!(msg.contains("federated"));
        assert!(msg.contains("All 4 mirrors failed"));
        assert_eq!(err.last_error().map(|e| e.provider), Some("federated"));
    }
}
