// Common data models for the resolver

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Mime type used when a source does not report one
pub const DEFAULT_MIME_TYPE: &str = "audio/webm";

/// Container used when a source does not report one
pub const DEFAULT_CONTAINER: &str = "webm";

/// Default public streaming-metadata endpoint
pub const DEFAULT_PUBLIC_API_BASE: &str = "https://pipedapi.kavin.rocks";

/// Default federated mirror instances, in the order they are tried
pub const DEFAULT_MIRRORS: [&str; 4] = [
    "https://invidious.snopyta.org",
    "https://invidious.kavin.rocks",
    "https://vid.puffyan.us",
    "https://invidious.namazso.eu",
];

/// Normalized description of a resolved audio stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    pub url: String,
    pub mime_type: String,
    pub bitrate: u64,
    pub container: String,
}

/// One stream entry as reported by a source, after per-source normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawStreamDescriptor {
    pub url: Option<String>,
    /// Mime type or type indicator (e.g. `audio/webm; codecs="opus"`)
    pub mime_type: Option<String>,
    /// Bits per second; 0 when the source omits it
    pub bitrate: u64,
    pub container: Option<String>,
}

impl RawStreamDescriptor {
    /// Whether the type indicator signals audio
    pub fn is_audio(&self) -> bool {
        self.mime_type
            .as_ref()
            .map_or(false, |m| m.to_lowercase().contains("audio"))
    }

    /// Non-empty stream URL, if any
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Convert into the output contract, filling defaults for missing fields.
    /// Returns `None` when there is no URL to hand out.
    pub fn into_audio_format(self) -> Option<AudioFormat> {
        let url = self.usable_url()?.to_string();

        Some(AudioFormat {
            url,
            mime_type: self
                .mime_type
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            bitrate: self.bitrate,
            container: self
                .container
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
        })
    }
}

/// Network and source configuration for the resolver
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// SOCKS5/HTTP proxy URL (e.g. "socks5h://127.0.0.1:1080")
    pub proxy: Option<String>,
    /// Upper bound for the metadata library call
    pub library_timeout: Duration,
    /// Upper bound for the public API request
    pub public_api_timeout: Duration,
    /// Upper bound for each individual mirror request
    pub mirror_timeout: Duration,
    /// Base URL of the public streaming-metadata API
    pub public_api_base: String,
    /// Federated mirror base URLs, tried in order
    pub mirrors: Vec<String>,
    /// Explicit path to the yt-dlp binary
    pub ytdlp_path: Option<String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            library_timeout: Duration::from_secs(30),
            public_api_timeout: Duration::from_secs(10),
            mirror_timeout: Duration::from_secs(5),
            public_api_base: DEFAULT_PUBLIC_API_BASE.to_string(),
            mirrors: DEFAULT_MIRRORS.iter().map(|m| m.to_string()).collect(),
            ytdlp_path: None,
        }
    }
}

impl ResolverConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_library_timeout(mut self, timeout: Duration) -> Self {
        self.library_timeout = timeout;
        self
    }

    pub fn with_public_api_timeout(mut self, timeout: Duration) -> Self {
        self.public_api_timeout = timeout;
        self
    }

    pub fn with_mirror_timeout(mut self, timeout: Duration) -> Self {
        self.mirror_timeout = timeout;
        self
    }

    pub fn with_public_api_base(mut self, base: impl Into<String>) -> Self {
        self.public_api_base = base.into();
        self
    }

    pub fn with_mirrors(mut self, mirrors: Vec<String>) -> Self {
        self.mirrors = mirrors;
        self
    }

    pub fn with_ytdlp_path(mut self, path: Option<String>) -> Self {
        self.ytdlp_path = path;
        self
    }
}
