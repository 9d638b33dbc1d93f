// Library provider - metadata library lookup with browser-like headers
//
// The metadata library is abstracted behind `MetadataLibrary` so the
// provider's filtering and selection do not depend on how formats are fetched.
// The shipped implementation drives the yt-dlp tool.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::debug;

use crate::resolver::errors::{ProviderError, SourceError};
use crate::resolver::format_selector::select_best_audio;
use crate::resolver::models::{AudioFormat, RawStreamDescriptor};
use crate::resolver::traits::AudioProvider;
use crate::resolver::utils::{truncate_url, watch_url, ACCEPT_LANGUAGE, USER_AGENT, YOUTUBE_ORIGIN};

/// Headers sent with every library request
pub const BROWSER_HEADERS: [(&str, &str); 4] = [
    ("User-Agent", USER_AGENT),
    ("Accept-Language", ACCEPT_LANGUAGE),
    ("Origin", YOUTUBE_ORIGIN),
    ("Referer", YOUTUBE_ORIGIN),
];

/// Format entry as reported by the metadata library
#[derive(Debug, Clone, Default)]
pub struct MediaFormat {
    /// Format ID (e.g., "140", "251")
    pub format_id: String,
    /// File extension (webm, m4a)
    pub ext: String,
    pub url: Option<String>,
    /// Video codec (avc1, vp9, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// Audio bitrate in kbps
    pub abr: Option<f64>,
    /// Total bitrate in kbps
    pub tbr: Option<f64>,
}

impl MediaFormat {
    fn has_codec(codec: &Option<String>) -> bool {
        codec.as_ref().map_or(false, |c| c != "none" && !c.is_empty())
    }

    /// Audio track present, no video track
    pub fn is_audio_only(&self) -> bool {
        Self::has_codec(&self.acodec) && !Self::has_codec(&self.vcodec)
    }

    /// Mime type derived from extension and audio codec
    pub fn mime_type(&self) -> String {
        let base = match self.ext.as_str() {
            "m4a" | "mp4" => "audio/mp4",
            "mp3" => "audio/mpeg",
            "ogg" | "opus" => "audio/ogg",
            "" | "webm" => "audio/webm",
            other => return format!("audio/{}", other),
        };

        match self.acodec.as_deref() {
            Some(codec) if Self::has_codec(&self.acodec) => {
                format!("{}; codecs=\"{}\"", base, codec)
            }
            _ => base.to_string(),
        }
    }

    /// Bitrate in bits per second (audio bitrate preferred over total)
    pub fn bitrate(&self) -> u64 {
        self.abr
            .or(self.tbr)
            .filter(|kbps| *kbps > 0.0)
            .map(|kbps| (kbps * 1000.0).round() as u64)
            .unwrap_or(0)
    }

    fn to_descriptor(&self) -> RawStreamDescriptor {
        RawStreamDescriptor {
            url: self.url.clone(),
            mime_type: Some(self.mime_type()),
            bitrate: self.bitrate(),
            container: Some(self.ext.clone()).filter(|e| !e.is_empty()),
        }
    }
}

/// The library's own audio-only filter
pub fn filter_audio_only(formats: &[MediaFormat]) -> Vec<&MediaFormat> {
    formats.iter().filter(|f| f.is_audio_only()).collect()
}

/// Video-metadata library abstraction
#[async_trait]
pub trait MetadataLibrary: Send + Sync {
    /// Name of the library (for logging)
    fn name(&self) -> &'static str;

    /// Fetch every format the library knows for a watch page
    async fn fetch_formats(
        &self,
        watch_url: &str,
        headers: &[(&'static str, &'static str)],
    ) -> Result<Vec<MediaFormat>, SourceError>;
}

/// Provider backed by a video-metadata library
pub struct LibraryProvider {
    library: Box<dyn MetadataLibrary>,
    call_timeout: Duration,
}

impl LibraryProvider {
    pub const NAME: &'static str = "library";

    pub fn new(library: Box<dyn MetadataLibrary>, call_timeout: Duration) -> Self {
        Self {
            library,
            call_timeout,
        }
    }

    async fn resolve_inner(&self, video_id: &str) -> Result<AudioFormat, SourceError> {
        let url = watch_url(video_id);
        debug!(library = self.library.name(), url = %url, "fetching formats");

        let formats = timeout(
            self.call_timeout,
            self.library.fetch_formats(&url, &BROWSER_HEADERS),
        )
        .await
        .map_err(|_| SourceError::Timeout(self.call_timeout))??;

        let audio_formats = filter_audio_only(&formats);
        if audio_formats.is_empty() {
            return Err(SourceError::EmptyResult(
                "library reported no audio-only formats".to_string(),
            ));
        }

        let descriptors: Vec<RawStreamDescriptor> =
            audio_formats.iter().map(|f| f.to_descriptor()).collect();

        let format = select_best_audio(&descriptors).ok_or_else(|| {
            SourceError::EmptyResult("no audio-only format carried a stream URL".to_string())
        })?;

        debug!(
            url = %truncate_url(&format.url),
            mime_type = %format.mime_type,
            bitrate = format.bitrate,
            "library selected audio format"
        );

        Ok(format)
    }
}

#[async_trait]
impl AudioProvider for LibraryProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn resolve(&self, video_id: &str) -> Result<AudioFormat, ProviderError> {
        self.resolve_inner(video_id)
            .await
            .map_err(|e| ProviderError::new(Self::NAME, e))
    }
}
