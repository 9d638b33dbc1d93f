// Public-API provider - single request to a fixed streaming-metadata endpoint
//
// The endpoint only lists audio streams, so no audio re-filtering is done;
// the list is ranked by bitrate directly.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::resolver::errors::{ProviderError, SourceError};
use crate::resolver::models::{AudioFormat, RawStreamDescriptor};
use crate::resolver::traits::AudioProvider;
use crate::resolver::utils::{descriptors_from_json, get_json, truncate_url};

pub struct PublicApiProvider {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl PublicApiProvider {
    pub const NAME: &'static str = "public-api";

    pub fn new(client: reqwest::Client, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn streams_url(&self, video_id: &str) -> String {
        format!("{}/streams/{}", self.base_url, video_id)
    }

    async fn resolve_inner(&self, video_id: &str) -> Result<AudioFormat, SourceError> {
        let url = self.streams_url(video_id);
        debug!(url = %url, "requesting audio streams");

        let body = get_json(&self.client, &url, self.timeout).await?;

        let streams = &body["audioStreams"];
        if !streams.is_array() {
            return Err(SourceError::InvalidResponse(
                "response has no audioStreams list".to_string(),
            ));
        }

        let mut descriptors: Vec<RawStreamDescriptor> = descriptors_from_json(streams, "mimeType")
            .into_iter()
            .filter(|d| d.usable_url().is_some())
            .collect();

        // Stable sort: equal bitrates keep response order
        descriptors.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

        let best = descriptors
            .into_iter()
            .next()
            .and_then(RawStreamDescriptor::into_audio_format)
            .ok_or_else(|| SourceError::EmptyResult("audioStreams has no playable entry".to_string()))?;

        debug!(
            url = %truncate_url(&best.url),
            mime_type = %best.mime_type,
            bitrate = best.bitrate,
            "public API selected audio stream"
        );

        Ok(best)
    }
}

#[async_trait]
impl AudioProvider for PublicApiProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn resolve(&self, video_id: &str) -> Result<AudioFormat, ProviderError> {
        self.resolve_inner(video_id)
            .await
            .map_err(|e| ProviderError::new(Self::NAME, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::resolver::utils::build_http_client;

    async fn provider_for(server: &MockServer, timeout: Duration) -> PublicApiProvider {
        let client = build_http_client(None, timeout).unwrap();
        PublicApiProvider::new(client, server.uri(), timeout)
    }

    #[tokio::test]
    async fn test_picks_highest_bitrate_stream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/streams/abc"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "song",
                "audioStreams": [
                    {"url": "https://cdn/low", "mimeType": "audio/mp4", "bitrate": 48000},
                    {"url": "https://cdn/high", "bitrate": 160000},
                    {"url": "https://cdn/tie", "mimeType": "audio/webm", "bitrate": 160000},
                    {"url": "https://cdn/none", "mimeType": "audio/webm"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(10)).await;
        let format = provider.resolve("abc").await.unwrap();

        assert_eq!(format.url, "https://cdn/high");
        assert_eq!(format.mime_type, "audio/webm");
        assert_eq!(format.container, "webm");
        assert_eq!(format.bitrate, 160000);
    }

    #[tokio::test]
    async fn test_empty_stream_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/streams/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"audioStreams": []})))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(10)).await;
        let err = provider.resolve("abc").await.unwrap_err();

        assert_eq!(err.provider, "public-api");
        assert!(err.source.is_empty_result());
    }

    #[tokio::test]
    async fn test_missing_stream_list() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/streams/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Video unavailable"})))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(10)).await;
        let err = provider.resolve("abc").await.unwrap_err();

        assert!(matches!(err.source, SourceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_secs(10)).await;
        let err = provider.resolve("abc").await.unwrap_err();

        assert!(matches!(err.source, SourceError::Status { status: 500, .. }));
        assert!(err.source.is_transport());
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"audioStreams": []}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server, Duration::from_millis(200)).await;
        let err = provider.resolve("abc").await.unwrap_err();

        assert!(matches!(err.source, SourceError::Timeout(_)));
    }
}
