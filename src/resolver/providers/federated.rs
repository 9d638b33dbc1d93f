// Federated provider - Invidious-style mirror instances
//
// Each mirror exposes `/api/v1/videos/{id}`; only the adaptive formats are
// requested. The service does not report containers reliably, so the
// winning entry's container is always normalized.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::resolver::errors::{ProviderError, SourceError};
use crate::resolver::mirrors::try_mirrors;
use crate::resolver::models::{AudioFormat, RawStreamDescriptor, DEFAULT_CONTAINER};
use crate::resolver::traits::AudioProvider;
use crate::resolver::utils::{descriptors_from_json, get_json, truncate_url};

pub struct FederatedProvider {
    client: reqwest::Client,
    mirrors: Vec<String>,
    mirror_timeout: Duration,
}

impl FederatedProvider {
    pub const NAME: &'static str = "federated";

    pub fn new(client: reqwest::Client, mirrors: Vec<String>, mirror_timeout: Duration) -> Self {
        Self {
            client,
            mirrors: mirrors
                .into_iter()
                .map(|m| m.trim_end_matches('/').to_string())
                .collect(),
            mirror_timeout,
        }
    }

    fn video_url(mirror: &str, video_id: &str) -> String {
        format!("{}/api/v1/videos/{}?fields=adaptiveFormats", mirror, video_id)
    }

    /// Adaptive formats whose type starts with an audio signal
    fn audio_descriptors(body: &Value) -> Vec<RawStreamDescriptor> {
        descriptors_from_json(&body["adaptiveFormats"], "type")
            .into_iter()
            .filter(|d| d.mime_type.as_deref().map_or(false, |t| t.starts_with("audio")))
            .collect()
    }

    async fn resolve_inner(&self, video_id: &str) -> Result<AudioFormat, SourceError> {
        let client = &self.client;
        let per_call = self.mirror_timeout;

        let mut format = try_mirrors(&self.mirrors, per_call, |mirror| {
            let url = Self::video_url(mirror, video_id);
            async move {
                let body = get_json(client, &url, per_call).await?;
                Ok::<_, SourceError>(Self::audio_descriptors(&body))
            }
        })
        .await?;

        format.container = DEFAULT_CONTAINER.to_string();

        debug!(
            url = %truncate_url(&format.url),
            mime_type = %format.mime_type,
            bitrate = format.bitrate,
            "federated mirror selected audio format"
        );

        Ok(format)
    }
}

#[async_trait]
impl AudioProvider for FederatedProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn resolve(&self, video_id: &str) -> Result<AudioFormat, ProviderError> {
        self.resolve_inner(video_id)
            .await
            .map_err(|e| ProviderError::new(Self::NAME, e))
    }
}
