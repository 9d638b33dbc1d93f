// Orchestrator with fallback logic

use tracing::{debug, info, warn};

use super::errors::{ProviderError, ResolutionError};
use super::models::{AudioFormat, ResolverConfig};
use super::providers::{FederatedProvider, LibraryProvider, PublicApiProvider, YtDlpLibrary};
use super::traits::{AudioProvider, DataType};
use super::utils::{build_http_client, truncate_url};

/// Resolves audio by trying providers in fixed priority order:
/// library, public API, federated mirrors.
pub struct AudioResolver {
    providers: Vec<Box<dyn AudioProvider>>,
}

impl AudioResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolutionError> {
        let proxy = config.proxy.as_deref();
        let api_client =
            build_http_client(proxy, config.public_api_timeout).map_err(ResolutionError::Setup)?;
        let mirror_client =
            build_http_client(proxy, config.mirror_timeout).map_err(ResolutionError::Setup)?;

        let library = YtDlpLibrary::new(
            config.ytdlp_path.clone(),
            config.proxy.clone(),
            config.library_timeout,
        );

        let providers: Vec<Box<dyn AudioProvider>> = vec![
            Box::new(LibraryProvider::new(Box::new(library), config.library_timeout)),
            Box::new(PublicApiProvider::new(
                api_client,
                config.public_api_base.clone(),
                config.public_api_timeout,
            )),
            Box::new(FederatedProvider::new(
                mirror_client,
                config.mirrors.clone(),
                config.mirror_timeout,
            )),
        ];

        Ok(Self { providers })
    }

    #[cfg(test)]
    pub(crate) fn with_providers(providers: Vec<Box<dyn AudioProvider>>) -> Self {
        Self { providers }
    }

    /// Provider names in the order they are tried
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Resolve a stream for `video_id`; only the "audio" data type is supported
    pub async fn resolve(
        &self,
        video_id: &str,
        data_type: &str,
    ) -> Result<AudioFormat, ResolutionError> {
        match data_type.parse::<DataType>()? {
            DataType::Audio => self.resolve_audio(video_id).await,
        }
    }

    pub async fn resolve_audio(&self, video_id: &str) -> Result<AudioFormat, ResolutionError> {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            return Err(ResolutionError::EmptyIdentifier);
        }

        let mut last_error: Option<ProviderError> = None;

        for provider in &self.providers {
            debug!(provider = provider.name(), video_id, "trying provider");

            match provider.resolve(video_id).await {
                Ok(format) => {
                    info!(
                        provider = provider.name(),
                        video_id,
                        bitrate = format.bitrate,
                        url = %truncate_url(&format.url),
                        "resolved audio"
                    );
                    if let Some(discarded) = last_error {
                        debug!(error = %discarded, "discarding earlier provider failure");
                    }
                    return Ok(format);
                }
                Err(e) => {
                    warn!(provider = provider.name(), video_id, error = %e, "provider failed");
                    last_error = Some(e);
                }
            }
        }

        warn!(video_id, "all providers failed");

        Err(match last_error {
            Some(e) => ResolutionError::Exhausted(e),
            None => ResolutionError::NoProviders,
        })
    }
}
