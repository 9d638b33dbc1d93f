pub mod resolver;

pub use resolver::{
    AudioFormat, AudioProvider, AudioResolver, DataType, ProviderError, ResolutionError,
    ResolverConfig, SourceError,
};

/// Resolve a playable stream for `video_id` with the default configuration.
///
/// `data_type` must be "audio"; anything else fails with
/// [`ResolutionError::UnsupportedDataType`].
pub async fn extract_audio(video_id: &str, data_type: &str) -> Result<AudioFormat, ResolutionError> {
    AudioResolver::new(&ResolverConfig::default())?
        .resolve(video_id, data_type)
        .await
}
