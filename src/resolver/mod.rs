// Resolver module - audio stream resolution with provider fallback

pub mod errors;
pub mod models;
pub mod traits;
pub mod format_selector;
pub mod mirrors;
pub mod providers;
pub mod orchestrator;
pub mod utils;

pub use errors::{ProviderError, ResolutionError, SourceError};
pub use models::{AudioFormat, RawStreamDescriptor, ResolverConfig};
pub use traits::{AudioProvider, DataType};
pub use format_selector::select_best_audio;
pub use mirrors::try_mirrors;
pub use orchestrator::AudioResolver;
