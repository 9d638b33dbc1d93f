// Audio providers, in resolution priority order

pub mod library;
pub mod public_api;
pub mod federated;
pub mod ytdlp;

pub use library::{LibraryProvider, MediaFormat, MetadataLibrary};
pub use public_api::PublicApiProvider;
pub use federated::FederatedProvider;
pub use ytdlp::YtDlpLibrary;
