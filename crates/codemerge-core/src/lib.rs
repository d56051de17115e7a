pub mod config;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod provider;
pub mod store;

pub use config::Settings;
pub use error::ProviderError;
pub use metadata::{ComponentSkeletonModel, ProjectSyncMetadataModel};
pub use provider::{CachedProvider, ProjectSyncDataProvider, StaticProvider};
pub use store::MetadataStore;
