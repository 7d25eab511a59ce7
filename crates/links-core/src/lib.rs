//! Links Core
//!
//! Central coordination layer: owns the database, the resolver and the
//! usage log, and is what the HTTP and CLI surfaces talk to.

mod config;
mod devices;
mod error;
mod html;
mod links;
mod opensearch;

pub use config::Config;
pub use devices::{is_valid_token, Device, DeviceRegistry};
pub use error::CoreError;
pub use html::escape_html;
pub use links::Links;
pub use opensearch::opensearch_description;

// Re-export core components
pub use links_resolver::{
    AliasCount, AliasRecord, ArgEncoding, Expansion, ItemsResult, NewAlias,
    OpenSearchSuggestions, Redirect, Resolution, ResolutionState, ResolverError, UsageEntry,
};
pub use links_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
