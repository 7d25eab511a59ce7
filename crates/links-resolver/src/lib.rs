//! Links Query Resolution
//!
//! A query is `<alias> [args...]`, split on single spaces:
//! 1. One token, aliases start with it → candidate list
//! 2. One token, nothing matches → offer to create the alias
//! 3. Several tokens, alias matches exactly → substitute args into its template
//! 4. Several tokens, no alias → hand the remaining tokens to a web search engine

mod error;
mod repository;
mod resolver;
mod suggest;
mod template;
mod usage;

pub use error::ResolverError;
pub use repository::{AliasRecord, AliasRepository, AliasStore, NewAlias, PREFIX_LIMIT};
pub use resolver::{
    ItemsResult, QueryResolver, Redirect, Resolution, ResolutionState, ResolverSettings,
};
pub use suggest::{format_suggestions, OpenSearchSuggestions};
pub use template::{expand, placeholder_count, ArgEncoding, Expansion, PLACEHOLDER};
pub use usage::{AliasCount, UsageEntry, UsageLog, UsageSink};

pub type Result<T> = std::result::Result<T, ResolverError>;
