//! Resolver error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Storage error: {0}")]
    Storage(#[from] links_storage::StorageError),
}
