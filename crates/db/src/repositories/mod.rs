use thiserror::Error;

use cartwright_core::ports::{CatalogError, SessionStoreError};

pub mod catalog;
pub mod memory;
pub mod session;

pub use catalog::SqlProductCatalog;
pub use memory::{InMemoryProductCatalog, InMemorySessionStore};
pub use session::SqlSessionStore;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl From<RepositoryError> for CatalogError {
    fn from(error: RepositoryError) -> Self {
        CatalogError::Backend(error.to_string())
    }
}

impl From<RepositoryError> for SessionStoreError {
    fn from(error: RepositoryError) -> Self {
        SessionStoreError::Backend(error.to_string())
    }
}
