//! Async ports the engine depends on. Implementations live in the db and
//! search crates; tests use small in-memory stand-ins.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::cart::{Cart, SessionId};
use crate::domain::product::{Product, ProductId};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog backend failure: {0}")]
    Backend(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search backend failure: {0}")]
    Backend(String),
    #[error("search endpoint returned an unusable response: {0}")]
    BadResponse(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session store backend failure: {0}")]
    Backend(String),
}

/// Live product data. Reads happen at resolution time so stock and price are
/// current for every command; no caching layers sit in between.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// All products, ordered by ascending product id.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    async fn product_by_id(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;
}

/// The best semantic match for a free-text query, if the backend found one.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub product_id: ProductId,
    pub score: f32,
}

#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Top hit only; the engine applies its own acceptance threshold.
    async fn top_hit(&self, query: &str) -> Result<Option<SearchHit>, SearchError>;
}

/// Per-session cart persistence. A session with no stored cart reads back as
/// an empty cart; `put_cart` is only called when a command actually changed
/// the cart.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_cart(&self, session: &SessionId) -> Result<Cart, SessionStoreError>;

    async fn put_cart(&self, session: &SessionId, cart: &Cart) -> Result<(), SessionStoreError>;
}
