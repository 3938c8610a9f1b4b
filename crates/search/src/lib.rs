//! Semantic search backend for candidate names nothing else matched.
//!
//! The engine consults this port last, after cart-first and catalog
//! resolution both come up empty. Backends are swappable behind the
//! [`SemanticSearch`] port; this crate ships the HTTP client used against a
//! real search service and a no-op used when no endpoint is configured.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use cartwright_core::config::SearchConfig;
use cartwright_core::domain::product::ProductId;
use cartwright_core::ports::{SearchError, SearchHit, SemanticSearch};

/// Client for a JSON search service.
///
/// Sends `POST {endpoint}/search` with `{"query": ..., "limit": 1}` and
/// expects `{"hits": [{"product_id": ..., "score": ...}]}` ordered by
/// descending score. Only the first hit is kept; the engine applies its own
/// acceptance threshold on the score.
pub struct HttpSemanticSearch {
    client: Client,
    endpoint: String,
    api_key: Option<SecretString>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<ResponseHit>,
}

#[derive(Debug, Deserialize)]
struct ResponseHit {
    product_id: String,
    score: f32,
}

impl HttpSemanticSearch {
    pub fn new(endpoint: String, api_key: Option<SecretString>, timeout: Duration) -> Self {
        Self { client: Client::new(), endpoint, api_key, timeout }
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl SemanticSearch for HttpSemanticSearch {
    async fn top_hit(&self, query: &str) -> Result<Option<SearchHit>, SearchError> {
        let mut request = self
            .client
            .post(self.search_url())
            .timeout(self.timeout)
            .json(&SearchRequest { query, limit: 1 });
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let response = request.send().await.map_err(|error| {
            warn!(error = %error, "semantic search request failed");
            SearchError::Backend(error.to_string())
        })?;

        if !response.status().is_success() {
            return Err(SearchError::Backend(format!(
                "search endpoint returned {}",
                response.status()
            )));
        }

        let payload: SearchResponse = response.json().await.map_err(|error| {
            SearchError::BadResponse(format!("failed to decode search response: {error}"))
        })?;

        let hit = payload.hits.into_iter().next();
        if let Some(hit) = &hit {
            debug!(product_id = %hit.product_id, score = hit.score, "semantic search hit");
        }
        Ok(hit.map(|hit| SearchHit { product_id: ProductId(hit.product_id), score: hit.score }))
    }
}

/// Search disabled. Unresolved candidate names stay unresolved.
pub struct NoopSemanticSearch;

#[async_trait::async_trait]
impl SemanticSearch for NoopSemanticSearch {
    async fn top_hit(&self, _query: &str) -> Result<Option<SearchHit>, SearchError> {
        Ok(None)
    }
}

/// Builds the backend the configuration asks for. No endpoint means the
/// fallback stage is a no-op rather than an error.
pub fn from_config(config: &SearchConfig) -> Arc<dyn SemanticSearch> {
    match &config.endpoint {
        Some(endpoint) => Arc::new(HttpSemanticSearch::new(
            endpoint.clone(),
            config.api_key.clone(),
            Duration::from_millis(config.timeout_ms),
        )),
        None => Arc::new(NoopSemanticSearch),
    }
}
