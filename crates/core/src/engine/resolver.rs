use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::cart::{Cart, CartEntry};
use crate::domain::product::{Product, ProductId};
use crate::parser::CandidateItem;
use crate::ports::SemanticSearch;

/// Live product data captured when a candidate was resolved. Stock and price
/// come from the catalog row; a cart entry whose product has left the
/// catalog resolves with stock 0 so adds fail but removals still work.
#[derive(Clone, Debug, PartialEq)]
pub struct ProductSnapshot {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: u32,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
        }
    }
}

/// Per-candidate outcome. A miss is data, not an error; one unresolvable
/// candidate never aborts the rest of the batch.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Resolved { product: ProductSnapshot, quantity: u32 },
    NotFound { name: String },
}

pub(crate) struct ResolverContext<'a> {
    /// Catalog rows sorted by ascending product id.
    pub products: &'a [Product],
    pub cart: &'a Cart,
    pub search: &'a dyn SemanticSearch,
    pub similarity_threshold: f32,
    pub search_timeout: Duration,
}

pub(crate) async fn resolve_candidates(
    candidates: &[CandidateItem],
    ctx: &ResolverContext<'_>,
) -> Vec<Resolution> {
    let mut resolutions = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        resolutions.push(resolve_one(candidate, ctx).await);
    }
    resolutions
}

/// Cart entries first (exact name, then containment), then catalog substring
/// match in id order, then the semantic fallback gated by the acceptance
/// threshold.
async fn resolve_one(candidate: &CandidateItem, ctx: &ResolverContext<'_>) -> Resolution {
    let query = candidate.name.to_lowercase();

    if let Some(entry) = cart_match(&query, ctx.cart) {
        let product = ctx
            .products
            .iter()
            .find(|product| product.id == entry.product_id)
            .map(ProductSnapshot::from)
            .unwrap_or_else(|| ProductSnapshot {
                id: entry.product_id.clone(),
                name: entry.product_name.clone(),
                price: entry.unit_price,
                stock: 0,
            });
        debug!(query, product_id = %product.id.0, "resolved candidate from cart");
        return Resolution::Resolved { product, quantity: candidate.quantity };
    }

    if let Some(product) = catalog_match(&query, ctx.products) {
        debug!(query, product_id = %product.id.0, "resolved candidate from catalog");
        return Resolution::Resolved { product: product.into(), quantity: candidate.quantity };
    }

    if let Some(product) = search_match(&query, ctx).await {
        debug!(query, product_id = %product.id.0, "resolved candidate from semantic search");
        return Resolution::Resolved { product, quantity: candidate.quantity };
    }

    Resolution::NotFound { name: candidate.name.clone() }
}

fn cart_match<'a>(query: &str, cart: &'a Cart) -> Option<&'a CartEntry> {
    if let Some(entry) =
        cart.entries.iter().find(|entry| entry.product_name.to_lowercase() == query)
    {
        return Some(entry);
    }

    cart.entries.iter().find(|entry| {
        let name = entry.product_name.to_lowercase();
        name.contains(query) || query.contains(&name)
    })
}

fn catalog_match<'a>(query: &str, products: &'a [Product]) -> Option<&'a Product> {
    products.iter().find(|product| {
        let name = product.name.to_lowercase();
        name.contains(query) || query.contains(&name)
    })
}

async fn search_match(query: &str, ctx: &ResolverContext<'_>) -> Option<ProductSnapshot> {
    let outcome = tokio::time::timeout(ctx.search_timeout, ctx.search.top_hit(query)).await;

    let hit = match outcome {
        Ok(Ok(Some(hit))) => hit,
        Ok(Ok(None)) => return None,
        Ok(Err(error)) => {
            warn!(query, %error, "semantic search failed, candidate stays unresolved");
            return None;
        }
        Err(_) => {
            warn!(
                query,
                timeout_ms = ctx.search_timeout.as_millis() as u64,
                "semantic search timed out, candidate stays unresolved"
            );
            return None;
        }
    };

    if hit.score < ctx.similarity_threshold {
        debug!(
            query,
            score = hit.score,
            threshold = ctx.similarity_threshold,
            "top search hit below acceptance threshold"
        );
        return None;
    }

    ctx.products.iter().find(|product| product.id == hit.product_id).map(ProductSnapshot::from)
}
