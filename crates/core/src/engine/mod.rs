//! The cart command engine: parse one utterance, resolve its candidates
//! against cart and catalog, mutate the session cart, and assemble a receipt.
//!
//! `Err` is reserved for infrastructure failures (session store, catalog).
//! Everything linguistic (unknown products, stock shortfalls, ambiguous bare
//! commands) is reported inside the receipt with `success = false`.

mod mutator;
mod resolver;

pub use resolver::{ProductSnapshot, Resolution};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use crate::config::SearchConfig;
use crate::domain::cart::{Cart, SessionId};
use crate::domain::command::{CartAction, CommandReceipt};
use crate::errors::EngineError;
use crate::parser::{self, CandidateItem};
use crate::ports::{ProductCatalog, SemanticSearch, SessionStore};
use crate::vocabulary::VocabularyStore;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineSettings {
    pub similarity_threshold: f32,
    pub search_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self { similarity_threshold: 0.7, search_timeout: Duration::from_millis(2_000) }
    }
}

impl From<&SearchConfig> for EngineSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            similarity_threshold: config.similarity_threshold,
            search_timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// One async lock per session. Commands for the same session serialize their
/// read-modify-write; commands for different sessions never contend.
#[derive(Debug, Default)]
pub struct SessionLocks {
    inner: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, session: &SessionId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(session.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        lock.lock_owned().await
    }
}

pub struct CartCommandEngine {
    catalog: Arc<dyn ProductCatalog>,
    search: Arc<dyn SemanticSearch>,
    sessions: Arc<dyn SessionStore>,
    vocabulary: Arc<VocabularyStore>,
    settings: EngineSettings,
    locks: SessionLocks,
}

impl CartCommandEngine {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        search: Arc<dyn SemanticSearch>,
        sessions: Arc<dyn SessionStore>,
        vocabulary: Arc<VocabularyStore>,
        settings: EngineSettings,
    ) -> Self {
        Self { catalog, search, sessions, vocabulary, settings, locks: SessionLocks::new() }
    }

    /// Runs the full pipeline for one utterance against one session cart.
    /// The cart is written back at most once, and only when a mutation
    /// actually changed it.
    pub async fn handle_utterance(
        &self,
        session: &SessionId,
        text: &str,
    ) -> Result<CommandReceipt, EngineError> {
        let vocabulary = self.vocabulary.current().await;
        let parsed = parser::parse_utterance(text, &vocabulary);
        debug!(
            action = %parsed.action,
            candidates = parsed.candidates.len(),
            vocabulary_version = vocabulary.version(),
            "parsed utterance"
        );

        let action = parsed.action;
        let _guard = self.locks.acquire(session).await;

        let mut cart = self
            .sessions
            .get_cart(session)
            .await
            .map_err(|error| EngineError::SessionStore(error.to_string()))?;

        let mut candidates = parsed.candidates;
        if candidates.is_empty() && action != CartAction::Clear {
            match bare_command_candidates(action, &cart) {
                BareCommand::Target(list) => candidates = list,
                BareCommand::Reply(message) => {
                    return Ok(CommandReceipt::new(false, action, vec![message], &cart));
                }
            }
        }

        let resolutions = if action == CartAction::Clear {
            Vec::new()
        } else {
            let mut products = self
                .catalog
                .list_products()
                .await
                .map_err(|error| EngineError::Catalog(error.to_string()))?;
            products.sort_by(|a, b| a.id.0.cmp(&b.id.0));

            let ctx = resolver::ResolverContext {
                products: &products,
                cart: &cart,
                search: self.search.as_ref(),
                similarity_threshold: self.settings.similarity_threshold,
                search_timeout: self.settings.search_timeout,
            };
            resolver::resolve_candidates(&candidates, &ctx).await
        };

        let outcome = mutator::apply(action, resolutions, &mut cart);
        if outcome.modified {
            self.sessions
                .put_cart(session, &cart)
                .await
                .map_err(|error| EngineError::SessionStore(error.to_string()))?;
        }

        info!(
            action = %action,
            success = outcome.success,
            cart_items = cart.len(),
            "cart command applied"
        );
        Ok(CommandReceipt::new(outcome.success, action, outcome.messages, &cart))
    }

    /// Current cart for a session, read without taking the session lock.
    pub async fn cart_snapshot(&self, session: &SessionId) -> Result<Cart, EngineError> {
        self.sessions
            .get_cart(session)
            .await
            .map_err(|error| EngineError::SessionStore(error.to_string()))
    }
}

enum BareCommand {
    /// Proceed with these substituted candidates.
    Target(Vec<CandidateItem>),
    /// Stop and answer with this message, success = false.
    Reply(String),
}

/// A delete or decrease with no product text targets the cart itself: one
/// entry is unambiguous, an empty cart is an error, and several entries get
/// a disambiguation question instead of a guess. A bare add has nothing to
/// work with at all.
fn bare_command_candidates(action: CartAction, cart: &Cart) -> BareCommand {
    if action == CartAction::Add {
        return BareCommand::Reply("nothing to add, say a product name".to_string());
    }

    match cart.len() {
        0 => BareCommand::Reply(format!("cart is empty, cannot {action}")),
        1 => BareCommand::Target(vec![CandidateItem {
            name: cart.entries[0].product_name.clone(),
            quantity: 1,
        }]),
        _ => BareCommand::Reply(format!(
            "which item did you mean? cart has: {}",
            cart.product_names().join(", ")
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tokio::sync::RwLock;

    use crate::domain::cart::{Cart, SessionId};
    use crate::domain::command::CartAction;
    use crate::domain::product::{Product, ProductId};
    use crate::ports::{
        CatalogError, ProductCatalog, SearchError, SearchHit, SemanticSearch, SessionStore,
        SessionStoreError,
    };
    use crate::vocabulary::{VocabularySet, VocabularyStore};

    use super::{CartCommandEngine, EngineSettings};

    struct StubCatalog {
        products: Vec<Product>,
    }

    #[async_trait]
    impl ProductCatalog for StubCatalog {
        async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
            Ok(self.products.clone())
        }

        async fn product_by_id(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
            Ok(self.products.iter().find(|product| &product.id == id).cloned())
        }
    }

    struct NoHit;

    #[async_trait]
    impl SemanticSearch for NoHit {
        async fn top_hit(&self, _query: &str) -> Result<Option<SearchHit>, SearchError> {
            Ok(None)
        }
    }

    struct FixedHit {
        hit: SearchHit,
    }

    #[async_trait]
    impl SemanticSearch for FixedHit {
        async fn top_hit(&self, _query: &str) -> Result<Option<SearchHit>, SearchError> {
            Ok(Some(self.hit.clone()))
        }
    }

    #[derive(Default)]
    struct MemorySessions {
        carts: RwLock<HashMap<SessionId, Cart>>,
        puts: AtomicUsize,
    }

    #[async_trait]
    impl SessionStore for MemorySessions {
        async fn get_cart(&self, session: &SessionId) -> Result<Cart, SessionStoreError> {
            Ok(self.carts.read().await.get(session).cloned().unwrap_or_default())
        }

        async fn put_cart(
            &self,
            session: &SessionId,
            cart: &Cart,
        ) -> Result<(), SessionStoreError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.carts.write().await.insert(session.clone(), cart.clone());
            Ok(())
        }
    }

    fn product(id: &str, name: &str, stock: u32) -> Product {
        Product {
            id: ProductId(id.to_string()),
            name: name.to_string(),
            price: Decimal::new(350, 2),
            stock,
            category: Some("drinks".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn engine_with(
        products: Vec<Product>,
        search: Arc<dyn SemanticSearch>,
    ) -> (CartCommandEngine, Arc<MemorySessions>) {
        let sessions = Arc::new(MemorySessions::default());
        let engine = CartCommandEngine::new(
            Arc::new(StubCatalog { products }),
            search,
            sessions.clone(),
            Arc::new(VocabularyStore::new(VocabularySet::builtin())),
            EngineSettings::default(),
        );
        (engine, sessions)
    }

    fn session(id: &str) -> SessionId {
        SessionId(id.to_string())
    }

    #[tokio::test]
    async fn add_with_a_numeral_word_puts_the_product_in_the_cart() {
        let (engine, sessions) =
            engine_with(vec![product("p-1", "Lemonade", 5)], Arc::new(NoHit));
        let session = session("s-1");

        let receipt = engine.handle_utterance(&session, "add two lemonade").await.expect("handle");

        assert!(receipt.success);
        assert_eq!(receipt.action, CartAction::Add);
        assert_eq!(receipt.messages, vec!["added 2 x Lemonade".to_string()]);
        assert_eq!(receipt.cart.len(), 1);
        assert_eq!(receipt.cart[0].quantity, 2);
        assert_eq!(receipt.cart[0].line_total, Decimal::new(700, 2));
        assert_eq!(sessions.puts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bare_delete_with_one_entry_removes_that_entry() {
        let (engine, _) = engine_with(vec![product("p-1", "Lemonade", 5)], Arc::new(NoHit));
        let session = session("s-1");

        engine.handle_utterance(&session, "add 1 lemonade").await.expect("seed cart");
        let receipt = engine.handle_utterance(&session, "remove").await.expect("handle");

        assert!(receipt.success);
        assert_eq!(receipt.action, CartAction::Delete);
        assert_eq!(receipt.messages, vec!["removed Lemonade from cart".to_string()]);
        assert!(receipt.cart.is_empty());
    }

    #[tokio::test]
    async fn bare_decrease_with_empty_cart_reports_it() {
        let (engine, sessions) =
            engine_with(vec![product("p-1", "Lemonade", 5)], Arc::new(NoHit));

        let receipt =
            engine.handle_utterance(&session("s-1"), "decrease").await.expect("handle");

        assert!(!receipt.success);
        assert_eq!(receipt.action, CartAction::Decrease);
        assert_eq!(receipt.messages, vec!["cart is empty, cannot decrease".to_string()]);
        assert_eq!(sessions.puts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bare_delete_with_several_entries_asks_instead_of_guessing() {
        let (engine, _) = engine_with(
            vec![product("p-1", "Lemonade", 5), product("p-2", "Cola", 5)],
            Arc::new(NoHit),
        );
        let session = session("s-1");

        engine.handle_utterance(&session, "add 1 lemonade 1 cola").await.expect("seed cart");
        let receipt = engine.handle_utterance(&session, "remove").await.expect("handle");

        assert!(!receipt.success);
        let message = &receipt.messages[0];
        assert!(message.contains("Lemonade") && message.contains("Cola"), "got: {message}");
        assert_eq!(receipt.cart.len(), 2, "cart must be untouched");
    }

    #[tokio::test]
    async fn clear_with_qualifier_empties_the_cart() {
        let (engine, _) = engine_with(
            vec![product("p-1", "Lemonade", 5), product("p-2", "Cola", 5)],
            Arc::new(NoHit),
        );
        let session = session("s-1");

        engine.handle_utterance(&session, "add 2 lemonade 1 cola").await.expect("seed cart");
        let receipt = engine.handle_utterance(&session, "remove everything").await.expect("handle");

        assert!(receipt.success);
        assert_eq!(receipt.action, CartAction::Clear);
        assert_eq!(receipt.messages, vec!["cart cleared".to_string()]);
        assert!(receipt.cart.is_empty());
    }

    #[tokio::test]
    async fn add_beyond_stock_fails_and_names_the_available_stock() {
        let (engine, sessions) =
            engine_with(vec![product("p-1", "Lemonade", 5)], Arc::new(NoHit));

        let receipt =
            engine.handle_utterance(&session("s-1"), "add 9 lemonade").await.expect("handle");

        assert!(!receipt.success);
        assert_eq!(
            receipt.messages,
            vec!["cannot add 9 x Lemonade, only 5 in stock".to_string()]
        );
        assert!(receipt.cart.is_empty());
        assert_eq!(sessions.puts.load(Ordering::SeqCst), 0, "failed command writes nothing");
    }

    #[tokio::test]
    async fn semantic_fallback_resolves_unmatched_names() {
        let search = FixedHit {
            hit: SearchHit { product_id: ProductId("p-9".to_string()), score: 0.88 },
        };
        let (engine, _) =
            engine_with(vec![product("p-9", "Sparkling Water", 5)], Arc::new(search));

        let receipt =
            engine.handle_utterance(&session("s-1"), "add 1 fizzy drink").await.expect("handle");

        assert!(receipt.success);
        assert_eq!(receipt.messages, vec!["added 1 x Sparkling Water".to_string()]);
    }

    #[tokio::test]
    async fn batch_with_one_miss_still_applies_the_rest() {
        let (engine, sessions) =
            engine_with(vec![product("p-1", "Lemonade", 5)], Arc::new(NoHit));

        let receipt = engine
            .handle_utterance(&session("s-1"), "add moon juice 1 lemonade 2")
            .await
            .expect("handle");

        assert!(receipt.success);
        assert_eq!(receipt.messages.len(), 2);
        assert!(receipt.messages[0].contains("could not find moon juice"));
        assert_eq!(receipt.cart.len(), 1);
        assert_eq!(sessions.puts.load(Ordering::SeqCst), 1, "one write-back per command");
    }

    #[tokio::test]
    async fn same_session_commands_serialize_without_lost_updates() {
        let (engine, _) = engine_with(vec![product("p-1", "Lemonade", 10)], Arc::new(NoHit));
        let session = session("s-1");

        let (first, second) = tokio::join!(
            engine.handle_utterance(&session, "add 2 lemonade"),
            engine.handle_utterance(&session, "add 3 lemonade"),
        );
        first.expect("first command");
        second.expect("second command");

        let cart = engine.cart_snapshot(&session).await.expect("snapshot");
        assert_eq!(cart.entries[0].quantity, 5);
    }

    #[tokio::test]
    async fn bare_add_asks_for_a_product_name() {
        let (engine, _) = engine_with(vec![product("p-1", "Lemonade", 5)], Arc::new(NoHit));

        let receipt = engine.handle_utterance(&session("s-1"), "add").await.expect("handle");

        assert!(!receipt.success);
        assert_eq!(receipt.action, CartAction::Add);
        assert_eq!(receipt.messages, vec!["nothing to add, say a product name".to_string()]);
    }
}
