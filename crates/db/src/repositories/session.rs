use chrono::Utc;

use cartwright_core::domain::cart::{Cart, SessionId};
use cartwright_core::ports::{SessionStore, SessionStoreError};

use super::RepositoryError;
use crate::DbPool;

/// Stores each session cart as a single JSON document. The engine serializes
/// commands per session, so a whole-document upsert is safe here.
pub struct SqlSessionStore {
    pool: DbPool,
}

impl SqlSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch_cart(&self, session: &SessionId) -> Result<Cart, RepositoryError> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT cart_json FROM cart_session WHERE session_id = ?")
                .bind(&session.0)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            None => Ok(Cart::default()),
            Some(json) => serde_json::from_str(&json).map_err(|error| {
                RepositoryError::Decode(format!(
                    "invalid cart document for session `{}`: {error}",
                    session.0
                ))
            }),
        }
    }

    async fn store_cart(&self, session: &SessionId, cart: &Cart) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(cart)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;

        sqlx::query(
            "INSERT INTO cart_session (session_id, cart_json, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(session_id) DO UPDATE SET
                cart_json = excluded.cart_json,
                updated_at = excluded.updated_at",
        )
        .bind(&session.0)
        .bind(json)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStore for SqlSessionStore {
    async fn get_cart(&self, session: &SessionId) -> Result<Cart, SessionStoreError> {
        Ok(self.fetch_cart(session).await?)
    }

    async fn put_cart(&self, session: &SessionId, cart: &Cart) -> Result<(), SessionStoreError> {
        Ok(self.store_cart(session, cart).await?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use cartwright_core::domain::cart::{Cart, CartEntry, SessionId};
    use cartwright_core::domain::product::ProductId;
    use cartwright_core::ports::SessionStore;

    use super::SqlSessionStore;
    use crate::{connect_with_settings, migrations, DbPool};

    #[tokio::test]
    async fn unknown_session_reads_back_as_an_empty_cart() {
        let pool = setup_pool().await;
        let store = SqlSessionStore::new(pool.clone());

        let cart =
            store.get_cart(&SessionId("sess-missing".to_string())).await.expect("get cart");
        assert!(cart.is_empty());

        pool.close().await;
    }

    #[tokio::test]
    async fn cart_document_round_trips_with_prices_intact() {
        let pool = setup_pool().await;
        let store = SqlSessionStore::new(pool.clone());
        let session = SessionId("sess-rt".to_string());

        let mut cart = Cart::default();
        cart.insert_entry(CartEntry {
            product_id: ProductId("rt-lemonade".to_string()),
            product_name: "Lemonade".to_string(),
            unit_price: Decimal::new(350, 2),
            quantity: 2,
        })
        .expect("insert entry");

        store.put_cart(&session, &cart).await.expect("put cart");
        let found = store.get_cart(&session).await.expect("get cart");
        assert_eq!(found, cart);
        assert_eq!(found.entries[0].unit_price.to_string(), "3.50");

        pool.close().await;
    }

    #[tokio::test]
    async fn put_cart_replaces_the_previous_document() {
        let pool = setup_pool().await;
        let store = SqlSessionStore::new(pool.clone());
        let session = SessionId("sess-replace".to_string());

        let mut cart = Cart::default();
        cart.insert_entry(CartEntry {
            product_id: ProductId("rep-cola".to_string()),
            product_name: "Cola".to_string(),
            unit_price: Decimal::new(250, 2),
            quantity: 1,
        })
        .expect("insert entry");
        store.put_cart(&session, &cart).await.expect("put first cart");

        cart.clear();
        store.put_cart(&session, &cart).await.expect("put cleared cart");

        let found = store.get_cart(&session).await.expect("get cart");
        assert!(found.is_empty());

        pool.close().await;
    }

    async fn setup_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:?cache=shared", 1, 30)
            .await
            .expect("connect test pool");
        migrations::run_pending(&pool).await.expect("run migrations");
        pool
    }
}
