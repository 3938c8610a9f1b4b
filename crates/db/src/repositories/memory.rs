use std::collections::HashMap;

use tokio::sync::RwLock;

use cartwright_core::domain::cart::{Cart, SessionId};
use cartwright_core::domain::product::{Product, ProductId};
use cartwright_core::ports::{
    CatalogError, ProductCatalog, SessionStore, SessionStoreError,
};

/// Catalog backed by a process-local map. Used by tests and by the parse
/// command, which needs the engine without a database.
#[derive(Default)]
pub struct InMemoryProductCatalog {
    products: RwLock<HashMap<String, Product>>,
}

impl InMemoryProductCatalog {
    pub async fn save(&self, product: Product) {
        let mut products = self.products.write().await;
        products.insert(product.id.0.clone(), product);
    }
}

#[async_trait::async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let products = self.products.read().await;
        let mut listed: Vec<Product> = products.values().cloned().collect();
        listed.sort_by(|a, b| a.id.0.cmp(&b.id.0));
        Ok(listed)
    }

    async fn product_by_id(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    carts: RwLock<HashMap<String, Cart>>,
}

#[async_trait::async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_cart(&self, session: &SessionId) -> Result<Cart, SessionStoreError> {
        let carts = self.carts.read().await;
        Ok(carts.get(&session.0).cloned().unwrap_or_default())
    }

    async fn put_cart(&self, session: &SessionId, cart: &Cart) -> Result<(), SessionStoreError> {
        let mut carts = self.carts.write().await;
        carts.insert(session.0.clone(), cart.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use cartwright_core::domain::cart::{Cart, CartEntry, SessionId};
    use cartwright_core::domain::product::{Product, ProductId};
    use cartwright_core::ports::{ProductCatalog, SessionStore};

    use crate::repositories::{InMemoryProductCatalog, InMemorySessionStore};

    #[tokio::test]
    async fn in_memory_catalog_round_trip() {
        let catalog = InMemoryProductCatalog::default();
        let product = Product {
            id: ProductId("drink-lemonade".to_string()),
            name: "Lemonade".to_string(),
            price: Decimal::new(350, 2),
            stock: 5,
            category: Some("juice".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        catalog.save(product.clone()).await;
        let found = catalog.product_by_id(&product.id).await.expect("find product");

        assert_eq!(found, Some(product));
    }

    #[tokio::test]
    async fn in_memory_catalog_lists_in_id_order() {
        let catalog = InMemoryProductCatalog::default();
        for (id, name) in [("p-2", "Cola"), ("p-1", "Apple Juice"), ("p-3", "Lemonade")] {
            catalog
                .save(Product {
                    id: ProductId(id.to_string()),
                    name: name.to_string(),
                    price: Decimal::new(300, 2),
                    stock: 10,
                    category: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
                .await;
        }

        let products = catalog.list_products().await.expect("list products");
        let ids: Vec<&str> = products.iter().map(|product| product.id.0.as_str()).collect();

        assert_eq!(ids, vec!["p-1", "p-2", "p-3"]);
    }

    #[tokio::test]
    async fn in_memory_session_store_round_trip() {
        let store = InMemorySessionStore::default();
        let session = SessionId("sess-1".to_string());

        let mut cart = Cart::default();
        cart.insert_entry(CartEntry {
            product_id: ProductId("drink-cola".to_string()),
            product_name: "Cola".to_string(),
            unit_price: Decimal::new(250, 2),
            quantity: 3,
        })
        .expect("insert entry");

        store.put_cart(&session, &cart).await.expect("put cart");
        let found = store.get_cart(&session).await.expect("get cart");

        assert_eq!(found, cart);
        assert!(store
            .get_cart(&SessionId("sess-other".to_string()))
            .await
            .expect("get other cart")
            .is_empty());
    }
}
