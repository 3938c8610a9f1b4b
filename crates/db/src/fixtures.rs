use sqlx::Executor;

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Canonical demo catalog and verification contract for the drink stall.
const SEED_PRODUCTS: &[SeedProductContract] = &[
    SeedProductContract {
        product_id: "drink-lemonade",
        name: "Lemonade",
        price: "3.50",
        stock: 5,
        category: "juice",
    },
    SeedProductContract {
        product_id: "drink-iced-tea",
        name: "Iced Tea",
        price: "3.00",
        stock: 12,
        category: "tea",
    },
    SeedProductContract {
        product_id: "drink-green-tea",
        name: "Green Tea",
        price: "3.25",
        stock: 10,
        category: "tea",
    },
    SeedProductContract {
        product_id: "drink-cola",
        name: "Cola",
        price: "2.50",
        stock: 24,
        category: "soda",
    },
    SeedProductContract {
        product_id: "drink-cherry-cola",
        name: "Cherry Cola",
        price: "2.75",
        stock: 8,
        category: "soda",
    },
    SeedProductContract {
        product_id: "drink-sparkling-water",
        name: "Sparkling Water",
        price: "2.00",
        stock: 18,
        category: "water",
    },
    SeedProductContract {
        product_id: "drink-still-water",
        name: "Still Water",
        price: "1.50",
        stock: 30,
        category: "water",
    },
    SeedProductContract {
        product_id: "drink-iced-coffee",
        name: "Iced Coffee",
        price: "3.75",
        stock: 9,
        category: "coffee",
    },
    SeedProductContract {
        product_id: "drink-mango-smoothie",
        name: "Mango Smoothie",
        price: "4.50",
        stock: 0,
        category: "smoothie",
    },
];

/// Deterministic demo catalog for a street drink stall.
///
/// Covers the situations the engine has to handle: multi-word names,
/// overlapping names (Cola vs Cherry Cola), and one sold-out product.
pub struct DemoCatalog;

impl DemoCatalog {
    /// SQL fixture content for the demo catalog.
    pub const SQL: &str = include_str!("../../../config/fixtures/demo_catalog.sql");

    /// Load the demo catalog into the database. Re-running replaces the
    /// seeded rows in place.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let mut tx = pool.begin().await?;

        tx.execute(sqlx::query(Self::SQL)).await?;
        tx.commit().await?;

        let products_seeded = SEED_PRODUCTS
            .iter()
            .map(|product| SeededProductInfo {
                product_id: product.product_id,
                name: product.name,
                price: product.price,
            })
            .collect::<Vec<_>>();

        Ok(SeedResult { products_seeded })
    }

    /// Verify that seeded rows exist and match the contract.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        let seed_ids: Vec<&str> =
            SEED_PRODUCTS.iter().map(|product| product.product_id).collect();
        let quoted_ids = sql_array_from_ids(&seed_ids);
        let expected_total = SEED_PRODUCTS.len() as i64;
        let existing_count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(1) FROM product WHERE id IN {quoted_ids}"
        ))
        .fetch_one(pool)
        .await?;
        checks.push(("catalog-row-count", existing_count == expected_total));

        for product in SEED_PRODUCTS {
            let row_matches: i64 = sqlx::query_scalar(
                "SELECT EXISTS(
                    SELECT 1 FROM product
                    WHERE id = ?1 AND name = ?2 AND price = ?3 AND stock = ?4 AND category = ?5
                )",
            )
            .bind(product.product_id)
            .bind(product.name)
            .bind(product.price)
            .bind(i64::from(product.stock))
            .bind(product.category)
            .fetch_one(pool)
            .await?;
            checks.push((product.product_id, row_matches == 1));
        }

        let sold_out_count: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM product WHERE id = ?1 AND stock = 0")
                .bind("drink-mango-smoothie")
                .fetch_one(pool)
                .await?;
        checks.push(("sold-out-product", sold_out_count == 1));

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedProductContract {
    product_id: &'static str,
    name: &'static str,
    price: &'static str,
    stock: u32,
    category: &'static str,
}

fn sql_array_from_ids(ids: &[&str]) -> String {
    let quoted = ids.iter().map(|id| format!("'{}'", id)).collect::<Vec<_>>().join(",");
    format!("({quoted})")
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: Vec<SeededProductInfo>,
}

#[derive(Debug)]
pub struct SeededProductInfo {
    pub product_id: &'static str,
    pub name: &'static str,
    pub price: &'static str,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}
