use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// One product in a session cart. Quantity is always at least 1; an entry
/// whose quantity would drop to zero is removed from the cart instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartEntry {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Insertion-ordered cart with at most one entry per product id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub entries: Vec<CartEntry>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn find_by_id(&self, product_id: &ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| &entry.product_id == product_id)
    }

    pub fn find_by_id_mut(&mut self, product_id: &ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|entry| &entry.product_id == product_id)
    }

    pub fn insert_entry(&mut self, entry: CartEntry) -> Result<(), DomainError> {
        if entry.quantity < 1 {
            return Err(DomainError::QuantityBelowMinimum(entry.quantity));
        }
        if self.find_by_id(&entry.product_id).is_some() {
            return Err(DomainError::DuplicateCartEntry(entry.product_id.0.clone()));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn remove_by_id(&mut self, product_id: &ProductId) -> Option<CartEntry> {
        let index = self.entries.iter().position(|entry| &entry.product_id == product_id)?;
        Some(self.entries.remove(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn product_names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.product_name.as_str()).collect()
    }

    pub fn total(&self) -> Decimal {
        self.entries.iter().map(CartEntry::line_total).sum()
    }
}
