use crate::domain::cart::{Cart, CartEntry};
use crate::domain::command::CartAction;

use super::resolver::Resolution;

/// What a batch of per-item mutations did to the cart. `success` is true
/// when at least one item went through; `modified` gates the single
/// write-back to the session store.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct MutationOutcome {
    pub success: bool,
    pub messages: Vec<String>,
    pub modified: bool,
}

pub(crate) fn apply(
    action: CartAction,
    resolutions: Vec<Resolution>,
    cart: &mut Cart,
) -> MutationOutcome {
    match action {
        CartAction::Clear => clear(cart),
        CartAction::Add => add(resolutions, cart),
        CartAction::Decrease => decrease(resolutions, cart),
        CartAction::Delete => delete(resolutions, cart),
    }
}

fn clear(cart: &mut Cart) -> MutationOutcome {
    let modified = !cart.is_empty();
    cart.clear();
    MutationOutcome { success: true, messages: vec!["cart cleared".to_string()], modified }
}

fn add(resolutions: Vec<Resolution>, cart: &mut Cart) -> MutationOutcome {
    let mut outcome = MutationOutcome { success: false, messages: Vec::new(), modified: false };

    for resolution in resolutions {
        let (product, quantity) = match resolution {
            Resolution::NotFound { name } => {
                outcome.messages.push(format!("could not find {name}"));
                continue;
            }
            Resolution::Resolved { product, quantity } => (product, quantity),
        };

        if product.stock == 0 {
            outcome.messages.push(format!("{} is out of stock", product.name));
            continue;
        }

        let existing = cart.find_by_id(&product.id).map(|entry| entry.quantity).unwrap_or(0);
        if u64::from(existing) + u64::from(quantity) > u64::from(product.stock) {
            outcome.messages.push(format!(
                "cannot add {quantity} x {}, only {} in stock",
                product.name, product.stock
            ));
            continue;
        }

        match cart.find_by_id_mut(&product.id) {
            Some(entry) => entry.quantity += quantity,
            None => {
                let entry = CartEntry {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    unit_price: product.price,
                    quantity,
                };
                if let Err(error) = cart.insert_entry(entry) {
                    outcome.messages.push(format!("could not add {}: {error}", product.name));
                    continue;
                }
            }
        }

        outcome.messages.push(format!("added {quantity} x {}", product.name));
        outcome.success = true;
        outcome.modified = true;
    }

    outcome
}

fn decrease(resolutions: Vec<Resolution>, cart: &mut Cart) -> MutationOutcome {
    let mut outcome = MutationOutcome { success: false, messages: Vec::new(), modified: false };

    for resolution in resolutions {
        let (product, quantity) = match resolution {
            Resolution::NotFound { name } => {
                outcome.messages.push(format!("could not find {name}"));
                continue;
            }
            Resolution::Resolved { product, quantity } => (product, quantity),
        };

        let current = match cart.find_by_id(&product.id) {
            Some(entry) => entry.quantity,
            None => {
                outcome.messages.push(format!("{} not in cart", product.name));
                continue;
            }
        };

        if current <= quantity {
            cart.remove_by_id(&product.id);
            outcome.messages.push(format!("removed {} from cart", product.name));
        } else {
            let remaining = current - quantity;
            if let Some(entry) = cart.find_by_id_mut(&product.id) {
                entry.quantity = remaining;
            }
            outcome.messages.push(format!("decreased {} to {remaining}", product.name));
        }

        outcome.success = true;
        outcome.modified = true;
    }

    outcome
}

fn delete(resolutions: Vec<Resolution>, cart: &mut Cart) -> MutationOutcome {
    let mut outcome = MutationOutcome { success: false, messages: Vec::new(), modified: false };

    for resolution in resolutions {
        let product = match resolution {
            Resolution::NotFound { name } => {
                outcome.messages.push(format!("could not find {name}"));
                continue;
            }
            Resolution::Resolved { product, .. } => product,
        };

        match cart.remove_by_id(&product.id) {
            None => outcome.messages.push(format!("{} not in cart", product.name)),
            Some(entry) => {
                outcome.messages.push(format!("removed {} from cart", entry.product_name));
                outcome.success = true;
                outcome.modified = true;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::cart::{Cart, CartEntry};
    use crate::domain::command::CartAction;
    use crate::domain::product::ProductId;
    use crate::engine::resolver::{ProductSnapshot, Resolution};

    use super::apply;

    fn snapshot(id: &str, name: &str, stock: u32) -> ProductSnapshot {
        ProductSnapshot {
            id: ProductId(id.to_string()),
            name: name.to_string(),
            price: Decimal::new(350, 2),
            stock,
        }
    }

    fn resolved(id: &str, name: &str, stock: u32, quantity: u32) -> Resolution {
        Resolution::Resolved { product: snapshot(id, name, stock), quantity }
    }

    fn cart_with(entries: &[(&str, &str, u32)]) -> Cart {
        let mut cart = Cart::default();
        for (id, name, quantity) in entries {
            cart.insert_entry(CartEntry {
                product_id: ProductId(id.to_string()),
                product_name: name.to_string(),
                unit_price: Decimal::new(350, 2),
                quantity: *quantity,
            })
            .expect("fixture entry");
        }
        cart
    }

    #[test]
    fn add_inserts_a_new_entry() {
        let mut cart = Cart::default();
        let outcome =
            apply(CartAction::Add, vec![resolved("p-1", "Lemonade", 5, 2)], &mut cart);

        assert!(outcome.success);
        assert!(outcome.modified);
        assert_eq!(outcome.messages, vec!["added 2 x Lemonade".to_string()]);
        assert_eq!(cart.entries[0].quantity, 2);
    }

    #[test]
    fn add_increments_an_existing_entry() {
        let mut cart = cart_with(&[("p-1", "Lemonade", 2)]);
        let outcome =
            apply(CartAction::Add, vec![resolved("p-1", "Lemonade", 5, 3)], &mut cart);

        assert!(outcome.success);
        assert_eq!(cart.entries[0].quantity, 5);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn add_rejects_out_of_stock_products() {
        let mut cart = Cart::default();
        let outcome =
            apply(CartAction::Add, vec![resolved("p-1", "Lemonade", 0, 1)], &mut cart);

        assert!(!outcome.success);
        assert!(!outcome.modified);
        assert_eq!(outcome.messages, vec!["Lemonade is out of stock".to_string()]);
        assert!(cart.is_empty());
    }

    #[test]
    fn add_counts_existing_quantity_against_stock() {
        let mut cart = cart_with(&[("p-1", "Lemonade", 3)]);
        let outcome =
            apply(CartAction::Add, vec![resolved("p-1", "Lemonade", 5, 3)], &mut cart);

        assert!(!outcome.success);
        assert_eq!(
            outcome.messages,
            vec!["cannot add 3 x Lemonade, only 5 in stock".to_string()]
        );
        assert_eq!(cart.entries[0].quantity, 3, "cart must be unchanged");
    }

    #[test]
    fn decrease_reduces_quantity() {
        let mut cart = cart_with(&[("p-1", "Lemonade", 5)]);
        let outcome =
            apply(CartAction::Decrease, vec![resolved("p-1", "Lemonade", 5, 2)], &mut cart);

        assert!(outcome.success);
        assert_eq!(outcome.messages, vec!["decreased Lemonade to 3".to_string()]);
        assert_eq!(cart.entries[0].quantity, 3);
    }

    #[test]
    fn decrease_to_zero_or_below_removes_the_entry() {
        let mut cart = cart_with(&[("p-1", "Lemonade", 2)]);
        let outcome =
            apply(CartAction::Decrease, vec![resolved("p-1", "Lemonade", 5, 2)], &mut cart);

        assert!(outcome.success);
        assert_eq!(outcome.messages, vec!["removed Lemonade from cart".to_string()]);
        assert!(cart.is_empty());

        let mut cart = cart_with(&[("p-1", "Lemonade", 2)]);
        let outcome =
            apply(CartAction::Decrease, vec![resolved("p-1", "Lemonade", 5, 9)], &mut cart);

        assert!(outcome.success);
        assert!(cart.is_empty());
    }

    #[test]
    fn decrease_requires_the_entry_to_exist() {
        let mut cart = cart_with(&[("p-2", "Cola", 1)]);
        let outcome =
            apply(CartAction::Decrease, vec![resolved("p-1", "Lemonade", 5, 1)], &mut cart);

        assert!(!outcome.success);
        assert!(!outcome.modified);
        assert_eq!(outcome.messages, vec!["Lemonade not in cart".to_string()]);
    }

    #[test]
    fn delete_removes_the_entry() {
        let mut cart = cart_with(&[("p-1", "Lemonade", 2), ("p-2", "Cola", 1)]);
        let outcome =
            apply(CartAction::Delete, vec![resolved("p-1", "Lemonade", 5, 1)], &mut cart);

        assert!(outcome.success);
        assert_eq!(outcome.messages, vec!["removed Lemonade from cart".to_string()]);
        assert_eq!(cart.product_names(), vec!["Cola"]);
    }

    #[test]
    fn delete_requires_the_entry_to_exist() {
        let mut cart = Cart::default();
        let outcome =
            apply(CartAction::Delete, vec![resolved("p-1", "Lemonade", 5, 1)], &mut cart);

        assert!(!outcome.success);
        assert_eq!(outcome.messages, vec!["Lemonade not in cart".to_string()]);
    }

    #[test]
    fn clear_succeeds_even_when_cart_is_empty() {
        let mut cart = Cart::default();
        let outcome = apply(CartAction::Clear, Vec::new(), &mut cart);

        assert!(outcome.success);
        assert!(!outcome.modified, "clearing an empty cart writes nothing back");
        assert_eq!(outcome.messages, vec!["cart cleared".to_string()]);

        let mut cart = cart_with(&[("p-1", "Lemonade", 2)]);
        let outcome = apply(CartAction::Clear, Vec::new(), &mut cart);

        assert!(outcome.success);
        assert!(outcome.modified);
        assert!(cart.is_empty());
    }

    #[test]
    fn one_success_in_a_batch_makes_the_command_succeed() {
        let mut cart = Cart::default();
        let outcome = apply(
            CartAction::Add,
            vec![
                Resolution::NotFound { name: "moon juice".to_string() },
                resolved("p-1", "Lemonade", 5, 2),
            ],
            &mut cart,
        );

        assert!(outcome.success);
        assert_eq!(
            outcome.messages,
            vec!["could not find moon juice".to_string(), "added 2 x Lemonade".to_string()]
        );
    }

    #[test]
    fn all_failures_make_the_command_fail() {
        let mut cart = Cart::default();
        let outcome = apply(
            CartAction::Add,
            vec![
                Resolution::NotFound { name: "moon juice".to_string() },
                resolved("p-1", "Lemonade", 0, 1),
            ],
            &mut cart,
        );

        assert!(!outcome.success);
        assert!(!outcome.modified);
    }
}
