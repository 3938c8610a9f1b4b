use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::Cart;

/// What the speaker wants done to the cart. Classification picks exactly one
/// action per utterance; `Add` is the default when nothing else matches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartAction {
    Add,
    Decrease,
    Delete,
    Clear,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Decrease => "decrease",
            Self::Delete => "delete",
            Self::Clear => "clear",
        }
    }
}

impl std::fmt::Display for CartAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rendered cart row in a command response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// The structured outcome of one utterance: overall success, the action that
/// was attempted, one message per candidate item, and the post-mutation cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommandReceipt {
    pub success: bool,
    pub action: CartAction,
    pub messages: Vec<String>,
    pub cart: Vec<CartLine>,
}

impl CommandReceipt {
    pub fn new(success: bool, action: CartAction, messages: Vec<String>, cart: &Cart) -> Self {
        let cart = cart
            .entries
            .iter()
            .map(|entry| CartLine {
                product_name: entry.product_name.clone(),
                quantity: entry.quantity,
                unit_price: entry.unit_price,
                line_total: entry.line_total(),
            })
            .collect();

        Self { success, action, messages, cart }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::cart::{Cart, CartEntry};
    use crate::domain::product::ProductId;

    use super::{CartAction, CommandReceipt};

    #[test]
    fn action_serializes_lowercase() {
        let json = serde_json::to_string(&CartAction::Decrease).expect("serialize");
        assert_eq!(json, "\"decrease\"");
    }

    #[test]
    fn receipt_renders_cart_lines_in_order() {
        let mut cart = Cart::default();
        cart.insert_entry(CartEntry {
            product_id: ProductId("p-1".to_string()),
            product_name: "Lemonade".to_string(),
            unit_price: Decimal::new(350, 2),
            quantity: 2,
        })
        .expect("insert");

        let receipt = CommandReceipt::new(
            true,
            CartAction::Add,
            vec!["added 2 x Lemonade".to_string()],
            &cart,
        );

        let json = serde_json::to_value(&receipt).expect("serialize");
        assert_eq!(json["success"], true);
        assert_eq!(json["action"], "add");
        assert_eq!(json["cart"][0]["product_name"], "Lemonade");
        assert_eq!(json["cart"][0]["unit_price"], "3.50");
        assert_eq!(json["cart"][0]["line_total"], "7.00");
    }
}
