//! Cart domain types.
//!
//! A cart is the user's mutable selection before checkout. Line totals and
//! the subtotal are never stored; they are recomputed from live product
//! prices on every read.

use chrono::{DateTime, Utc};
use serde::Serialize;

use sundry_core::{CartId, CartItemId, Money, ProductId, UserId};

/// A user's cart. At most one exists per user; created lazily.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single (product, quantity) row in a cart.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart row joined with live product data, as returned to the client.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_slug: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    /// Effective unit price right now (sale price when set).
    pub unit_price: Money,
    /// Live stock, so clients can flag lines that are no longer coverable.
    pub stock: i32,
}

impl CartLine {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// The full cart view: lines plus recomputed subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub subtotal: Money,
    pub item_count: i64,
}

/// One line in the cart view, with its computed total.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub line_total: Money,
}

impl CartView {
    /// Assemble the view from joined rows, recomputing totals.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let subtotal = lines.iter().map(CartLine::line_total).sum();
        let item_count = lines.iter().map(|l| i64::from(l.quantity)).sum();
        let items = lines
            .into_iter()
            .map(|line| CartLineView {
                line_total: line.line_total(),
                line,
            })
            .collect();

        Self {
            items,
            subtotal,
            item_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn line(id: i32, quantity: i32, price: &str) -> CartLine {
        CartLine {
            id: CartItemId::new(id),
            product_id: ProductId::new(id),
            product_name: format!("product-{id}"),
            product_slug: format!("product-{id}"),
            image_url: None,
            quantity,
            unit_price: Money::new(Decimal::from_str(price).unwrap()),
            stock: 10,
        }
    }

    #[test]
    fn test_subtotal_recomputed_from_lines() {
        let view = CartView::from_lines(vec![line(1, 2, "10.00"), line(2, 1, "20.00")]);
        assert_eq!(view.subtotal.to_string(), "40.00");
        assert_eq!(view.item_count, 3);
        assert_eq!(view.items[0].line_total.to_string(), "20.00");
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::from_lines(Vec::new());
        assert_eq!(view.subtotal, Money::ZERO);
        assert_eq!(view.item_count, 0);
        assert!(view.items.is_empty());
    }
}
