//! Order domain types.
//!
//! Orders are immutable snapshots: item prices are captured at purchase
//! time and never re-read from the live catalog. Only `status` and
//! `payment_status` change after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sundry_core::{Money, OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Sum of `unit_price × quantity` over all items, fixed at creation.
    pub total_amount: Money,
    #[sqlx(flatten)]
    #[serde(rename = "shipping_address")]
    pub shipping: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shipping destination snapshot stored inline on the order row.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ShippingAddress {
    #[sqlx(rename = "ship_recipient")]
    pub recipient: String,
    #[sqlx(rename = "ship_line1")]
    pub line1: String,
    #[sqlx(rename = "ship_line2")]
    pub line2: Option<String>,
    #[sqlx(rename = "ship_city")]
    pub city: String,
    #[sqlx(rename = "ship_state")]
    pub state: Option<String>,
    #[sqlx(rename = "ship_postal_code")]
    pub postal_code: String,
    #[sqlx(rename = "ship_country")]
    pub country: String,
    #[sqlx(rename = "ship_phone")]
    pub phone: Option<String>,
}

impl ShippingAddress {
    /// Reject blank required fields.
    ///
    /// # Errors
    ///
    /// Returns the name of the first missing field.
    pub fn validate(&self) -> Result<(), &'static str> {
        let required = [
            ("recipient", &self.recipient),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(name);
            }
        }
        Ok(())
    }
}

/// An immutable snapshot of one purchased line.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    pub quantity: i32,
    /// Unit price at purchase time, decoupled from the live product price.
    pub unit_price: Money,
}

impl OrderItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// An order with its items, as returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            recipient: "Jo Doe".into(),
            line1: "1 Main St".into(),
            line2: None,
            city: "Springfield".into(),
            state: None,
            postal_code: "12345".into(),
            country: "US".into(),
            phone: None,
        }
    }

    #[test]
    fn test_shipping_address_valid() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn test_shipping_address_missing_field() {
        let mut addr = address();
        addr.city = "   ".into();
        assert_eq!(addr.validate(), Err("city"));
    }
}
