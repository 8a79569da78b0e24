//! Checkout: converting a cart into an order.
//!
//! This is the one operation in the system with a real consistency
//! requirement. Creating an order must atomically:
//!
//! 1. insert the order row and its snapshot items,
//! 2. decrement each product's stock by the purchased quantity,
//! 3. delete the cart's items,
//!
//! all in one transaction, or leave no partial effect. Stock is decremented
//! with a conditional `UPDATE ... WHERE stock >= quantity`, so the storage
//! engine serializes concurrent checkouts against the same unit and the
//! store never oversells. Order numbers carry a unique constraint; the
//! whole transaction retries with a fresh number on the (rare) suffix
//! collision.

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;

use sundry_core::{CartId, Money, OrderId, OrderNumber, ProductId, UserId};

use crate::db::{CartRepository, RepositoryError};
use crate::models::order::{Order, OrderItem, OrderView, ShippingAddress};

/// Attempts before giving up on order-number generation.
const MAX_ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// Errors from order creation.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// A cart line asks for more units than the product has.
    #[error("insufficient stock for {product_name}")]
    InsufficientStock {
        product_id: ProductId,
        product_name: String,
    },

    /// Every generated order number collided. Practically unreachable.
    #[error("could not generate a unique order number")]
    OrderNumberExhausted,

    /// Database operation failed.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// One cart line as read inside the checkout transaction.
#[derive(Debug, sqlx::FromRow)]
struct CheckoutLine {
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    unit_price: Money,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order from the user's current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] when the cart has no items and
    /// [`CheckoutError::InsufficientStock`] when any line exceeds live
    /// stock. In both cases no rows are written.
    pub async fn create_order(
        &self,
        user_id: UserId,
        shipping: &ShippingAddress,
    ) -> Result<OrderView, CheckoutError> {
        let carts = CartRepository::new(self.pool);
        let cart = carts.get_or_create(user_id).await?;

        // Cheap pre-check outside the transaction: reject obviously empty or
        // uncoverable carts before doing any transactional work. The
        // authoritative check is the conditional decrement below.
        let lines = carts.get_lines(cart.id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        for line in &lines {
            if line.quantity > line.stock {
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                });
            }
        }

        for _ in 0..MAX_ORDER_NUMBER_ATTEMPTS {
            match self.try_create(cart.id, user_id, shipping).await? {
                Some(view) => return Ok(view),
                // Order-number collision: retry the whole transaction with a
                // fresh suffix
                None => continue,
            }
        }

        Err(CheckoutError::OrderNumberExhausted)
    }

    /// One transactional attempt. Returns `Ok(None)` on an order-number
    /// collision so the caller can retry.
    async fn try_create(
        &self,
        cart_id: CartId,
        user_id: UserId,
        shipping: &ShippingAddress,
    ) -> Result<Option<OrderView>, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        // Read the lines again inside the transaction: prices captured here
        // are the snapshot the order keeps.
        let lines = sqlx::query_as::<_, CheckoutLine>(
            "SELECT ci.product_id, p.name AS product_name, ci.quantity,
                    COALESCE(p.sale_price, p.price) AS unit_price
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.cart_id = $1
             ORDER BY ci.created_at",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total: Money = lines
            .iter()
            .map(|line| line.unit_price.times(line.quantity))
            .sum();

        let order_number = OrderNumber::generate(chrono::Utc::now().date_naive());

        let inserted = sqlx::query_as::<_, Order>(
            "INSERT INTO orders
                 (user_id, order_number, total_amount, ship_recipient, ship_line1, ship_line2,
                  ship_city, ship_state, ship_postal_code, ship_country, ship_phone)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id, user_id, order_number, status, payment_status, total_amount,
                       ship_recipient, ship_line1, ship_line2, ship_city, ship_state,
                       ship_postal_code, ship_country, ship_phone, created_at, updated_at",
        )
        .bind(user_id)
        .bind(order_number.as_str())
        .bind(total)
        .bind(&shipping.recipient)
        .bind(&shipping.line1)
        .bind(&shipping.line2)
        .bind(&shipping.city)
        .bind(&shipping.state)
        .bind(&shipping.postal_code)
        .bind(&shipping.country)
        .bind(&shipping.phone)
        .fetch_one(&mut *tx)
        .await;

        let order = match inserted {
            Ok(order) => order,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Suffix collision; the aborted transaction rolls back on drop
                tracing::warn!(order_number = %order_number, "Order number collision, retrying");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            // The serialization point: only decrements when enough stock
            // remains, so two checkouts racing for the last unit cannot both
            // succeed.
            let decremented = sqlx::query(
                "UPDATE products SET stock = stock - $2, updated_at = NOW()
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if decremented.rows_affected() == 0 {
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                });
            }

            let item = sqlx::query_as::<_, OrderItem>(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING id, order_id, product_id, product_name, quantity, unit_price",
            )
            .bind(order.id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.quantity)
            .bind(line.unit_price)
            .fetch_one(&mut *tx)
            .await?;
            items.push(item);
        }

        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_number = %order.order_number,
            user_id = %user_id,
            total = %order.total_amount,
            "Order created"
        );

        Ok(Some(OrderView { order, items }))
    }

    /// Cancel an order, restoring stock for every item.
    ///
    /// Only pending, unpaid orders can be cancelled. Returns `false` when
    /// the order was not in a cancellable state (nothing is changed).
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Repository` if a query fails.
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<bool, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        // The status predicate is checked inside the transaction so a
        // concurrent payment webhook cannot race the cancellation.
        let cancelled = sqlx::query(
            "UPDATE orders SET status = 'cancelled', updated_at = NOW()
             WHERE id = $1 AND status = 'pending' AND payment_status <> 'paid'",
        )
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        if cancelled.rows_affected() == 0 {
            return Ok(false);
        }

        restore_stock(&mut tx, order_id).await?;
        tx.commit().await?;

        tracing::info!(order_id = %order_id, "Order cancelled, stock restored");
        Ok(true)
    }
}

/// Give back the stock an order had claimed.
async fn restore_stock(
    tx: &mut Transaction<'_, Postgres>,
    order_id: OrderId,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE products p
         SET stock = p.stock + oi.quantity, updated_at = NOW()
         FROM order_items oi
         WHERE oi.order_id = $1 AND p.id = oi.product_id",
    )
    .bind(order_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_insufficient_stock_names_product() {
        let err = CheckoutError::InsufficientStock {
            product_id: ProductId::new(3),
            product_name: "Walnut Desk".into(),
        };
        assert_eq!(err.to_string(), "insufficient stock for Walnut Desk");
    }

    #[test]
    fn test_snapshot_total_arithmetic() {
        // 2 x 10.00 + 1 x 20.00 = 40.00
        let lines = [
            (2, Money::new(Decimal::new(1000, 2))),
            (1, Money::new(Decimal::new(2000, 2))),
        ];
        let total: Money = lines.iter().map(|(q, p)| p.times(*q)).sum();
        assert_eq!(total.to_string(), "40.00");
    }
}
