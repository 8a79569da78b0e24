//! Domain models.
//!
//! Row types decoded straight from Postgres (`sqlx::FromRow`) plus the
//! response shapes built from them.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;
pub mod user;

pub use address::Address;
pub use cart::{Cart, CartItem, CartLine, CartView};
pub use catalog::{
    Banner, Brand, Category, CategoryNode, Coupon, Product, ProductSummary, build_category_tree,
};
pub use order::{Order, OrderItem, OrderView, ShippingAddress};
pub use review::Review;
pub use user::{AuthTokenKind, CurrentUser, User};
