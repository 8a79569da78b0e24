//! Business-logic services.
//!
//! Services own multi-step operations and transactions; route handlers stay
//! thin and translate between HTTP and these calls.

pub mod auth;
pub mod checkout;
pub mod email;
pub mod payments;
