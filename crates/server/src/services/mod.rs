//! Business logic and external provider clients.

pub mod auth;
pub mod checkout;
pub mod notifications;
pub mod orders;
pub mod payments;
