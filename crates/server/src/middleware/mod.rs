//! Request extractors and guards.

pub mod auth;

pub use auth::RequireAdmin;
