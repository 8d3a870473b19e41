//! Khaja server library.
//!
//! The food-ordering web application: catalog browsing, order placement with
//! cash-on-delivery / Khalti wallet / Stripe checkout payment paths, order
//! tracking, and admin-gated menu and order management.
//!
//! # Architecture
//!
//! - Axum web framework serving a JSON API
//! - `SQLite` via sqlx for the single persistence store
//! - Khalti wallet verification and Stripe checkout sessions over reqwest
//! - Best-effort WhatsApp order confirmations with bounded retry
//!
//! The interesting logic lives in [`services::orders`]: the order placement
//! workflow (validation, payment verification, contact snapshot resolution,
//! transactional persistence, detached notification) and the forward-only
//! status state machine.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
