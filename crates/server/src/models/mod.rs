//! Domain models shared between repositories, services, and routes.

pub mod catalog;
pub mod order;
pub mod user;

pub use catalog::{Category, Item, MenuItem};
pub use order::{NewOrder, NewOrderItem, Order, OrderItem};
pub use user::{User, UserProfile};
