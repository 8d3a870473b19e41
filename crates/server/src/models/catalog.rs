//! Menu catalog models.

use rust_decimal::Decimal;
use serde::Serialize;

use khaja_core::{CategoryId, ItemId};

/// A menu category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub slug: String,
    pub title: String,
}

/// A catalog item as stored.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: ItemId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

/// A catalog item joined with its category, as served to the menu screen.
#[derive(Debug, Clone, Serialize)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub category_slug: String,
    pub category_title: String,
}
