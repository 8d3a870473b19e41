//! Catalog repository.
//!
//! Categories and menu items. Orders snapshot prices at checkout, so edits
//! and deletions here never touch historical orders.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use khaja_core::{CategoryId, ItemId};

use super::RepositoryError;
use crate::models::catalog::{Category, Item, MenuItem};

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: i64,
    name: String,
    price: String,
    image_url: Option<String>,
    category_id: i64,
    category_slug: String,
    category_title: String,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = RepositoryError;

    fn try_from(row: MenuItemRow) -> Result<Self, Self::Error> {
        let price: Decimal = row.price.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid decimal in items.price: {e}"))
        })?;

        Ok(Self {
            id: ItemId::new(row.id),
            name: row.name,
            price,
            image_url: row.image_url,
            category_id: CategoryId::new(row.category_id),
            category_slug: row.category_slug,
            category_title: row.category_title,
        })
    }
}

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct CategoryRow {
            id: i64,
            slug: String,
            title: String,
        }

        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, slug, title FROM categories ORDER BY id")
                .fetch_all(self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: CategoryId::new(r.id),
                slug: r.slug,
                title: r.title,
            })
            .collect())
    }

    /// List all menu items joined with their category, ordered by category
    /// then item id (the menu screen's display order).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` for unparsable stored prices.
    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows: Vec<MenuItemRow> = sqlx::query_as(
            "SELECT i.id, i.name, i.price, i.image_url, \
                    c.id AS category_id, c.slug AS category_slug, c.title AS category_title \
             FROM items i \
             JOIN categories c ON i.category_id = c.id \
             ORDER BY c.id, i.id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(MenuItem::try_from).collect()
    }

    /// Insert a menu item and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// missing category, surfaced as a foreign-key violation).
    pub async fn create_item(
        &self,
        category_id: CategoryId,
        name: &str,
        price: Decimal,
        image_url: Option<&str>,
    ) -> Result<Item, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO items (category_id, name, price, image_url) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(category_id.as_i64())
        .bind(name)
        .bind(price.to_string())
        .bind(image_url)
        .execute(self.pool)
        .await?;

        Ok(Item {
            id: ItemId::new(result.last_insert_rowid()),
            category_id,
            name: name.to_owned(),
            price,
            image_url: image_url.map(ToOwned::to_owned),
        })
    }

    /// Update a menu item's name, price, and image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this id.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_item(
        &self,
        id: ItemId,
        name: &str,
        price: Decimal,
        image_url: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE items SET name = ?1, price = ?2, image_url = ?3 WHERE id = ?4",
        )
        .bind(name)
        .bind(price.to_string())
        .bind(image_url)
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a menu item. Historical order lines keep their snapshot and
    /// simply lose the catalog reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no item has this id.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_item(&self, id: ItemId) -> Result<(), RepositoryError> {
        // Detach order lines first so the snapshot survives the delete.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE order_items SET item_id = NULL WHERE item_id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}
