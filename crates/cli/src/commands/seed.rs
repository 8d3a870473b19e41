//! Demo catalog seeding.
//!
//! Idempotent: categories are keyed by slug and items by (category, name),
//! so re-running leaves existing rows alone.

use rust_decimal::Decimal;

/// Demo menu: (category slug, category title, items as (name, price, image)).
const DEMO_MENU: &[(&str, &str, &[(&str, &str, Option<&str>)])] = &[
    (
        "momo",
        "Momo",
        &[
            ("Steam Momo", "120.00", Some("/images/steam-momo.jpg")),
            ("Fried Momo", "150.00", Some("/images/fried-momo.jpg")),
            ("Jhol Momo", "160.00", Some("/images/jhol-momo.jpg")),
        ],
    ),
    (
        "chowmein",
        "Chowmein",
        &[
            ("Veg Chowmein", "100.00", Some("/images/veg-chowmein.jpg")),
            ("Chicken Chowmein", "140.00", Some("/images/chicken-chowmein.jpg")),
        ],
    ),
    (
        "drinks",
        "Drinks",
        &[
            ("Lassi", "80.00", Some("/images/lassi.jpg")),
            ("Masala Tea", "40.00", None),
        ],
    ),
];

/// Insert the demo categories and items.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Seeding demo catalog...");

    for (slug, title, items) in DEMO_MENU.iter().copied() {
        sqlx::query("INSERT INTO categories (slug, title) VALUES (?1, ?2) ON CONFLICT(slug) DO NOTHING")
            .bind(slug)
            .bind(title)
            .execute(&pool)
            .await?;

        let category_id: i64 =
            sqlx::query_scalar("SELECT id FROM categories WHERE slug = ?1")
                .bind(slug)
                .fetch_one(&pool)
                .await?;

        for (name, price, image_url) in items.iter().copied() {
            // Guard against re-seeding duplicates by (category, name).
            let exists: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM items WHERE category_id = ?1 AND name = ?2",
            )
            .bind(category_id)
            .bind(name)
            .fetch_optional(&pool)
            .await?;
            if exists.is_some() {
                continue;
            }

            let price: Decimal = price.parse()?;
            sqlx::query(
                "INSERT INTO items (category_id, name, price, image_url) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(category_id)
            .bind(name)
            .bind(price.to_string())
            .bind(image_url)
            .execute(&pool)
            .await?;
        }
    }

    tracing::info!("Demo catalog seeded");

    Ok(())
}
