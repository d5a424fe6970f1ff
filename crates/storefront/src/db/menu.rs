//! Menu repository (read-only).

use rust_decimal::Decimal;
use sqlx::PgPool;

use isra_cafe_core::{Category, CategoryId, CategoryWithItems, MenuItem, MenuItemId};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i32,
    name: String,
    position: i32,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            position: row.position,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: i32,
    category_id: i32,
    name: String,
    price: Decimal,
    image_key: Option<String>,
    position: i32,
    is_available: bool,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: MenuItemId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            price: row.price,
            image_key: row.image_key,
            position: row.position,
            is_available: row.is_available,
        }
    }
}

/// Repository for menu reads.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Categories that have at least one available item, each with its
    /// available items. Both levels are ordered by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn available_menu(&self) -> Result<Vec<CategoryWithItems>, RepositoryError> {
        let categories = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, position
            FROM category
            ORDER BY position, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let items = sqlx::query_as::<_, MenuItemRow>(
            r"
            SELECT id, category_id, name, price, image_key, position, is_available
            FROM menu_item
            WHERE is_available
            ORDER BY position, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let menu = CategoryWithItems::group(
            categories.into_iter().map(Category::from).collect(),
            items.into_iter().map(MenuItem::from).collect(),
        );
        Ok(menu.into_iter().filter(|c| !c.items.is_empty()).collect())
    }

    /// Get the current state of several menu items at once.
    ///
    /// Missing ids are simply absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_items(&self, ids: &[MenuItemId]) -> Result<Vec<MenuItem>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(MenuItemId::as_i32).collect();
        let rows = sqlx::query_as::<_, MenuItemRow>(
            r"
            SELECT id, category_id, name, price, image_key, position, is_available
            FROM menu_item
            WHERE id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }
}
