//! Menu repository: categories and full item CRUD.
//!
//! Unlike the storefront's read path, these queries include unavailable
//! items so they can be edited and switched back on.

use rust_decimal::Decimal;
use sqlx::PgPool;

use isra_cafe_core::{Category, CategoryId, MenuItem, MenuItemId, MenuItemInput};

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

/// Repository for menu management.
pub struct MenuRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuRepository<'a> {
    /// Create a new menu repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories, by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT id, name, position
            FROM category
            ORDER BY position, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Insert a category or update the position of an existing one with the
    /// same name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_category(
        &self,
        name: &str,
        position: i32,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO category (name, position)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET position = EXCLUDED.position
            RETURNING id, name, position
            ",
        )
        .bind(name)
        .bind(position)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Every menu item, available or not, by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_items(&self) -> Result<Vec<MenuItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, MenuItemRow>(
            r"
            SELECT id, category_id, name, price, image_key, position, is_available
            FROM menu_item
            ORDER BY position, id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    /// Get a menu item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r"
            SELECT id, category_id, name, price, image_key, position, is_available
            FROM menu_item
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(MenuItem::from))
    }

    /// Create a menu item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category does not exist or
    /// already has an item with this name.
    pub async fn create_item(
        &self,
        input: &MenuItemInput,
        image_key: Option<&str>,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r"
            INSERT INTO menu_item (category_id, name, price, image_key, position, is_available)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, category_id, name, price, image_key, position, is_available
            ",
        )
        .bind(input.category_id.as_i32())
        .bind(&input.name)
        .bind(input.price)
        .bind(image_key)
        .bind(input.position)
        .bind(input.is_available)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu item"))?;

        Ok(row.into())
    }

    /// Update a menu item. The image key is replaced only when `image_key`
    /// is `Some`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    /// Returns `RepositoryError::Conflict` on a duplicate name or unknown
    /// category.
    pub async fn update_item(
        &self,
        id: MenuItemId,
        input: &MenuItemInput,
        image_key: Option<&str>,
    ) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r"
            UPDATE menu_item
            SET category_id = $2,
                name = $3,
                price = $4,
                image_key = COALESCE($5, image_key),
                position = $6,
                is_available = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, category_id, name, price, image_key, position, is_available
            ",
        )
        .bind(id.as_i32())
        .bind(input.category_id.as_i32())
        .bind(&input.name)
        .bind(input.price)
        .bind(image_key)
        .bind(input.position)
        .bind(input.is_available)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "menu item"))?;

        row.map(MenuItem::from).ok_or(RepositoryError::NotFound)
    }

    /// Insert an item, or update the item with the same name in the same
    /// category. Images are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert_item(&self, input: &MenuItemInput) -> Result<MenuItem, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r"
            INSERT INTO menu_item (category_id, name, price, position, is_available)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (category_id, name) DO UPDATE
            SET price = EXCLUDED.price,
                position = EXCLUDED.position,
                is_available = EXCLUDED.is_available,
                updated_at = NOW()
            RETURNING id, category_id, name, price, image_key, position, is_available
            ",
        )
        .bind(input.category_id.as_i32())
        .bind(&input.name)
        .bind(input.price)
        .bind(input.position)
        .bind(input.is_available)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Delete a menu item, returning the deleted row.
    ///
    /// Past order lines keep their name and price; their item reference is
    /// set to `NULL`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_item(&self, id: MenuItemId) -> Result<Option<MenuItem>, RepositoryError> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r"
            DELETE FROM menu_item
            WHERE id = $1
            RETURNING id, category_id, name, price, image_key, position, is_available
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(MenuItem::from))
    }
}
