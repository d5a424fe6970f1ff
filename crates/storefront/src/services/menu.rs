//! Cached menu reads.
//!
//! Every page view reads the whole menu, and the menu only changes when an
//! admin edits it, so the available menu is cached in-process for a short TTL.
//! Edits show up on the storefront once the entry expires.

use std::sync::Arc;
use std::time::Duration;

use isra_cafe_core::{CategoryWithItems, MenuItem, MenuItemId};
use moka::future::Cache;
use sqlx::PgPool;

use crate::db::{MenuRepository, RepositoryError};

/// How long a cached menu is served before it is read again.
pub const MENU_TTL: Duration = Duration::from_secs(60);

const MENU_KEY: &str = "available_menu";

/// Shared, cached view of the available menu.
#[derive(Clone)]
pub struct MenuCatalog {
    cache: Cache<&'static str, Arc<Vec<CategoryWithItems>>>,
}

impl MenuCatalog {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { cache }
    }

    /// Categories with available items, from cache when fresh.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the menu has to be read and the read fails.
    pub async fn available_menu(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<CategoryWithItems>>, RepositoryError> {
        if let Some(menu) = self.cache.get(MENU_KEY).await {
            return Ok(menu);
        }

        let menu = Arc::new(MenuRepository::new(pool).available_menu().await?);
        tracing::debug!(categories = menu.len(), "Menu cache refreshed");
        self.cache.insert(MENU_KEY, Arc::clone(&menu)).await;
        Ok(menu)
    }

    /// Look up an item on the available menu.
    ///
    /// Returns `None` for unknown or unavailable items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the menu has to be read and the read fails.
    pub async fn find_available_item(
        &self,
        pool: &PgPool,
        id: MenuItemId,
    ) -> Result<Option<MenuItem>, RepositoryError> {
        let menu = self.available_menu(pool).await?;
        Ok(menu
            .iter()
            .flat_map(|category| &category.items)
            .find(|item| item.id == id)
            .cloned())
    }

    /// Replace the cached menu.
    pub async fn prime(&self, menu: Vec<CategoryWithItems>) {
        self.cache.insert(MENU_KEY, Arc::new(menu)).await;
    }
}

impl Default for MenuCatalog {
    fn default() -> Self {
        Self::new(MENU_TTL)
    }
}
