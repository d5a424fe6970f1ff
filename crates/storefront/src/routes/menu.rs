//! Menu page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use isra_cafe_core::{Cart, CategoryWithItems, MenuItem, Price};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::middleware::RequireCustomer;
use crate::services::load_cart;
use crate::state::AppState;

/// Query parameters for the menu page.
#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Category tab display data.
pub struct CategoryTabView {
    pub id: i32,
    pub name: String,
    pub selected: bool,
}

/// Menu item display data.
pub struct MenuItemView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub image_url: Option<String>,
    /// Units of this item already in the cart.
    pub quantity: u32,
}

impl MenuItemView {
    fn new(item: &MenuItem, cart: &Cart, config: &StorefrontConfig) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            price: Price::inr(item.price).display(),
            image_url: item.image_key.as_deref().map(|key| config.media_url(key)),
            quantity: cart.quantity(item.id),
        }
    }
}

/// Menu page template.
#[derive(Template, WebTemplate)]
#[template(path = "menu.html")]
pub struct MenuTemplate {
    pub customer_name: String,
    pub cart_count: u32,
    pub categories: Vec<CategoryTabView>,
    pub items: Vec<MenuItemView>,
    /// Path cart forms return to, keeping the selected category.
    pub return_to: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Pick the requested category, defaulting to the first one.
fn select_category<'a>(
    menu: &'a [CategoryWithItems],
    requested: Option<&str>,
) -> Option<&'a CategoryWithItems> {
    requested
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .and_then(|id| menu.iter().find(|c| c.category.id.as_i32() == id))
        .or_else(|| menu.first())
}

/// Display the menu.
///
/// GET /menu?category=ID
#[instrument(skip(state, session, customer))]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Query(query): Query<MenuQuery>,
) -> Result<MenuTemplate> {
    let cart = load_cart(&session).await?;
    let mut error = query.error;

    let menu = match state.menu().available_menu(state.pool()).await {
        Ok(menu) => menu,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load menu");
            error.get_or_insert_with(|| "Could not load the menu. Please try again.".to_owned());
            std::sync::Arc::default()
        }
    };

    let selected = select_category(&menu, query.category.as_deref());
    let categories = menu
        .iter()
        .map(|c| CategoryTabView {
            id: c.category.id.as_i32(),
            name: c.category.name.clone(),
            selected: selected.is_some_and(|s| s.category.id == c.category.id),
        })
        .collect();
    let items = selected
        .map(|c| {
            c.items
                .iter()
                .map(|item| MenuItemView::new(item, cart.cart(), state.config()))
                .collect()
        })
        .unwrap_or_default();
    let return_to = selected.map_or_else(
        || "/menu".to_owned(),
        |c| format!("/menu?category={}", c.category.id),
    );

    Ok(MenuTemplate {
        customer_name: customer.name.to_string(),
        cart_count: cart.cart().item_count(),
        categories,
        items,
        return_to,
        error,
        success: query.success,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use isra_cafe_core::{Category, CategoryId};

    use super::*;

    fn menu() -> Vec<CategoryWithItems> {
        [(4, "Beverages"), (2, "Snacks")]
            .into_iter()
            .map(|(id, name)| CategoryWithItems {
                category: Category {
                    id: CategoryId::new(id),
                    name: name.to_owned(),
                    position: id,
                },
                items: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn test_select_category_defaults_to_first() {
        let menu = menu();
        assert_eq!(select_category(&menu, None).unwrap().category.name, "Beverages");
        assert_eq!(select_category(&menu, Some("abc")).unwrap().category.name, "Beverages");
        assert_eq!(select_category(&menu, Some("99")).unwrap().category.name, "Beverages");
    }

    #[test]
    fn test_select_category_by_id() {
        let menu = menu();
        assert_eq!(select_category(&menu, Some("2")).unwrap().category.name, "Snacks");
        assert!(select_category(&[], Some("2")).is_none());
    }
}
