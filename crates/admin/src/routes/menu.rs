//! Menu management route handlers.
//!
//! Item forms are submitted as `multipart/form-data` because they carry the
//! item image. Text fields are validated through [`MenuItemInput::parse`]
//! before anything touches the media store or the database.

use askama::Template;
use axum::{
    Router,
    body::Bytes,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::instrument;

use isra_cafe_core::{Category, CategoryWithItems, MenuItem, MenuItemId, MenuItemInput, Price};

use super::{AdminView, MessageQuery, redirect_with_error, redirect_with_success, render};
use crate::config::AdminConfig;
use crate::db::{MenuRepository, RepositoryError};
use crate::middleware::RequireAdminAuth;
use crate::services::MediaStore;
use crate::state::AppState;

const MENU_PATH: &str = "/menu";
const NEW_PATH: &str = "/menu/new";

/// Build the menu router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(MENU_PATH, get(index).post(create))
        .route(NEW_PATH, get(new))
        .route("/menu/{id}", post(update))
        .route("/menu/{id}/edit", get(edit))
        .route("/menu/{id}/delete", post(delete))
}

// =============================================================================
// Views
// =============================================================================

/// Menu item row in the admin list.
#[derive(Debug, Clone)]
pub struct AdminMenuItemView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub position: i32,
    pub is_available: bool,
    pub image_url: Option<String>,
}

impl AdminMenuItemView {
    fn new(item: &MenuItem, config: &AdminConfig) -> Self {
        Self {
            id: item.id.as_i32(),
            name: item.name.clone(),
            price: Price::inr(item.price).display(),
            position: item.position,
            is_available: item.is_available,
            image_url: item.image_key.as_deref().map(|key| config.media_url(key)),
        }
    }
}

/// A category heading with its items.
#[derive(Debug, Clone)]
pub struct MenuGroupView {
    pub name: String,
    pub items: Vec<AdminMenuItemView>,
}

/// Category dropdown option.
#[derive(Debug, Clone)]
pub struct CategoryOptionView {
    pub id: i32,
    pub name: String,
    pub selected: bool,
}

fn category_options(categories: &[Category], selected: Option<i32>) -> Vec<CategoryOptionView> {
    categories
        .iter()
        .map(|category| CategoryOptionView {
            id: category.id.as_i32(),
            name: category.name.clone(),
            selected: Some(category.id.as_i32()) == selected,
        })
        .collect()
}

/// Menu list template.
#[derive(Template)]
#[template(path = "menu/index.html")]
pub struct MenuIndexTemplate {
    pub admin_user: AdminView,
    pub current_path: String,
    pub groups: Vec<MenuGroupView>,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Create/edit form template.
#[derive(Template)]
#[template(path = "menu/form.html")]
pub struct MenuFormTemplate {
    pub admin_user: AdminView,
    pub current_path: String,
    pub title: String,
    pub action: String,
    pub categories: Vec<CategoryOptionView>,
    pub name: String,
    pub price: String,
    pub position: String,
    pub is_available: bool,
    pub image_url: Option<String>,
    pub image_required: bool,
    pub max_image_mb: usize,
    pub error: Option<String>,
}

// =============================================================================
// Multipart form
// =============================================================================

/// Raw fields of a submitted item form.
#[derive(Debug, Default)]
pub struct MenuItemUpload {
    pub name: String,
    pub price: String,
    pub category_id: String,
    pub position: String,
    pub is_available: bool,
    /// `None` when no file was chosen.
    pub image: Option<Bytes>,
}

impl MenuItemUpload {
    /// Read every field of the form. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MultipartError` if the body is malformed or exceeds the
    /// request body limit.
    pub async fn read(mut multipart: Multipart) -> Result<Self, MultipartError> {
        let mut upload = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            match name.as_str() {
                "name" => upload.name = field.text().await?,
                "price" => upload.price = field.text().await?,
                "category_id" => upload.category_id = field.text().await?,
                "position" => upload.position = field.text().await?,
                "is_available" => upload.is_available = !field.text().await?.is_empty(),
                "image" => {
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file is chosen
                    upload.image = (!bytes.is_empty()).then_some(bytes);
                }
                _ => {}
            }
        }

        Ok(upload)
    }

    /// Validate the text fields.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn input(&self) -> Result<MenuItemInput, isra_cafe_core::MenuItemError> {
        MenuItemInput::parse(
            &self.name,
            &self.price,
            &self.category_id,
            &self.position,
            self.is_available,
        )
    }
}

/// User-facing message for an unreadable form.
fn upload_error_message(error: &MultipartError, max_bytes: usize) -> String {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        format!("Image must be at most {} MB", max_bytes.div_ceil(1024 * 1024))
    } else {
        "Could not read the submitted form".to_owned()
    }
}

/// Message for a create/update rejected by a constraint.
const CONFLICT_MESSAGE: &str =
    "An item with that name already exists in this category, or the category does not exist";

/// Remove an image that is no longer referenced. Failures only leave an
/// orphaned file behind, so they are logged and otherwise ignored.
async fn discard_image(media: &MediaStore, key: &str) {
    if let Err(e) = media.delete(key).await {
        tracing::warn!(error = %e, key = %key, "Failed to delete menu image");
    }
}

/// Store an uploaded image, mapping failures to a redirect.
async fn store_image(
    media: &MediaStore,
    image: &[u8],
    back_to: &str,
) -> Result<String, Response> {
    match media.save_menu_image(image).await {
        Ok(key) => Ok(key),
        Err(e) if e.is_client_error() => {
            Err(redirect_with_error(back_to, &e.to_string()).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to store menu image");
            Err(redirect_with_error(back_to, "Could not store the image").into_response())
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Every item, grouped by category, including unavailable ones.
///
/// GET /menu
#[instrument(skip(admin, state))]
async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Response {
    let repo = MenuRepository::new(state.pool());
    let mut error = query.error;

    let groups = match (repo.list_categories().await, repo.list_items().await) {
        (Ok(categories), Ok(items)) => CategoryWithItems::group(categories, items)
            .into_iter()
            .map(|group| MenuGroupView {
                name: group.category.name,
                items: group
                    .items
                    .iter()
                    .map(|item| AdminMenuItemView::new(item, state.config()))
                    .collect(),
            })
            .collect(),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, "Failed to load menu");
            error = Some("The menu is unavailable right now".to_owned());
            Vec::new()
        }
    };

    render(&MenuIndexTemplate {
        admin_user: AdminView::from(&admin),
        current_path: MENU_PATH.to_owned(),
        groups,
        error,
        success: query.success,
    })
}

/// Blank item form.
///
/// GET /menu/new
#[instrument(skip(admin, state))]
async fn new(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Response {
    let categories = match MenuRepository::new(state.pool()).list_categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load categories");
            return redirect_with_error(MENU_PATH, "Categories are unavailable right now")
                .into_response();
        }
    };

    render(&MenuFormTemplate {
        admin_user: AdminView::from(&admin),
        current_path: MENU_PATH.to_owned(),
        title: "New menu item".to_owned(),
        action: MENU_PATH.to_owned(),
        categories: category_options(&categories, None),
        name: String::new(),
        price: String::new(),
        position: "0".to_owned(),
        is_available: true,
        image_url: None,
        image_required: true,
        max_image_mb: state.media().max_bytes().div_ceil(1024 * 1024),
        error: query.error,
    })
}

/// Create an item. The image is required.
///
/// POST /menu
#[instrument(skip(admin, state, multipart))]
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Response {
    let media = state.media();

    let upload = match MenuItemUpload::read(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable menu item form");
            return redirect_with_error(NEW_PATH, &upload_error_message(&e, media.max_bytes()))
                .into_response();
        }
    };

    let input = match upload.input() {
        Ok(input) => input,
        Err(e) => return redirect_with_error(NEW_PATH, &e.to_string()).into_response(),
    };

    let Some(image) = upload.image.as_deref() else {
        return redirect_with_error(NEW_PATH, "Image is required").into_response();
    };

    let key = match store_image(media, image, NEW_PATH).await {
        Ok(key) => key,
        Err(response) => return response,
    };

    match MenuRepository::new(state.pool())
        .create_item(&input, Some(&key))
        .await
    {
        Ok(item) => {
            tracing::info!(item_id = %item.id, admin_id = %admin.id, "Menu item created");
            redirect_with_success(MENU_PATH, &format!("Added {}", item.name)).into_response()
        }
        Err(e) => {
            discard_image(media, &key).await;
            if let RepositoryError::Conflict(_) = e {
                return redirect_with_error(NEW_PATH, CONFLICT_MESSAGE).into_response();
            }
            tracing::error!(error = %e, "Failed to create menu item");
            redirect_with_error(NEW_PATH, "Could not save the item").into_response()
        }
    }
}

/// Form prefilled with an existing item.
///
/// GET /menu/{id}/edit
#[instrument(skip(admin, state))]
async fn edit(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<MessageQuery>,
) -> Response {
    let repo = MenuRepository::new(state.pool());

    let lookup = (
        repo.get_item(MenuItemId::new(id)).await,
        repo.list_categories().await,
    );
    let (item, categories) = match lookup {
        (Ok(Some(item)), Ok(categories)) => (item, categories),
        (Ok(None), _) => {
            return redirect_with_error(MENU_PATH, "That item no longer exists").into_response();
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!(error = %e, item_id = id, "Failed to load menu item");
            return redirect_with_error(MENU_PATH, "The item is unavailable right now")
                .into_response();
        }
    };

    render(&MenuFormTemplate {
        admin_user: AdminView::from(&admin),
        current_path: MENU_PATH.to_owned(),
        title: format!("Edit {}", item.name),
        action: format!("/menu/{}", item.id),
        categories: category_options(&categories, Some(item.category_id.as_i32())),
        name: item.name.clone(),
        price: item.price.to_string(),
        position: item.position.to_string(),
        is_available: item.is_available,
        image_url: item
            .image_key
            .as_deref()
            .map(|key| state.config().media_url(key)),
        image_required: false,
        max_image_mb: state.media().max_bytes().div_ceil(1024 * 1024),
        error: query.error,
    })
}

/// Update an item. A new image replaces the old one, which is then deleted.
///
/// POST /menu/{id}
#[instrument(skip(admin, state, multipart))]
async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Response {
    let media = state.media();
    let item_id = MenuItemId::new(id);
    let edit_path = format!("/menu/{item_id}/edit");

    let upload = match MenuItemUpload::read(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable menu item form");
            return redirect_with_error(&edit_path, &upload_error_message(&e, media.max_bytes()))
                .into_response();
        }
    };

    let input = match upload.input() {
        Ok(input) => input,
        Err(e) => return redirect_with_error(&edit_path, &e.to_string()).into_response(),
    };

    let repo = MenuRepository::new(state.pool());
    let existing = match repo.get_item(item_id).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return redirect_with_error(MENU_PATH, "That item no longer exists").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, item_id = %item_id, "Failed to load menu item");
            return redirect_with_error(&edit_path, "Could not save the item").into_response();
        }
    };

    let new_key = match upload.image.as_deref() {
        Some(image) => match store_image(media, image, &edit_path).await {
            Ok(key) => Some(key),
            Err(response) => return response,
        },
        None => None,
    };

    match repo.update_item(item_id, &input, new_key.as_deref()).await {
        Ok(item) => {
            if new_key.is_some()
                && let Some(old_key) = existing.image_key.as_deref()
            {
                discard_image(media, old_key).await;
            }
            tracing::info!(item_id = %item.id, admin_id = %admin.id, "Menu item updated");
            redirect_with_success(MENU_PATH, &format!("Updated {}", item.name)).into_response()
        }
        Err(e) => {
            if let Some(key) = new_key.as_deref() {
                discard_image(media, key).await;
            }
            match e {
                RepositoryError::NotFound => {
                    redirect_with_error(MENU_PATH, "That item no longer exists").into_response()
                }
                RepositoryError::Conflict(_) => {
                    redirect_with_error(&edit_path, CONFLICT_MESSAGE).into_response()
                }
                other => {
                    tracing::error!(error = %other, item_id = %item_id, "Failed to update menu item");
                    redirect_with_error(&edit_path, "Could not save the item").into_response()
                }
            }
        }
    }
}

/// Delete an item, then its image.
///
/// Past orders keep their copy of the item's name and price.
///
/// POST /menu/{id}/delete
#[instrument(skip(admin, state))]
async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Response {
    match MenuRepository::new(state.pool())
        .delete_item(MenuItemId::new(id))
        .await
    {
        Ok(Some(item)) => {
            if let Some(key) = item.image_key.as_deref() {
                discard_image(state.media(), key).await;
            }
            tracing::info!(item_id = %item.id, admin_id = %admin.id, "Menu item deleted");
            redirect_with_success(MENU_PATH, &format!("Deleted {}", item.name)).into_response()
        }
        Ok(None) => redirect_with_error(MENU_PATH, "That item no longer exists").into_response(),
        Err(e) => {
            tracing::error!(error = %e, item_id = id, "Failed to delete menu item");
            redirect_with_error(MENU_PATH, "Could not delete the item").into_response()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use isra_cafe_core::{CategoryId, MenuItemError};
    use rust_decimal::Decimal;

    use super::*;

    fn upload() -> MenuItemUpload {
        MenuItemUpload {
            name: "Filter Coffee".to_string(),
            price: "40.00".to_string(),
            category_id: "2".to_string(),
            position: "1".to_string(),
            is_available: true,
            image: None,
        }
    }

    #[test]
    fn test_upload_input_parses_fields() {
        let input = upload().input().unwrap();
        assert_eq!(input.name, "Filter Coffee");
        assert_eq!(input.price, Decimal::new(4000, 2));
        assert_eq!(input.category_id, CategoryId::new(2));
        assert_eq!(input.position, 1);
        assert!(input.is_available);
    }

    #[test]
    fn test_upload_input_rejects_three_decimal_places() {
        let upload = MenuItemUpload {
            price: "40.005".to_string(),
            ..upload()
        };
        assert_eq!(upload.input().unwrap_err(), MenuItemError::InvalidPrice);
    }

    #[test]
    fn test_category_options_mark_selection() {
        let categories = vec![
            Category {
                id: CategoryId::new(1),
                name: "Breakfast".to_string(),
                position: 0,
            },
            Category {
                id: CategoryId::new(2),
                name: "Drinks".to_string(),
                position: 1,
            },
        ];

        let options = category_options(&categories, Some(2));
        assert!(!options.first().unwrap().selected);
        assert!(options.get(1).unwrap().selected);

        assert!(category_options(&categories, None).iter().all(|o| !o.selected));
    }
}
