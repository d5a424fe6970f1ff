//! Seed the menu from a YAML file.
//!
//! ```yaml
//! categories:
//!   - name: Breakfast
//!     items:
//!       - name: Masala Dosa
//!         price: "120.00"
//!       - name: Idli Vada
//!         price: 90
//!         available: false
//!   - name: Beverages
//!     position: 5
//!     items:
//!       - name: Filter Coffee
//!         price: 40.5
//! ```
//!
//! Categories are matched by name and items by name within their category,
//! so running the same file twice leaves the menu unchanged. Positions
//! default to the entry's index in the file. Images are managed from the
//! admin panel and never touched here.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use isra_cafe_admin::db::{MenuRepository, RepositoryError};
use isra_cafe_core::{MenuItemError, MenuItemInput};

use super::{ConnectError, connect};

/// Placeholder category used while validating items offline. Replaced with
/// the real category ID once the category is upserted.
const UNRESOLVED_CATEGORY: &str = "0";

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Menu file is invalid:\n{}", .0.join("\n"))]
    Invalid(Vec<String>),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MenuFile {
    categories: Vec<CategoryEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategoryEntry {
    name: String,
    position: Option<i32>,
    #[serde(default)]
    items: Vec<ItemEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ItemEntry {
    name: String,
    price: PriceValue,
    position: Option<i32>,
    #[serde(default = "default_available")]
    available: bool,
}

const fn default_available() -> bool {
    true
}

/// YAML prices may be written quoted or bare.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Text(String),
    Number(serde_yaml::Number),
}

impl PriceValue {
    fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        }
    }
}

/// A category with its validated items, ready to write.
#[derive(Debug)]
struct SeedCategory {
    name: String,
    position: i32,
    items: Vec<MenuItemInput>,
}

/// Validate every entry, collecting all problems rather than stopping at the
/// first.
fn validate(file: MenuFile) -> Result<Vec<SeedCategory>, SeedError> {
    let mut problems = Vec::new();
    let mut categories = Vec::with_capacity(file.categories.len());

    for (index, category) in (0_i32..).zip(file.categories) {
        let name = category.name.trim().to_owned();
        if name.is_empty() {
            problems.push(format!("category #{}: name is required", index + 1));
        }

        let mut items = Vec::with_capacity(category.items.len());
        for (item_index, item) in (0_i32..).zip(category.items) {
            let position = item.position.unwrap_or(item_index).to_string();
            match MenuItemInput::parse(
                &item.name,
                &item.price.as_text(),
                UNRESOLVED_CATEGORY,
                &position,
                item.available,
            ) {
                Ok(input) => items.push(input),
                Err(e) => problems.push(describe(&name, &item.name, &e)),
            }
        }

        categories.push(SeedCategory {
            name,
            position: category.position.unwrap_or(index),
            items,
        });
    }

    if problems.is_empty() {
        Ok(categories)
    } else {
        Err(SeedError::Invalid(problems))
    }
}

fn describe(category: &str, item: &str, error: &MenuItemError) -> String {
    let item = item.trim();
    if item.is_empty() {
        format!("{category}: unnamed item: {error}")
    } else {
        format!("{category} / {item}: {error}")
    }
}

/// Upsert categories and items from a YAML file.
///
/// The whole file is validated before connecting to the database.
///
/// # Errors
///
/// Returns `SeedError` if the file cannot be read or parsed, any entry is
/// invalid, or a database write fails.
pub async fn menu(file_path: &str) -> Result<(), SeedError> {
    info!(path = %file_path, "Loading menu from file");

    let content = tokio::fs::read_to_string(Path::new(file_path))
        .await
        .map_err(|source| SeedError::Read {
            path: file_path.to_owned(),
            source,
        })?;
    let file: MenuFile = serde_yaml::from_str(&content)?;
    let categories = validate(file)?;

    info!(
        categories = categories.len(),
        items = categories.iter().map(|c| c.items.len()).sum::<usize>(),
        "Menu file is valid"
    );

    let pool = connect().await?;
    let repo = MenuRepository::new(&pool);

    for category in categories {
        let stored = repo
            .upsert_category(&category.name, category.position)
            .await?;

        for mut input in category.items {
            input.category_id = stored.id;
            repo.upsert_item(&input).await?;
        }

        info!(category = %stored.name, id = %stored.id, "Seeded category");
    }

    info!("Menu seeding complete!");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn parse(yaml: &str) -> Result<Vec<SeedCategory>, SeedError> {
        validate(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn test_quoted_and_bare_prices() {
        let categories = parse(
            r#"
categories:
  - name: Breakfast
    items:
      - name: Masala Dosa
        price: "120.00"
      - name: Idli Vada
        price: 90
      - name: Filter Coffee
        price: 40.5
"#,
        )
        .unwrap();

        let prices: Vec<Decimal> = categories[0].items.iter().map(|i| i.price).collect();
        assert_eq!(
            prices,
            vec![Decimal::new(12000, 2), Decimal::new(90, 0), Decimal::new(405, 1)]
        );
    }

    #[test]
    fn test_positions_default_to_index() {
        let categories = parse(
            r"
categories:
  - name: Breakfast
    items:
      - name: Dosa
        price: 100
      - name: Upma
        price: 60
        position: 9
  - name: Beverages
    position: 7
    items: []
",
        )
        .unwrap();

        assert_eq!(categories[0].position, 0);
        assert_eq!(categories[1].position, 7);
        assert_eq!(categories[0].items[0].position, 0);
        assert_eq!(categories[0].items[1].position, 9);
    }

    #[test]
    fn test_availability_defaults_to_true() {
        let categories = parse(
            r"
categories:
  - name: Snacks
    items:
      - name: Samosa
        price: 25
      - name: Pakora
        price: 30
        available: false
",
        )
        .unwrap();

        assert!(categories[0].items[0].is_available);
        assert!(!categories[0].items[1].is_available);
    }

    #[test]
    fn test_collects_every_problem() {
        let err = parse(
            r#"
categories:
  - name: ""
    items:
      - name: Dosa
        price: "12.345"
      - name: ""
        price: 10
"#,
        )
        .unwrap_err();

        let SeedError::Invalid(problems) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(problems.len(), 3);
        assert!(problems[0].contains("name is required"));
        assert!(problems[1].contains("Dosa"));
        assert!(problems[2].contains("unnamed item"));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let result: Result<MenuFile, _> = serde_yaml::from_str(
            r"
categories:
  - name: Snacks
    items:
      - name: Samosa
        price: 25
        colour: gold
",
        );
        assert!(result.is_err());
    }
}
