//! Product feed entries pulled from a remote catalog API.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use validator::ValidateUrl;

use crate::domain::category::NewCategory;
use crate::domain::money::{MONEY_SCALE, max_amount};
use crate::domain::product::NewProduct;
use crate::forms::{sanitize_inline_text, sanitize_multiline_text};

const NAME_MAX_CHARS: usize = 255;

#[derive(Debug, Error, PartialEq)]
pub enum CatalogEntryError {
    #[error("malformed entry: {0}")]
    Malformed(String),
    #[error("product {0} has no title")]
    EmptyTitle(i32),
    #[error("product {id} has an unusable price {price}")]
    InvalidPrice { id: i32, price: Decimal },
    #[error("category {0} has no name")]
    EmptyCategoryName(i32),
    #[error("category {0} has no valid image URL")]
    InvalidCategoryImage(i32),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCategory {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub image: String,
}

/// One product of the remote feed, embedding its category.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteProduct {
    pub id: i32,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: RemoteCategory,
}

/// Records to upsert for one feed entry, keyed by the remote ids.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub category_id: i32,
    pub category: NewCategory,
    pub product_id: i32,
    pub product: NewProduct,
}

fn truncate(value: String) -> String {
    if value.chars().count() > NAME_MAX_CHARS {
        value.chars().take(NAME_MAX_CHARS).collect()
    } else {
        value
    }
}

/// Feeds sometimes wrap URLs in JSON array debris like `["https://..."]`.
fn clean_image(raw: &str) -> Option<String> {
    let url = raw
        .trim()
        .trim_matches(|ch| matches!(ch, '[' | ']' | '"'))
        .trim();

    url.validate_url().then(|| url.to_string())
}

impl CatalogEntry {
    /// Parse and clean one raw feed item.
    pub fn from_value(value: Value) -> Result<Self, CatalogEntryError> {
        serde_json::from_value::<RemoteProduct>(value)
            .map_err(|err| CatalogEntryError::Malformed(err.to_string()))?
            .into_entry()
    }
}

impl RemoteProduct {
    pub fn into_entry(self) -> Result<CatalogEntry, CatalogEntryError> {
        let category_name = truncate(sanitize_inline_text(&self.category.name));
        if category_name.is_empty() {
            return Err(CatalogEntryError::EmptyCategoryName(self.category.id));
        }

        let category_image = clean_image(&self.category.image)
            .ok_or(CatalogEntryError::InvalidCategoryImage(self.category.id))?;

        let title = truncate(sanitize_inline_text(&self.title));
        if title.is_empty() {
            return Err(CatalogEntryError::EmptyTitle(self.id));
        }

        let price = self.price.round_dp(MONEY_SCALE);
        if price.is_sign_negative() || price > max_amount() {
            return Err(CatalogEntryError::InvalidPrice {
                id: self.id,
                price: self.price,
            });
        }

        let images = self
            .images
            .iter()
            .filter_map(|image| clean_image(image))
            .collect();

        let product = NewProduct::new(self.category.id, title.clone(), price)
            .with_title(title)
            .with_description(sanitize_multiline_text(&self.description))
            .with_images(images);

        Ok(CatalogEntry {
            category_id: self.category.id,
            category: NewCategory::new(category_name, category_image),
            product_id: self.id,
            product,
        })
    }
}
