use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::pagination::Pagination;

/// Title given to products created without one.
pub const DEFAULT_PRODUCT_TITLE: &str = "Default Title";

/// Largest stock level a product may carry.
pub const MAX_STOCK: i64 = 1_000_000_000;

/// Domain representation of a sellable product.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Product {
    /// Unique identifier of the product.
    pub id: i32,
    /// Category the product is listed under.
    pub category_id: i32,
    /// Marketing title shown in listings.
    pub title: String,
    /// Product name.
    pub name: String,
    /// Current unit price.
    pub price: Decimal,
    /// Long-form description.
    pub description: String,
    /// Units available for sale.
    pub stock: i64,
    /// Ordered list of image URLs, the first one being the cover.
    pub images: Vec<String>,
    /// Timestamp for when the product record was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last update to the product record.
    pub updated_at: NaiveDateTime,
}

/// Payload required to insert a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: i32,
    pub title: String,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub stock: i64,
    pub images: Vec<String>,
    /// Timestamp captured when the product payload was created.
    pub updated_at: NaiveDateTime,
}

impl NewProduct {
    /// Build a product payload with an empty description, no stock and no images.
    pub fn new(category_id: i32, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            category_id,
            title: DEFAULT_PRODUCT_TITLE.to_string(),
            name: name.into(),
            price,
            description: String::new(),
            stock: 0,
            images: Vec::new(),
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

/// Patch data applied when updating an existing product. `None` leaves the
/// stored value untouched.
#[derive(Debug, Clone)]
pub struct UpdateProduct {
    pub category_id: Option<i32>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub stock: Option<i64>,
    pub images: Option<Vec<String>>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateProduct {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateProduct {
    /// Create a patch with no changes applied yet.
    pub fn new() -> Self {
        Self {
            category_id: None,
            title: None,
            name: None,
            price: None,
            description: None,
            stock: None,
            images: None,
            updated_at: Local::now().naive_utc(),
        }
    }

    pub fn category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }
}

/// Query definition used to list products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Optional category filter.
    pub category_id: Option<i32>,
    /// Optional substring matched against the title and name.
    pub search: Option<String>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict results to a single category.
    pub fn category_id(mut self, category_id: i32) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Filter results by a search term applied to the title and name.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Apply pagination to the query.
    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}
