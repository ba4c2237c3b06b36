use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidateUrl, ValidationError, ValidationErrors};

use crate::domain::money::{MONEY_SCALE, max_amount};
use crate::domain::product::{DEFAULT_PRODUCT_TITLE, MAX_STOCK, NewProduct, UpdateProduct};
use crate::forms::{
    FieldErrors, field_error, sanitize_inline_text, sanitize_multiline_text,
    validation_field_errors,
};

/// Maximum allowed length for product titles and names.
const NAME_MAX_LEN: u64 = 255;

/// Maximum number of images attached to one product.
const IMAGES_MAX: u64 = 20;

/// Result type returned by the product form helpers.
pub type ProductFormResult<T> = Result<T, ProductFormError>;

/// Errors that can occur while processing product payloads.
#[derive(Debug, Error)]
pub enum ProductFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("product name cannot be empty")]
    EmptyName,
    /// One of the image entries is not a URL.
    #[error("image #{index} is not a valid URL")]
    InvalidImage { index: usize },
}

impl ProductFormError {
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            ProductFormError::Validation(errors) => validation_field_errors(errors),
            ProductFormError::EmptyName => field_error("name", "This field may not be blank."),
            ProductFormError::InvalidImage { index } => {
                field_error("images", format!("Item {index} is not a valid URL."))
            }
        }
    }
}

/// Payload accepted when creating or replacing a product.
#[derive(Debug, Deserialize, Validate)]
pub struct ProductForm {
    /// Category the product belongs to.
    #[serde(alias = "category_id")]
    #[validate(range(min = 1))]
    pub category: i32,
    /// Optional marketing title; defaults to a placeholder.
    #[serde(default)]
    #[validate(length(max = NAME_MAX_LEN))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    /// Unit price, accepted as a JSON string or number.
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(custom(function = "validate_stock"))]
    pub stock: i64,
    #[serde(default)]
    #[validate(length(max = IMAGES_MAX))]
    pub images: Vec<String>,
}

/// Prices must be positive, have at most two decimal places and fit in ten
/// digits.
fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price <= Decimal::ZERO {
        return Err(ValidationError::new("min_value")
            .with_message("Ensure this value is greater than 0.".into()));
    }

    if price.normalize().scale() > MONEY_SCALE {
        return Err(ValidationError::new("max_decimal_places")
            .with_message("Ensure that there are no more than 2 decimal places.".into()));
    }

    if *price > max_amount() {
        return Err(ValidationError::new("max_digits")
            .with_message("Ensure that there are no more than 10 digits in total.".into()));
    }

    Ok(())
}

fn validate_stock(stock: i64) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::new("range")
            .with_message("Ensure this value is greater than or equal to 0.".into()));
    }

    if stock > MAX_STOCK {
        return Err(ValidationError::new("range").with_message(
            format!("Ensure this value is less than or equal to {MAX_STOCK}.").into(),
        ));
    }

    Ok(())
}

struct SanitizedProduct {
    category_id: i32,
    title: String,
    name: String,
    price: Decimal,
    description: String,
    stock: i64,
    images: Vec<String>,
}

impl ProductForm {
    /// Validates and sanitizes the payload into a domain `NewProduct`.
    pub fn into_new_product(self) -> ProductFormResult<NewProduct> {
        let product = self.sanitized()?;

        Ok(
            NewProduct::new(product.category_id, product.name, product.price)
                .with_title(product.title)
                .with_description(product.description)
                .with_stock(product.stock)
                .with_images(product.images),
        )
    }

    /// Validates and sanitizes the payload into a full-replacement `UpdateProduct`.
    pub fn into_update_product(self) -> ProductFormResult<UpdateProduct> {
        let product = self.sanitized()?;

        Ok(UpdateProduct::new()
            .category_id(product.category_id)
            .title(product.title)
            .name(product.name)
            .price(product.price)
            .description(product.description)
            .stock(product.stock)
            .images(product.images))
    }

    fn sanitized(self) -> ProductFormResult<SanitizedProduct> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(ProductFormError::EmptyName);
        }

        let title = self
            .title
            .as_deref()
            .map(sanitize_inline_text)
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_PRODUCT_TITLE.to_string());

        let mut images = Vec::with_capacity(self.images.len());
        for (index, image) in self.images.iter().enumerate() {
            let image = image.trim();
            if !image.validate_url() {
                return Err(ProductFormError::InvalidImage { index });
            }
            images.push(image.to_string());
        }

        Ok(SanitizedProduct {
            category_id: self.category,
            title,
            name,
            price: self.price.round_dp(MONEY_SCALE),
            description: sanitize_multiline_text(&self.description),
            stock: self.stock,
            images,
        })
    }
}
