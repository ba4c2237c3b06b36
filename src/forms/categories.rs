use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::{NewCategory, UpdateCategory};
use crate::forms::{FieldErrors, field_error, sanitize_inline_text, validation_field_errors};

/// Maximum length allowed for a category name.
const NAME_MAX_LEN: u64 = 255;

/// Maximum length allowed for an image URL.
const IMAGE_MAX_LEN: u64 = 2048;

/// Result type returned by the category form helpers.
pub type CategoryFormResult<T> = Result<T, CategoryFormError>;

/// Errors that can occur while processing category payloads.
#[derive(Debug, Error)]
pub enum CategoryFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("category name cannot be empty")]
    EmptyName,
}

impl CategoryFormError {
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            CategoryFormError::Validation(errors) => validation_field_errors(errors),
            CategoryFormError::EmptyName => field_error("name", "This field may not be blank."),
        }
    }
}

/// Payload accepted when creating or replacing a category.
#[derive(Debug, Deserialize, Validate)]
pub struct CategoryForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub name: String,
    #[validate(url(message = "Enter a valid URL."), length(max = IMAGE_MAX_LEN))]
    pub image: String,
}

impl CategoryForm {
    /// Validates and sanitizes the payload into a domain `NewCategory`.
    pub fn into_new_category(self) -> CategoryFormResult<NewCategory> {
        let (name, image) = self.sanitized()?;
        Ok(NewCategory::new(name, image))
    }

    /// Validates and sanitizes the payload into a domain `UpdateCategory`.
    pub fn into_update_category(self) -> CategoryFormResult<UpdateCategory> {
        let (name, image) = self.sanitized()?;
        Ok(UpdateCategory::new(name, image))
    }

    fn sanitized(self) -> CategoryFormResult<(String, String)> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(CategoryFormError::EmptyName);
        }

        Ok((name, self.image.trim().to_string()))
    }
}
