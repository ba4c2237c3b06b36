use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::cart::MAX_ITEM_QUANTITY;
use crate::forms::{FieldErrors, validation_field_errors};

fn default_quantity() -> i64 {
    1
}

fn validate_quantity(quantity: i64) -> Result<(), ValidationError> {
    if quantity < 1 {
        return Err(ValidationError::new("range")
            .with_message("Ensure this value is greater than or equal to 1.".into()));
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::new("range").with_message(
            format!("Ensure this value is less than or equal to {MAX_ITEM_QUANTITY}.").into(),
        ));
    }

    Ok(())
}

/// Payload for adding a product to the caller's cart.
#[derive(Debug, Deserialize, Validate)]
pub struct AddCartItemForm {
    #[serde(alias = "product_id")]
    #[validate(range(min = 1))]
    pub product: i32,
    #[serde(default = "default_quantity")]
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: i64,
    /// Ignored beyond an ownership check; items always land in the caller's cart.
    #[serde(default, alias = "cart_id")]
    pub cart: Option<i32>,
}

impl AddCartItemForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate()
            .map_err(|errors| validation_field_errors(&errors))
    }
}

/// Payload for changing the quantity of an existing cart line.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemForm {
    #[validate(custom(function = "validate_quantity"))]
    pub quantity: i64,
}

impl UpdateCartItemForm {
    pub fn check(&self) -> Result<(), FieldErrors> {
        self.validate()
            .map_err(|errors| validation_field_errors(&errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_defaults_to_one() {
        let form: AddCartItemForm =
            serde_json::from_str(r#"{"product_id": 7}"#).expect("valid payload");

        assert_eq!(form.product, 7);
        assert_eq!(form.quantity, 1);
        assert_eq!(form.cart, None);
        assert!(form.check().is_ok());
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let form = AddCartItemForm {
            product: 1,
            quantity: 0,
            cart: None,
        };

        let fields = form.check().expect_err("expected validation failure");

        assert_eq!(
            fields.get("quantity"),
            Some(&vec![
                "Ensure this value is greater than or equal to 1.".to_string()
            ])
        );
    }

    #[test]
    fn update_rejects_negative_quantity() {
        let form = UpdateCartItemForm { quantity: -3 };

        assert!(form.check().is_err());
    }

    #[test]
    fn quantity_above_the_line_limit_is_rejected() {
        let form: AddCartItemForm =
            serde_json::from_str(r#"{"product": 1, "quantity": 1000000000000}"#)
                .expect("valid payload");

        let fields = form.check().expect_err("expected validation failure");

        assert_eq!(
            fields.get("quantity"),
            Some(&vec![
                "Ensure this value is less than or equal to 10000.".to_string()
            ])
        );
        assert!(
            UpdateCartItemForm {
                quantity: MAX_ITEM_QUANTITY
            }
            .check()
            .is_ok()
        );
    }
}
