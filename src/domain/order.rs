use chrono::{Local, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::money::to_cents;
use crate::pagination::Pagination;

/// Domain representation of a placed order. Orders are never modified after
/// creation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    /// Unique identifier of the order.
    pub id: i32,
    /// Identity provider subject of the buyer.
    pub user_id: String,
    /// Sum of `price * quantity` over all items at placement time.
    pub total_amount: Decimal,
    /// Line items of the order.
    pub items: Vec<OrderItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A purchased product with the unit price frozen at placement time.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i64,
    /// Unit price copied from the product when the order was placed.
    pub price: Decimal,
    pub created_at: NaiveDateTime,
}

/// Snapshot of one cart item joined with its product, read inside the
/// placement transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: i32,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub stock: i64,
}

/// Reasons a cart cannot be turned into an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderDraftError {
    #[error("cart has no items")]
    EmptyCart,
    #[error("product {product_id} has {available} in stock, {requested} requested")]
    InsufficientStock {
        product_id: i32,
        requested: i64,
        available: i64,
    },
    #[error("order total exceeds the storable amount")]
    TotalTooLarge,
}

/// An order ready to be inserted, computed from the cart contents.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: String,
    pub total_amount: Decimal,
    pub items: Vec<NewOrderItem>,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub quantity: i64,
    pub price: Decimal,
}

impl NewOrder {
    /// Price the cart lines and check stock, producing the order to insert.
    pub fn from_cart_lines(
        user_id: impl Into<String>,
        lines: &[CartLine],
    ) -> Result<Self, OrderDraftError> {
        if lines.is_empty() {
            return Err(OrderDraftError::EmptyCart);
        }

        let mut total_amount = Decimal::ZERO;
        let mut items = Vec::with_capacity(lines.len());

        for line in lines {
            if line.stock < line.quantity {
                return Err(OrderDraftError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: line.stock,
                });
            }

            total_amount = line
                .unit_price
                .checked_mul(Decimal::from(line.quantity))
                .and_then(|line_total| total_amount.checked_add(line_total))
                .ok_or(OrderDraftError::TotalTooLarge)?;
            items.push(NewOrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.unit_price,
            });
        }

        to_cents(total_amount).map_err(|_| OrderDraftError::TotalTooLarge)?;

        Ok(Self {
            user_id: user_id.into(),
            total_amount,
            items,
            updated_at: Local::now().naive_utc(),
        })
    }
}

/// Query definition used to list orders.
#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    /// Restrict results to one buyer; `None` lists every order.
    pub user_id: Option<String>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl OrderListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Query definition used to list order items across orders.
#[derive(Debug, Clone, Default)]
pub struct OrderItemListQuery {
    /// Restrict results to orders of one buyer.
    pub user_id: Option<String>,
    /// Restrict results to a single order.
    pub order_id: Option<i32>,
    pub pagination: Option<Pagination>,
}

impl OrderItemListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn order_id(mut self, order_id: i32) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: i32, quantity: i64, cents: i64, stock: i64) -> CartLine {
        CartLine {
            product_id,
            quantity,
            unit_price: Decimal::new(cents, 2),
            stock,
        }
    }

    #[test]
    fn totals_price_times_quantity() {
        let lines = [line(1, 2, 1000, 10), line(2, 1, 500, 10)];

        let order = NewOrder::from_cart_lines("user-1", &lines).expect("expected draft");

        assert_eq!(order.user_id, "user-1");
        assert_eq!(order.total_amount, Decimal::new(2500, 2));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].price, Decimal::new(1000, 2));
        assert_eq!(order.items[1].price, Decimal::new(500, 2));
    }

    #[test]
    fn empty_cart_is_rejected() {
        let result = NewOrder::from_cart_lines("user-1", &[]);

        assert_eq!(result.err(), Some(OrderDraftError::EmptyCart));
    }

    #[test]
    fn stock_shortage_is_reported_per_product() {
        let lines = [line(1, 1, 1000, 5), line(7, 3, 250, 2)];

        let result = NewOrder::from_cart_lines("user-1", &lines);

        assert_eq!(
            result.err(),
            Some(OrderDraftError::InsufficientStock {
                product_id: 7,
                requested: 3,
                available: 2,
            })
        );
    }

    #[test]
    fn exact_stock_is_enough() {
        let lines = [line(3, 4, 199, 4)];

        let order = NewOrder::from_cart_lines("user-1", &lines).expect("expected draft");

        assert_eq!(order.total_amount, Decimal::new(796, 2));
    }

    #[test]
    fn totals_beyond_the_stored_range_are_rejected() {
        let quantity = 1_000_000_000_000;
        let lines = [line(1, quantity, 9_999_999_999, quantity)];

        let result = NewOrder::from_cart_lines("user-1", &lines);

        assert_eq!(result.err(), Some(OrderDraftError::TotalTooLarge));
    }

    #[test]
    fn totals_overflowing_across_lines_are_rejected() {
        let lines = [
            line(1, 1, i64::MAX / 2 + 1, 1),
            line(2, 1, i64::MAX / 2 + 1, 1),
        ];

        let result = NewOrder::from_cart_lines("user-1", &lines);

        assert_eq!(result.err(), Some(OrderDraftError::TotalTooLarge));
    }
}
