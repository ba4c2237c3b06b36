use crate::db::{DbConnection, DbPool};
use crate::domain::cart::{Cart, CartItem};
use crate::domain::category::{Category, CategoryListQuery, NewCategory, UpdateCategory};
use crate::domain::order::{Order, OrderItem, OrderItemListQuery, OrderListQuery};
use crate::domain::product::{NewProduct, Product, ProductListQuery, UpdateProduct};
use crate::repository::errors::RepositoryResult;

pub mod cart;
pub mod category;
pub mod errors;
pub mod order;
pub mod product;

#[cfg(test)]
pub mod mock;

/// Escape character used with `LIKE` patterns built by [`contains_pattern`].
pub(crate) const LIKE_ESCAPE: char = '\\';

/// `LIKE` pattern matching `term` anywhere, with `%` and `_` taken literally.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over category records.
pub trait CategoryReader {
    fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;
    fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<(usize, Vec<Category>)>;
}

/// Write operations over category records.
pub trait CategoryWriter {
    fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
    fn update_category(&self, id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
    fn delete_category(&self, id: i32) -> RepositoryResult<()>;
    /// Insert the category under `id`, or overwrite the one stored there.
    fn upsert_category(&self, id: i32, category: &NewCategory) -> RepositoryResult<Category>;
}

/// Read-only operations over product records.
pub trait ProductReader {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
}

/// Write operations over product records.
pub trait ProductWriter {
    fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(&self, id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
    fn delete_product(&self, id: i32) -> RepositoryResult<()>;
    /// Insert the product under `id`, or overwrite the one stored there.
    /// Stock of an existing product is kept.
    fn upsert_product(&self, id: i32, product: &NewProduct) -> RepositoryResult<Product>;
}

/// Read-only operations over carts.
pub trait CartReader {
    /// Cart stored under `owner_key`, with its items.
    fn get_cart_by_owner(&self, owner_key: &str) -> RepositoryResult<Option<Cart>>;
}

/// Cart lifecycle operations.
pub trait CartWriter {
    /// Return the cart stored under `owner_key`, creating an empty one first
    /// when none exists.
    fn get_or_create_cart(&self, owner_key: &str) -> RepositoryResult<Cart>;
    /// Insert `quantity` units of a product into a cart, or add them to the
    /// existing item for that product.
    fn add_cart_item(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i64,
    ) -> RepositoryResult<CartItem>;
    fn update_cart_item(
        &self,
        item_id: i32,
        cart_id: i32,
        quantity: i64,
    ) -> RepositoryResult<CartItem>;
    fn remove_cart_item(&self, item_id: i32, cart_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over orders.
pub trait OrderReader {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
    fn list_order_items(
        &self,
        query: OrderItemListQuery,
    ) -> RepositoryResult<(usize, Vec<OrderItem>)>;
}

/// Order placement. Orders have no update or delete operations.
pub trait OrderWriter {
    /// Turn the contents of `cart_id` into an order owned by `user_id`,
    /// decrement product stock and empty the cart, all in one transaction.
    fn place_order(&self, cart_id: i32, user_id: &str) -> RepositoryResult<Order>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("tea"), "%tea%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
