use mockall::mock;

use super::{
    CartReader, CartWriter, CategoryReader, CategoryWriter, OrderReader, OrderWriter,
    ProductReader, ProductWriter,
};
use crate::domain::{
    cart::{Cart, CartItem},
    category::{Category, CategoryListQuery, NewCategory, UpdateCategory},
    order::{Order, OrderItem, OrderItemListQuery, OrderListQuery},
    product::{NewProduct, Product, ProductListQuery, UpdateProduct},
};
use crate::repository::errors::RepositoryResult;

mock! {
    pub CategoryReader {}

    impl CategoryReader for CategoryReader {
        fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<Category>>;
        fn list_categories(&self, query: CategoryListQuery) -> RepositoryResult<(usize, Vec<Category>)>;
    }
}

mock! {
    pub CategoryWriter {}

    impl CategoryWriter for CategoryWriter {
        fn create_category(&self, new_category: &NewCategory) -> RepositoryResult<Category>;
        fn update_category(&self, id: i32, updates: &UpdateCategory) -> RepositoryResult<Category>;
        fn delete_category(&self, id: i32) -> RepositoryResult<()>;
        fn upsert_category(&self, id: i32, category: &NewCategory) -> RepositoryResult<Category>;
    }
}

mock! {
    pub ProductReader {}

    impl ProductReader for ProductReader {
        fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<Product>>;
        fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    }
}

mock! {
    pub ProductWriter {}

    impl ProductWriter for ProductWriter {
        fn create_product(&self, new_product: &NewProduct) -> RepositoryResult<Product>;
        fn update_product(&self, id: i32, updates: &UpdateProduct) -> RepositoryResult<Product>;
        fn delete_product(&self, id: i32) -> RepositoryResult<()>;
        fn upsert_product(&self, id: i32, product: &NewProduct) -> RepositoryResult<Product>;
    }
}

mock! {
    pub CartReader {}

    impl CartReader for CartReader {
        fn get_cart_by_owner(&self, owner_key: &str) -> RepositoryResult<Option<Cart>>;
    }
}

mock! {
    pub CartWriter {}

    impl CartWriter for CartWriter {
        fn get_or_create_cart(&self, owner_key: &str) -> RepositoryResult<Cart>;
        fn add_cart_item(&self, cart_id: i32, product_id: i32, quantity: i64) -> RepositoryResult<CartItem>;
        fn update_cart_item(&self, item_id: i32, cart_id: i32, quantity: i64) -> RepositoryResult<CartItem>;
        fn remove_cart_item(&self, item_id: i32, cart_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub OrderReader {}

    impl OrderReader for OrderReader {
        fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<Order>>;
        fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<Order>)>;
        fn list_order_items(&self, query: OrderItemListQuery) -> RepositoryResult<(usize, Vec<OrderItem>)>;
    }
}

mock! {
    pub OrderWriter {}

    impl OrderWriter for OrderWriter {
        fn place_order(&self, cart_id: i32, user_id: &str) -> RepositoryResult<Order>;
    }
}
