use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::cart::{Cart as DomainCart, CartItem as DomainCartItem};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::carts)]
pub struct Cart {
    pub id: i32,
    pub owner_key: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::cart_items)]
#[diesel(belongs_to(Cart, foreign_key = cart_id))]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::carts)]
pub struct NewCart<'a> {
    pub owner_key: &'a str,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::cart_items)]
pub struct NewCartItem {
    pub cart_id: i32,
    pub product_id: i32,
    pub quantity: i64,
    pub updated_at: NaiveDateTime,
}

impl From<CartItem> for DomainCartItem {
    fn from(value: CartItem) -> Self {
        Self {
            id: value.id,
            cart_id: value.cart_id,
            product_id: value.product_id,
            quantity: value.quantity,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<(Cart, Vec<CartItem>)> for DomainCart {
    fn from((cart, items): (Cart, Vec<CartItem>)) -> Self {
        Self {
            id: cart.id,
            owner_key: cart.owner_key,
            items: items.into_iter().map(DomainCartItem::from).collect(),
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}
