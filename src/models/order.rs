use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money::{AmountOutOfRange, from_cents, to_cents};
use crate::domain::order::{
    NewOrder as DomainNewOrder, NewOrderItem as DomainNewOrderItem, Order as DomainOrder,
    OrderItem as DomainOrderItem,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::orders)]
pub struct Order {
    pub id: i32,
    pub user_id: String,
    pub total_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::order_items)]
#[diesel(belongs_to(Order, foreign_key = order_id))]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i64,
    pub price_cents: i64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::orders)]
pub struct NewOrder<'a> {
    pub user_id: &'a str,
    pub total_cents: i64,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::order_items)]
pub struct NewOrderItem {
    pub order_id: i32,
    pub product_id: i32,
    pub quantity: i64,
    pub price_cents: i64,
}

impl From<OrderItem> for DomainOrderItem {
    fn from(value: OrderItem) -> Self {
        Self {
            id: value.id,
            order_id: value.order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            price: from_cents(value.price_cents),
            created_at: value.created_at,
        }
    }
}

impl From<(Order, Vec<OrderItem>)> for DomainOrder {
    fn from((order, items): (Order, Vec<OrderItem>)) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            total_amount: from_cents(order.total_cents),
            items: items.into_iter().map(DomainOrderItem::from).collect(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl<'a> TryFrom<&'a DomainNewOrder> for NewOrder<'a> {
    type Error = AmountOutOfRange;

    fn try_from(value: &'a DomainNewOrder) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: value.user_id.as_str(),
            total_cents: to_cents(value.total_amount)?,
            updated_at: value.updated_at,
        })
    }
}

impl NewOrderItem {
    pub fn from_domain(
        order_id: i32,
        value: &DomainNewOrderItem,
    ) -> Result<Self, AmountOutOfRange> {
        Ok(Self {
            order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            price_cents: to_cents(value.price)?,
        })
    }
}
