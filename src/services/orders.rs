use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::cart::CartOwner;
use crate::domain::order::{Order, OrderItem, OrderItemListQuery, OrderListQuery};
use crate::identity::{AuthenticatedUser, check_role};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{CartReader, OrderReader, OrderWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the order list.
#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Query parameters accepted by the order item list.
#[derive(Debug, Default, Deserialize)]
pub struct OrderItemsQuery {
    /// Restrict the list to one order.
    #[serde(alias = "order")]
    pub order_id: Option<i32>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Turns the caller's cart into an order. Prices are frozen and stock is
/// reserved in the same transaction that empties the cart.
pub fn place_order<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Order>
where
    R: CartReader + OrderWriter + ?Sized,
{
    let owner = CartOwner::User(user.sub.clone());

    let cart = repo
        .get_cart_by_owner(&owner.key())?
        .ok_or(ServiceError::NotFound)?;

    if cart.is_empty() {
        return Err(ServiceError::NotFound);
    }

    repo.place_order(cart.id, &user.sub)
        .map_err(ServiceError::from)
}

/// Orders visible to the caller: their own, or every order for the service
/// access role.
pub fn list_orders<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: OrdersQuery,
) -> ServiceResult<Paginated<Order>>
where
    R: OrderReader + ?Sized,
{
    let pagination = Pagination::new(query.page, query.per_page);
    let mut list_query = OrderListQuery::new().paginate(pagination);

    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        list_query = list_query.user_id(&user.sub);
    }

    let (total, orders) = repo.list_orders(list_query)?;

    Ok(Paginated::new(orders, pagination, total))
}

/// A single order. Orders of other users are reported as missing.
pub fn get_order<R>(repo: &R, user: &AuthenticatedUser, order_id: i32) -> ServiceResult<Order>
where
    R: OrderReader + ?Sized,
{
    let order = repo
        .get_order_by_id(order_id)?
        .ok_or(ServiceError::NotFound)?;

    if order.user_id != user.sub && !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::NotFound);
    }

    Ok(order)
}

pub fn list_order_items<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: OrderItemsQuery,
) -> ServiceResult<Paginated<OrderItem>>
where
    R: OrderReader + ?Sized,
{
    let pagination = Pagination::new(query.page, query.per_page);
    let mut list_query = OrderItemListQuery::new().paginate(pagination);

    if let Some(order_id) = query.order_id {
        list_query = list_query.order_id(order_id);
    }

    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        list_query = list_query.user_id(&user.sub);
    }

    let (total, items) = repo.list_order_items(list_query)?;

    Ok(Paginated::new(items, pagination, total))
}
