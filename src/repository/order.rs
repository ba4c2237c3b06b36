use std::collections::HashMap;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::money::from_cents;
use crate::domain::order::{
    CartLine, NewOrder as DomainNewOrder, Order as DomainOrder, OrderDraftError,
    OrderItem as DomainOrderItem, OrderItemListQuery, OrderListQuery,
};
use crate::models::order::{
    NewOrder as DbNewOrder, NewOrderItem as DbNewOrderItem, Order as DbOrder,
    OrderItem as DbOrderItem,
};
use crate::repository::cart::touch_cart;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, OrderReader, OrderWriter};

impl OrderReader for DieselRepository {
    fn get_order_by_id(&self, id: i32) -> RepositoryResult<Option<DomainOrder>> {
        use crate::schema::orders;

        let mut conn = self.conn()?;
        let order = orders::table
            .filter(orders::id.eq(id))
            .first::<DbOrder>(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = load_order_items(&mut conn, order.id)?;

        Ok(Some(DomainOrder::from((order, items))))
    }

    fn list_orders(&self, query: OrderListQuery) -> RepositoryResult<(usize, Vec<DomainOrder>)> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        let OrderListQuery {
            user_id,
            pagination,
        } = query;

        let mut count_query = orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref user_id) = user_id {
            count_query = count_query.filter(orders::user_id.eq(user_id.clone()));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = orders::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref user_id) = user_id {
            items = items.filter(orders::user_id.eq(user_id.clone()));
        }

        items = items.order((orders::created_at.desc(), orders::id.desc()));

        if let Some(pagination) = pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let db_orders = items.load::<DbOrder>(&mut conn)?;
        if db_orders.is_empty() {
            return Ok((total, Vec::new()));
        }

        let order_ids: Vec<i32> = db_orders.iter().map(|order| order.id).collect();

        let mut items_by_order: HashMap<i32, Vec<DbOrderItem>> = HashMap::new();

        let rows = order_items::table
            .filter(order_items::order_id.eq_any(&order_ids))
            .order(order_items::id.asc())
            .load::<DbOrderItem>(&mut conn)?;

        for item in rows {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let orders = db_orders
            .into_iter()
            .map(|order| {
                let items = items_by_order.remove(&order.id).unwrap_or_default();
                DomainOrder::from((order, items))
            })
            .collect();

        Ok((total, orders))
    }

    fn list_order_items(
        &self,
        query: OrderItemListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainOrderItem>)> {
        use crate::schema::{order_items, orders};

        let mut conn = self.conn()?;

        let OrderItemListQuery {
            user_id,
            order_id,
            pagination,
        } = query;

        let mut count_query = order_items::table
            .inner_join(orders::table)
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref user_id) = user_id {
            count_query = count_query.filter(orders::user_id.eq(user_id.clone()));
        }

        if let Some(order_id) = order_id {
            count_query = count_query.filter(order_items::order_id.eq(order_id));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut rows = order_items::table
            .inner_join(orders::table)
            .select(DbOrderItem::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(ref user_id) = user_id {
            rows = rows.filter(orders::user_id.eq(user_id.clone()));
        }

        if let Some(order_id) = order_id {
            rows = rows.filter(order_items::order_id.eq(order_id));
        }

        rows = rows.order((order_items::order_id.desc(), order_items::id.asc()));

        if let Some(pagination) = pagination {
            rows = rows.offset(pagination.offset()).limit(pagination.limit());
        }

        let items = rows
            .load::<DbOrderItem>(&mut conn)?
            .into_iter()
            .map(DomainOrderItem::from)
            .collect();

        Ok((total, items))
    }
}

impl OrderWriter for DieselRepository {
    fn place_order(&self, cart_id: i32, user_id: &str) -> RepositoryResult<DomainOrder> {
        use crate::schema::{cart_items, order_items, orders, products};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainOrder, RepositoryError, _>(|conn| {
            let lines = load_cart_lines(conn, cart_id)?;

            let new_order = DomainNewOrder::from_cart_lines(user_id, &lines).map_err(|err| {
                match err {
                    OrderDraftError::EmptyCart => RepositoryError::NotFound,
                    rejected @ (OrderDraftError::InsufficientStock { .. }
                    | OrderDraftError::TotalTooLarge) => {
                        RepositoryError::Conflict(rejected.to_string())
                    }
                }
            })?;

            let created = diesel::insert_into(orders::table)
                .values(&DbNewOrder::try_from(&new_order)?)
                .get_result::<DbOrder>(conn)?;

            let payload: Vec<DbNewOrderItem> = new_order
                .items
                .iter()
                .map(|item| DbNewOrderItem::from_domain(created.id, item))
                .collect::<Result<_, _>>()?;

            diesel::insert_into(order_items::table)
                .values(&payload)
                .execute(conn)?;

            for item in &new_order.items {
                diesel::update(products::table.filter(products::id.eq(item.product_id)))
                    .set((
                        products::stock.eq(products::stock - item.quantity),
                        products::updated_at.eq(new_order.updated_at),
                    ))
                    .execute(conn)?;
            }

            diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart_id)))
                .execute(conn)?;
            touch_cart(conn, cart_id)?;

            let items = load_order_items(conn, created.id)?;

            log::info!(
                "Placed order {} for {user_id} from cart {cart_id}: {} items, total {}",
                created.id,
                items.len(),
                new_order.total_amount
            );

            Ok(DomainOrder::from((created, items)))
        })
    }
}

fn load_cart_lines(conn: &mut SqliteConnection, cart_id: i32) -> RepositoryResult<Vec<CartLine>> {
    use crate::schema::{cart_items, products};

    let rows = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::cart_id.eq(cart_id))
        .order(cart_items::id.asc())
        .select((
            cart_items::product_id,
            cart_items::quantity,
            products::price_cents,
            products::stock,
        ))
        .load::<(i32, i64, i64, i64)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(product_id, quantity, price_cents, stock)| CartLine {
            product_id,
            quantity,
            unit_price: from_cents(price_cents),
            stock,
        })
        .collect())
}

fn load_order_items(
    conn: &mut SqliteConnection,
    order_id: i32,
) -> RepositoryResult<Vec<DbOrderItem>> {
    use crate::schema::order_items;

    Ok(order_items::table
        .filter(order_items::order_id.eq(order_id))
        .order(order_items::id.asc())
        .load::<DbOrderItem>(conn)?)
}
