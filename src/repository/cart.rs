use chrono::Local;
use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::cart::{Cart as DomainCart, CartItem as DomainCartItem, MAX_ITEM_QUANTITY};
use crate::models::cart::{
    Cart as DbCart, CartItem as DbCartItem, NewCart as DbNewCart, NewCartItem as DbNewCartItem,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{CartReader, CartWriter, DieselRepository};

impl CartReader for DieselRepository {
    fn get_cart_by_owner(&self, owner_key: &str) -> RepositoryResult<Option<DomainCart>> {
        use crate::schema::carts;

        let mut conn = self.conn()?;

        let cart = carts::table
            .filter(carts::owner_key.eq(owner_key))
            .first::<DbCart>(&mut conn)
            .optional()?;

        let Some(cart) = cart else {
            return Ok(None);
        };

        let items = load_cart_items(&mut conn, cart.id)?;

        Ok(Some(DomainCart::from((cart, items))))
    }
}

impl CartWriter for DieselRepository {
    fn get_or_create_cart(&self, owner_key: &str) -> RepositoryResult<DomainCart> {
        use crate::schema::carts;

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainCart, RepositoryError, _>(|conn| {
            // The unique owner key makes concurrent creators converge on one row.
            let inserted = diesel::insert_into(carts::table)
                .values(&DbNewCart {
                    owner_key,
                    updated_at: Local::now().naive_utc(),
                })
                .on_conflict(carts::owner_key)
                .do_nothing()
                .execute(conn)?;

            let cart = carts::table
                .filter(carts::owner_key.eq(owner_key))
                .first::<DbCart>(conn)?;

            if inserted > 0 {
                log::info!("Created cart {} for {owner_key}", cart.id);
            }

            let items = load_cart_items(conn, cart.id)?;

            Ok(DomainCart::from((cart, items)))
        })
    }

    fn add_cart_item(
        &self,
        cart_id: i32,
        product_id: i32,
        quantity: i64,
    ) -> RepositoryResult<DomainCartItem> {
        use crate::schema::{cart_items, products};

        let mut conn = self.conn()?;

        conn.immediate_transaction::<DomainCartItem, RepositoryError, _>(|conn| {
            ensure_cart_exists(conn, cart_id)?;

            let product_exists: bool =
                select(exists(products::table.filter(products::id.eq(product_id))))
                    .get_result(conn)?;
            if !product_exists {
                return Err(RepositoryError::NotFound);
            }

            let now = Local::now().naive_utc();

            let item = diesel::insert_into(cart_items::table)
                .values(&DbNewCartItem {
                    cart_id,
                    product_id,
                    quantity,
                    updated_at: now,
                })
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set((
                    cart_items::quantity.eq(cart_items::quantity + quantity),
                    cart_items::updated_at.eq(now),
                ))
                .get_result::<DbCartItem>(conn)?;

            if item.quantity > MAX_ITEM_QUANTITY {
                return Err(RepositoryError::Conflict(format!(
                    "cart line for product {product_id} would exceed {MAX_ITEM_QUANTITY} units"
                )));
            }

            touch_cart(conn, cart_id)?;

            Ok(item.into())
        })
    }

    fn update_cart_item(
        &self,
        item_id: i32,
        cart_id: i32,
        quantity: i64,
    ) -> RepositoryResult<DomainCartItem> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        conn.transaction::<DomainCartItem, RepositoryError, _>(|conn| {
            let target = cart_items::table
                .filter(cart_items::id.eq(item_id))
                .filter(cart_items::cart_id.eq(cart_id));

            let updated = diesel::update(target)
                .set((
                    cart_items::quantity.eq(quantity),
                    cart_items::updated_at.eq(Local::now().naive_utc()),
                ))
                .get_result::<DbCartItem>(conn)?;

            touch_cart(conn, cart_id)?;

            Ok(updated.into())
        })
    }

    fn remove_cart_item(&self, item_id: i32, cart_id: i32) -> RepositoryResult<()> {
        use crate::schema::cart_items;

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            let deleted = diesel::delete(
                cart_items::table
                    .filter(cart_items::id.eq(item_id))
                    .filter(cart_items::cart_id.eq(cart_id)),
            )
            .execute(conn)?;

            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            touch_cart(conn, cart_id)
        })
    }
}

pub(crate) fn load_cart_items(
    conn: &mut SqliteConnection,
    cart_id: i32,
) -> RepositoryResult<Vec<DbCartItem>> {
    use crate::schema::cart_items;

    Ok(cart_items::table
        .filter(cart_items::cart_id.eq(cart_id))
        .order(cart_items::id.asc())
        .load::<DbCartItem>(conn)?)
}

pub(crate) fn touch_cart(conn: &mut SqliteConnection, cart_id: i32) -> RepositoryResult<()> {
    use crate::schema::carts;

    diesel::update(carts::table.filter(carts::id.eq(cart_id)))
        .set(carts::updated_at.eq(Local::now().naive_utc()))
        .execute(conn)?;

    Ok(())
}

fn ensure_cart_exists(conn: &mut SqliteConnection, cart_id: i32) -> RepositoryResult<()> {
    use crate::schema::carts;

    let exists = select(exists(carts::table.filter(carts::id.eq(cart_id)))).get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(RepositoryError::NotFound)
    }
}
