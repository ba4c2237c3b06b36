use diesel::dsl::{exists, select};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, ProductListQuery,
    UpdateProduct as DomainUpdateProduct,
};
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, UpdateProduct as DbUpdateProduct,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, LIKE_ESCAPE, ProductReader, ProductWriter, contains_pattern,
};

impl ProductReader for DieselRepository {
    fn get_product_by_id(&self, id: i32) -> RepositoryResult<Option<DomainProduct>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::id.eq(id))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product.map(DomainProduct::from))
    }

    fn list_products(
        &self,
        query: ProductListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainProduct>)> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let ProductListQuery {
            category_id,
            search,
            pagination,
        } = query;

        let search_pattern = search.as_deref().map(contains_pattern);

        let mut count_query = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(category_id) = category_id {
            count_query = count_query.filter(products::category_id.eq(category_id));
        }

        if let Some(ref pattern) = search_pattern {
            count_query = count_query.filter(
                products::title
                    .like(pattern.clone())
                    .escape(LIKE_ESCAPE)
                    .or(products::name.like(pattern.clone()).escape(LIKE_ESCAPE)),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(category_id) = category_id {
            items = items.filter(products::category_id.eq(category_id));
        }

        if let Some(ref pattern) = search_pattern {
            items = items.filter(
                products::title
                    .like(pattern.clone())
                    .escape(LIKE_ESCAPE)
                    .or(products::name.like(pattern.clone()).escape(LIKE_ESCAPE)),
            );
        }

        items = items.order((products::created_at.desc(), products::id.desc()));

        if let Some(pagination) = pagination {
            items = items.offset(pagination.offset()).limit(pagination.limit());
        }

        let products = items
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(DomainProduct::from)
            .collect();

        Ok((total, products))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, new_product: &DomainNewProduct) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            ensure_category_exists(conn, new_product.category_id)?;

            let insertable = DbNewProduct::try_from(new_product)?;

            let created = diesel::insert_into(products::table)
                .values(&insertable)
                .get_result::<DbProduct>(conn)?;

            Ok(created.into())
        })
    }

    fn update_product(
        &self,
        id: i32,
        updates: &DomainUpdateProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            if let Some(category_id) = updates.category_id {
                ensure_category_exists(conn, category_id)?;
            }

            let db_updates = DbUpdateProduct::try_from(updates)?;

            let updated = diesel::update(products::table.filter(products::id.eq(id)))
                .set(&db_updates)
                .get_result::<DbProduct>(conn)?;

            Ok(updated.into())
        })
    }

    fn upsert_product(
        &self,
        id: i32,
        product: &DomainNewProduct,
    ) -> RepositoryResult<DomainProduct> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        conn.transaction::<DomainProduct, RepositoryError, _>(|conn| {
            ensure_category_exists(conn, product.category_id)?;

            let insertable = DbNewProduct::try_from(product)?;
            let changes = DbUpdateProduct {
                category_id: Some(insertable.category_id),
                title: Some(insertable.title),
                name: Some(insertable.name),
                price_cents: Some(insertable.price_cents),
                description: Some(insertable.description),
                stock: None,
                images: Some(insertable.images.clone()),
                updated_at: insertable.updated_at,
            };

            let stored = diesel::insert_into(products::table)
                .values((products::id.eq(id), &insertable))
                .on_conflict(products::id)
                .do_update()
                .set(&changes)
                .get_result::<DbProduct>(conn)?;

            Ok(stored.into())
        })
    }

    fn delete_product(&self, id: i32) -> RepositoryResult<()> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(products::table.filter(products::id.eq(id))).execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn ensure_category_exists(conn: &mut SqliteConnection, category_id: i32) -> RepositoryResult<()> {
    use crate::schema::categories;

    let exists = select(exists(
        categories::table.filter(categories::id.eq(category_id)),
    ))
    .get_result(conn)?;

    if exists {
        Ok(())
    } else {
        Err(RepositoryError::NotFound)
    }
}
