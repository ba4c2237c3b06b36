use diesel::prelude::*;

use crate::domain::category::{
    Category as DomainCategory, CategoryListQuery, NewCategory as DomainNewCategory,
    UpdateCategory as DomainUpdateCategory,
};
use crate::models::category::{
    Category as DbCategory, NewCategory as DbNewCategory, UpdateCategory as DbUpdateCategory,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    CategoryReader, CategoryWriter, DieselRepository, LIKE_ESCAPE, contains_pattern,
};

impl CategoryReader for DieselRepository {
    fn get_category_by_id(&self, id: i32) -> RepositoryResult<Option<DomainCategory>> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let category = categories::table
            .filter(categories::id.eq(id))
            .first::<DbCategory>(&mut conn)
            .optional()?;

        Ok(category.map(DomainCategory::from))
    }

    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainCategory>)> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let pattern = query.search.as_deref().map(contains_pattern);

        let mut count_query = categories::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(pattern) = pattern.as_ref() {
            count_query =
                count_query.filter(categories::name.like(pattern.clone()).escape(LIKE_ESCAPE));
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items_query = categories::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(pattern) = pattern.as_ref() {
            items_query =
                items_query.filter(categories::name.like(pattern.clone()).escape(LIKE_ESCAPE));
        }

        items_query = items_query.order(categories::name.asc());

        if let Some(pagination) = &query.pagination {
            items_query = items_query
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let categories = items_query
            .load::<DbCategory>(&mut conn)?
            .into_iter()
            .map(DomainCategory::from)
            .collect();

        Ok((total, categories))
    }
}

impl CategoryWriter for DieselRepository {
    fn create_category(
        &self,
        new_category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let insertable = DbNewCategory::from(new_category);

        let created = diesel::insert_into(categories::table)
            .values(&insertable)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(created.into())
    }

    fn update_category(
        &self,
        id: i32,
        updates: &DomainUpdateCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let db_updates = DbUpdateCategory::from(updates);

        let updated = diesel::update(categories::table.filter(categories::id.eq(id)))
            .set(&db_updates)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(updated.into())
    }

    fn upsert_category(
        &self,
        id: i32,
        category: &DomainNewCategory,
    ) -> RepositoryResult<DomainCategory> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let insertable = DbNewCategory::from(category);
        let changes = DbUpdateCategory {
            name: insertable.name,
            image: insertable.image,
            updated_at: insertable.updated_at,
        };

        let stored = diesel::insert_into(categories::table)
            .values((categories::id.eq(id), &insertable))
            .on_conflict(categories::id)
            .do_update()
            .set(&changes)
            .get_result::<DbCategory>(&mut conn)?;

        Ok(stored.into())
    }

    fn delete_category(&self, id: i32) -> RepositoryResult<()> {
        use crate::schema::categories;

        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(categories::table.filter(categories::id.eq(id))).execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
