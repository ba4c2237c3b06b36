use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::category::{Category, CategoryListQuery};
use crate::forms::categories::CategoryForm;
use crate::identity::{AuthenticatedUser, check_role};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{CategoryReader, CategoryWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the category list.
#[derive(Debug, Default, Deserialize)]
pub struct CategoriesQuery {
    /// Optional substring matched against category names.
    pub search: Option<String>,
    /// Page requested by the client (1-based).
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Lists categories ordered by name.
pub fn list_categories<R>(repo: &R, query: CategoriesQuery) -> ServiceResult<Paginated<Category>>
where
    R: CategoryReader + ?Sized,
{
    let pagination = Pagination::new(query.page, query.per_page);
    let mut list_query = CategoryListQuery::new().paginate(pagination);

    if let Some(term) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        list_query = list_query.search(term);
    }

    let (total, categories) = repo.list_categories(list_query)?;

    Ok(Paginated::new(categories, pagination, total))
}

pub fn get_category<R>(repo: &R, category_id: i32) -> ServiceResult<Category>
where
    R: CategoryReader + ?Sized,
{
    repo.get_category_by_id(category_id)?
        .ok_or(ServiceError::NotFound)
}

/// Creates a category. Requires the service access role.
pub fn create_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_category = form
        .into_new_category()
        .map_err(|err| ServiceError::Form(err.field_errors()))?;

    let category = repo.create_category(&new_category)?;
    log::info!("User {} created category {}", user.sub, category.id);

    Ok(category)
}

/// Replaces the name and image of a category.
pub fn update_category<R>(
    repo: &R,
    user: &AuthenticatedUser,
    category_id: i32,
    form: CategoryForm,
) -> ServiceResult<Category>
where
    R: CategoryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_category()
        .map_err(|err| ServiceError::Form(err.field_errors()))?;

    repo.update_category(category_id, &updates)
        .map_err(ServiceError::from)
}

/// Deletes a category together with its products.
pub fn delete_category<R>(repo: &R, user: &AuthenticatedUser, category_id: i32) -> ServiceResult<()>
where
    R: CategoryWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_category(category_id)?;
    log::info!("User {} deleted category {category_id}", user.sub);

    Ok(())
}
