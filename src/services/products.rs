use serde::Deserialize;

use crate::SERVICE_ACCESS_ROLE;
use crate::domain::product::{Product, ProductListQuery};
use crate::forms::products::ProductForm;
use crate::identity::{AuthenticatedUser, check_role};
use crate::pagination::{Paginated, Pagination};
use crate::repository::{ProductReader, ProductWriter};
use crate::services::{ServiceError, ServiceResult};

/// Query parameters accepted by the product list.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    /// Restrict the list to one category.
    #[serde(alias = "category")]
    pub category_id: Option<i32>,
    /// Substring matched against title and name.
    pub search: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

/// Lists products, newest first.
pub fn list_products<R>(repo: &R, query: ProductsQuery) -> ServiceResult<Paginated<Product>>
where
    R: ProductReader + ?Sized,
{
    let ProductsQuery {
        category_id,
        search,
        page,
        per_page,
    } = query;

    let pagination = Pagination::new(page, per_page);
    let mut list_query = ProductListQuery::new().paginate(pagination);

    if let Some(category_id) = category_id {
        list_query = list_query.category_id(category_id);
    }

    if let Some(term) = search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
    {
        list_query = list_query.search(term);
    }

    let (total, products) = repo.list_products(list_query)?;

    Ok(Paginated::new(products, pagination, total))
}

pub fn get_product<R>(repo: &R, product_id: i32) -> ServiceResult<Product>
where
    R: ProductReader + ?Sized,
{
    repo.get_product_by_id(product_id)?
        .ok_or(ServiceError::NotFound)
}

/// Creates a product in an existing category.
pub fn create_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let new_product = form
        .into_new_product()
        .map_err(|err| ServiceError::Form(err.field_errors()))?;

    let product = repo.create_product(&new_product)?;
    log::info!("User {} created product {}", user.sub, product.id);

    Ok(product)
}

/// Replaces every editable field of a product.
pub fn update_product<R>(
    repo: &R,
    user: &AuthenticatedUser,
    product_id: i32,
    form: ProductForm,
) -> ServiceResult<Product>
where
    R: ProductWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    let updates = form
        .into_update_product()
        .map_err(|err| ServiceError::Form(err.field_errors()))?;

    repo.update_product(product_id, &updates)
        .map_err(ServiceError::from)
}

/// Deletes a product. Products referenced by placed orders cannot be deleted.
pub fn delete_product<R>(repo: &R, user: &AuthenticatedUser, product_id: i32) -> ServiceResult<()>
where
    R: ProductWriter + ?Sized,
{
    if !check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        return Err(ServiceError::Unauthorized);
    }

    repo.delete_product(product_id)?;
    log::info!("User {} deleted product {product_id}", user.sub);

    Ok(())
}
