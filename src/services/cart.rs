use crate::domain::cart::{Cart, CartItem, CartOwner};
use crate::forms::cart::{AddCartItemForm, UpdateCartItemForm};
use crate::repository::{CartReader, CartWriter};
use crate::services::{ServiceError, ServiceResult};

/// Returns the caller's cart, creating an empty one on first use.
pub fn get_or_create_cart<R>(repo: &R, owner: &CartOwner) -> ServiceResult<Cart>
where
    R: CartWriter + ?Sized,
{
    repo.get_or_create_cart(&owner.key())
        .map_err(ServiceError::from)
}

/// Returns the caller's cart without creating one.
pub fn get_cart<R>(repo: &R, owner: &CartOwner) -> ServiceResult<Cart>
where
    R: CartReader + ?Sized,
{
    repo.get_cart_by_owner(&owner.key())?
        .ok_or(ServiceError::NotFound)
}

/// Items in the caller's cart. A caller without a cart has no items.
pub fn list_cart_items<R>(repo: &R, owner: &CartOwner) -> ServiceResult<Vec<CartItem>>
where
    R: CartReader + ?Sized,
{
    Ok(repo
        .get_cart_by_owner(&owner.key())?
        .map(|cart| cart.items)
        .unwrap_or_default())
}

/// Adds a product to the caller's cart, increasing the quantity when the
/// product is already there.
pub fn add_item<R>(repo: &R, owner: &CartOwner, form: AddCartItemForm) -> ServiceResult<CartItem>
where
    R: CartWriter + ?Sized,
{
    form.check().map_err(ServiceError::Form)?;

    let cart = repo.get_or_create_cart(&owner.key())?;

    if form.cart.is_some_and(|cart_id| cart_id != cart.id) {
        return Err(ServiceError::NotFound);
    }

    let item = repo.add_cart_item(cart.id, form.product, form.quantity)?;
    log::debug!(
        "Cart {} now holds {} of product {}",
        cart.id,
        item.quantity,
        item.product_id
    );

    Ok(item)
}

/// Sets the quantity of an item in the caller's cart.
pub fn update_item_quantity<R>(
    repo: &R,
    owner: &CartOwner,
    item_id: i32,
    form: UpdateCartItemForm,
) -> ServiceResult<CartItem>
where
    R: CartReader + CartWriter + ?Sized,
{
    form.check().map_err(ServiceError::Form)?;

    let cart = get_cart(repo, owner)?;

    repo.update_cart_item(item_id, cart.id, form.quantity)
        .map_err(ServiceError::from)
}

/// Removes an item from the caller's cart.
pub fn remove_item<R>(repo: &R, owner: &CartOwner, item_id: i32) -> ServiceResult<()>
where
    R: CartReader + CartWriter + ?Sized,
{
    let cart = get_cart(repo, owner)?;

    repo.remove_cart_item(item_id, cart.id)
        .map_err(ServiceError::from)
}
