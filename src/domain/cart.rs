use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Largest quantity a single cart line may hold.
pub const MAX_ITEM_QUANTITY: i64 = 10_000;

/// Who a cart belongs to: a signed-in user or an anonymous browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartOwner {
    /// Subject of a verified bearer token.
    User(String),
    /// Opaque key supplied by an anonymous client.
    Session(String),
}

impl CartOwner {
    /// Key persisted on the cart row. Prefixed so user ids and session keys
    /// never collide.
    pub fn key(&self) -> String {
        match self {
            CartOwner::User(sub) => format!("user:{sub}"),
            CartOwner::Session(key) => format!("session:{key}"),
        }
    }

    /// Identifier of the signed-in user, if any.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            CartOwner::User(sub) => Some(sub),
            CartOwner::Session(_) => None,
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Domain representation of a shopping cart and its items.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Cart {
    /// Unique identifier of the cart.
    pub id: i32,
    /// Owner key as produced by [`CartOwner::key`].
    pub owner_key: String,
    /// Items currently in the cart, oldest first.
    pub items: Vec<CartItem>,
    /// Timestamp for when the cart was created.
    pub created_at: NaiveDateTime,
    /// Timestamp for the last change to the cart or its items.
    pub updated_at: NaiveDateTime,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A product and quantity held in a cart.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub product_id: i32,
    /// Always greater than zero.
    pub quantity: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_keys_are_namespaced() {
        let user = CartOwner::User("auth0|42".to_string());
        let session = CartOwner::Session("auth0|42".to_string());

        assert_eq!(user.key(), "user:auth0|42");
        assert_eq!(session.key(), "session:auth0|42");
        assert_ne!(user.key(), session.key());
    }

    #[test]
    fn only_users_expose_an_id() {
        assert_eq!(CartOwner::User("u1".into()).user_id(), Some("u1"));
        assert_eq!(CartOwner::Session("s1".into()).user_id(), None);
    }
}
