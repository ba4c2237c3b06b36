use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::money::{AmountOutOfRange, from_cents, to_cents};
use crate::domain::product::{
    NewProduct as DomainNewProduct, Product as DomainProduct, UpdateProduct as DomainUpdateProduct,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::products)]
pub struct Product {
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    pub name: String,
    pub price_cents: i64,
    pub description: String,
    pub stock: i64,
    /// JSON array of image URLs.
    pub images: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::products)]
pub struct NewProduct<'a> {
    pub category_id: i32,
    pub title: &'a str,
    pub name: &'a str,
    pub price_cents: i64,
    pub description: &'a str,
    pub stock: i64,
    pub images: String,
    pub updated_at: NaiveDateTime,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::products)]
pub struct UpdateProduct<'a> {
    pub category_id: Option<i32>,
    pub title: Option<&'a str>,
    pub name: Option<&'a str>,
    pub price_cents: Option<i64>,
    pub description: Option<&'a str>,
    pub stock: Option<i64>,
    pub images: Option<String>,
    pub updated_at: NaiveDateTime,
}

fn encode_images(images: &[String]) -> String {
    serde_json::to_string(images).unwrap_or_else(|_| "[]".to_string())
}

fn decode_images(raw: &str) -> Vec<String> {
    match serde_json::from_str(raw) {
        Ok(images) => images,
        Err(err) => {
            log::warn!("Discarding malformed product images `{raw}`: {err}");
            Vec::new()
        }
    }
}

impl From<Product> for DomainProduct {
    fn from(value: Product) -> Self {
        let images = decode_images(&value.images);
        Self {
            id: value.id,
            category_id: value.category_id,
            title: value.title,
            name: value.name,
            price: from_cents(value.price_cents),
            description: value.description,
            stock: value.stock,
            images,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> TryFrom<&'a DomainNewProduct> for NewProduct<'a> {
    type Error = AmountOutOfRange;

    fn try_from(value: &'a DomainNewProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            category_id: value.category_id,
            title: value.title.as_str(),
            name: value.name.as_str(),
            price_cents: to_cents(value.price)?,
            description: value.description.as_str(),
            stock: value.stock,
            images: encode_images(&value.images),
            updated_at: value.updated_at,
        })
    }
}

impl<'a> TryFrom<&'a DomainUpdateProduct> for UpdateProduct<'a> {
    type Error = AmountOutOfRange;

    fn try_from(value: &'a DomainUpdateProduct) -> Result<Self, Self::Error> {
        Ok(Self {
            category_id: value.category_id,
            title: value.title.as_deref(),
            name: value.name.as_deref(),
            price_cents: value.price.map(to_cents).transpose()?,
            description: value.description.as_deref(),
            stock: value.stock,
            images: value.images.as_deref().map(encode_images),
            updated_at: value.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn images_survive_the_text_column() {
        let images = vec![
            "https://cdn.example.com/a.png".to_string(),
            "https://cdn.example.com/b.png".to_string(),
        ];

        assert_eq!(decode_images(&encode_images(&images)), images);
    }

    #[test]
    fn malformed_images_decode_to_empty_list() {
        assert!(decode_images("{not json").is_empty());
    }
}
