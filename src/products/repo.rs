use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::products::dto::NewProduct;
use crate::products::query::ProductListing;

/// A product row as stored, without the joined display names.
#[derive(Debug, Serialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub created_by: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A product row joined with its category and creator names, as returned by
/// the listing and detail endpoints. Both joins are LEFT JOINs, so the names
/// are null for uncategorized or orphaned rows.
#[derive(Debug, Serialize, FromRow)]
pub struct ProductDetail {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub category_id: Option<i32>,
    pub created_by: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub category_name: Option<String>,
    pub creator_name: Option<String>,
}

/// The remnant of a deleted product, echoed back in the delete response.
#[derive(Debug, Serialize, FromRow)]
pub struct DeletedProduct {
    pub id: i32,
    pub name: String,
}

pub async fn count(db: &PgPool, listing: &ProductListing) -> sqlx::Result<i64> {
    let sql = listing.count_sql();
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(pattern) = listing.pattern() {
        query = query.bind(pattern);
    }
    if let Some(category_id) = listing.category_id() {
        query = query.bind(category_id);
    }
    query.fetch_one(db).await
}

pub async fn fetch_page(db: &PgPool, listing: &ProductListing) -> sqlx::Result<Vec<ProductDetail>> {
    let sql = listing.page_sql();
    let mut query = sqlx::query_as::<_, ProductDetail>(&sql);
    if let Some(pattern) = listing.pattern() {
        query = query.bind(pattern);
    }
    if let Some(category_id) = listing.category_id() {
        query = query.bind(category_id);
    }
    query
        .bind(listing.limit())
        .bind(listing.offset())
        .fetch_all(db)
        .await
}

pub async fn find_detail(db: &PgPool, id: i32) -> sqlx::Result<Option<ProductDetail>> {
    sqlx::query_as::<_, ProductDetail>(
        r#"
        SELECT p.id, p.name, p.description, p.price, p.stock, p.category_id, p.created_by,
               p.created_at, p.updated_at, c.name AS category_name, u.name AS creator_name
        FROM products p
        LEFT JOIN categories c ON p.category_id = c.id
        LEFT JOIN users u ON p.created_by = u.id
        WHERE p.id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn exists(db: &PgPool, id: i32) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
        .bind(id)
        .fetch_one(db)
        .await
}

pub async fn insert(db: &PgPool, new: &NewProduct, created_by: i32) -> sqlx::Result<Product> {
    sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, description, price, stock, category_id, created_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, description, price, stock, category_id, created_by,
                  created_at, updated_at
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price)
    .bind(new.stock)
    .bind(new.category_id)
    .bind(created_by)
    .fetch_one(db)
    .await
}

pub async fn update(db: &PgPool, id: i32, new: &NewProduct) -> sqlx::Result<Option<Product>> {
    sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $1, description = $2, price = $3, stock = $4, category_id = $5,
            updated_at = NOW()
        WHERE id = $6
        RETURNING id, name, description, price, stock, category_id, created_by,
                  created_at, updated_at
        "#,
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.price)
    .bind(new.stock)
    .bind(new.category_id)
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: i32) -> sqlx::Result<Option<DeletedProduct>> {
    sqlx::query_as::<_, DeletedProduct>(
        "DELETE FROM products WHERE id = $1 RETURNING id, name",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
