use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Serialize, FromRow)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Category plus how many products currently reference it.
#[derive(Debug, Serialize, FromRow)]
pub struct CategoryWithCount {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub product_count: i64,
}

pub async fn list_with_counts(db: &PgPool) -> sqlx::Result<Vec<CategoryWithCount>> {
    sqlx::query_as::<_, CategoryWithCount>(
        r#"
        SELECT c.id, c.name, c.description, c.created_at, COUNT(p.id) AS product_count
        FROM categories c
        LEFT JOIN products p ON p.category_id = c.id
        GROUP BY c.id
        ORDER BY c.name ASC
        "#,
    )
    .fetch_all(db)
    .await
}

pub async fn name_exists(db: &PgPool, name: &str) -> sqlx::Result<bool> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
        .bind(name)
        .fetch_one(db)
        .await
}

pub async fn insert(db: &PgPool, name: &str, description: Option<&str>) -> sqlx::Result<Category> {
    sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, created_at
        "#,
    )
    .bind(name)
    .bind(description)
    .fetch_one(db)
    .await
}
