use serde::{Deserialize, Serialize};

use crate::categories::repo::{Category, CategoryWithCount};

#[derive(Debug, Deserialize)]
pub struct CategoryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryWithCount>,
}

#[derive(Debug, Serialize)]
pub struct CategoryCreateResponse {
    pub message: String,
    pub category: Category,
}
