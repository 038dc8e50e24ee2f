use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    categories::dto::{CategoryCreateResponse, CategoryListResponse, CategoryPayload},
    categories::repo,
    error::ApiError,
    extract::JsonBody,
    state::AppState,
};

pub fn category_routes() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories).post(create_category))
}

// --- handlers ---

#[instrument(skip(state, _user))]
pub async fn list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = repo::list_with_counts(&state.db).await?;
    Ok(Json(CategoryListResponse { categories }))
}

#[instrument(skip(state, _user, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    JsonBody(payload): JsonBody<CategoryPayload>,
) -> Result<(StatusCode, Json<CategoryCreateResponse>), ApiError> {
    let name = payload
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation("Category name is required"))?;
    // Names are compared exactly; the unique constraint backs this up for
    // concurrent inserts.
    if repo::name_exists(&state.db, &name).await? {
        return Err(ApiError::Conflict("Category already exists"));
    }
    let description = payload.description.filter(|d| !d.is_empty());
    let category = repo::insert(&state.db, &name, description.as_deref()).await?;
    info!(category_id = category.id, name = %category.name, "category created");
    Ok((
        StatusCode::CREATED,
        Json(CategoryCreateResponse {
            message: "Category created successfully".to_string(),
            category,
        }),
    ))
}
