use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    extract::{JsonBody, PathParam, QueryParams},
    products::dto::{
        ListParams, ProductDeleteResponse, ProductDetailResponse, ProductListResponse,
        ProductMutationResponse, ProductPayload,
    },
    products::query::ProductListing,
    products::repo,
    state::AppState,
};

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

// --- handlers ---

#[instrument(skip(state, _user))]
pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<ProductListResponse>, ApiError> {
    let listing = ProductListing::from_params(&params)?;
    let total = repo::count(&state.db, &listing).await?;
    let products = repo::fetch_page(&state.db, &listing).await?;
    Ok(Json(ProductListResponse {
        products,
        pagination: listing.pagination(total),
    }))
}

#[instrument(skip(state, user, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    JsonBody(payload): JsonBody<ProductPayload>,
) -> Result<(StatusCode, Json<ProductMutationResponse>), ApiError> {
    let new = payload.validate()?;
    let product = repo::insert(&state.db, &new, user.0.id).await?;
    info!(product_id = product.id, user_id = user.0.id, "product created");
    Ok((
        StatusCode::CREATED,
        Json(ProductMutationResponse {
            message: "Product created successfully".to_string(),
            product,
        }),
    ))
}

#[instrument(skip(state, _user))]
pub async fn get_product(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ProductDetailResponse>, ApiError> {
    let product = repo::find_detail(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product not found"))?;
    Ok(Json(ProductDetailResponse { product }))
}

/// Existence is checked before the body is validated, so updating a missing
/// product reports 404 even when the payload is also invalid.
#[instrument(skip(state, _user, payload))]
pub async fn update_product(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(id): PathParam<i32>,
    JsonBody(payload): JsonBody<ProductPayload>,
) -> Result<Json<ProductMutationResponse>, ApiError> {
    if !repo::exists(&state.db, id).await? {
        return Err(ApiError::NotFound("Product not found"));
    }
    let new = payload.validate()?;
    let product = repo::update(&state.db, id, &new)
        .await?
        .ok_or(ApiError::NotFound("Product not found"))?;
    info!(product_id = id, "product updated");
    Ok(Json(ProductMutationResponse {
        message: "Product updated successfully".to_string(),
        product,
    }))
}

#[instrument(skip(state, _user))]
pub async fn delete_product(
    State(state): State<AppState>,
    _user: AuthUser,
    PathParam(id): PathParam<i32>,
) -> Result<Json<ProductDeleteResponse>, ApiError> {
    let product = repo::delete(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Product not found"))?;
    info!(product_id = id, "product deleted");
    Ok(Json(ProductDeleteResponse {
        message: "Product deleted successfully".to_string(),
        product,
    }))
}
