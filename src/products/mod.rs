mod dto;
pub mod handlers;
pub mod query;
mod repo;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::product_routes()
}
