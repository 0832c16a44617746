mod dto;
pub mod handlers;
pub mod policy;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::document_routes())
}
