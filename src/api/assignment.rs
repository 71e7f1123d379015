use crate::db::models::assignment::{Assignment, HistoryEntry, SwapRequest};
use crate::db::queries::assignment::{get_assignments, get_history, shuffle, swap};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;

/// Register assignment grid routes
pub fn assignment_routes() -> Router<PgPool> {
    Router::new()
        .route("/assignments", get(get_assignments))
        .route("/assignments/shuffle", post(shuffle))
        .route("/assignments/swap", post(swap))
        .route("/assignments/history", get(get_history))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::db::queries::assignment::get_assignments,
        crate::db::queries::assignment::shuffle,
        crate::db::queries::assignment::swap,
        crate::db::queries::assignment::get_history,
    ),
    components(schemas(Assignment, HistoryEntry, SwapRequest))
)]
pub struct AssignmentDoc;
