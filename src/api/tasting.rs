use crate::db::models::tasting::{
    AverageScores, NewTastingRecord, NewTastingSession, TastingRecord, TastingSession,
    UpdateTastingRecord, UpdateTastingSession,
};
use crate::db::queries::tasting::{
    create_record, create_session, delete_record, delete_session, get_record, get_records,
    get_session, get_session_averages, get_sessions, update_record, update_session,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;

/// Register tasting routes
pub fn tasting_routes() -> Router<PgPool> {
    Router::new()
        .route(
            "/tastings/sessions",
            post(create_session).get(get_sessions),
        )
        .route(
            "/tastings/sessions/{session_id}",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route(
            "/tastings/sessions/{session_id}/averages",
            get(get_session_averages),
        )
        .route("/tastings/records", post(create_record).get(get_records))
        .route(
            "/tastings/records/{record_id}",
            get(get_record)
                .put(update_record)
                .delete(delete_record),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::db::queries::tasting::create_session,
        crate::db::queries::tasting::get_sessions,
        crate::db::queries::tasting::get_session,
        crate::db::queries::tasting::update_session,
        crate::db::queries::tasting::delete_session,
        crate::db::queries::tasting::get_session_averages,
        crate::db::queries::tasting::create_record,
        crate::db::queries::tasting::get_records,
        crate::db::queries::tasting::get_record,
        crate::db::queries::tasting::update_record,
        crate::db::queries::tasting::delete_record,
    ),
    components(schemas(
        TastingSession,
        NewTastingSession,
        UpdateTastingSession,
        TastingRecord,
        NewTastingRecord,
        UpdateTastingRecord,
        AverageScores
    ))
)]
pub struct TastingDoc;
