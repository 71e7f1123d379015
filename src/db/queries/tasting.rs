use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::Claims;
use crate::db::models::tasting::{
    average_scores, AverageScores, NewTastingRecord, NewTastingSession, TastingRecord,
    TastingSession, UpdateTastingRecord, UpdateTastingSession,
};
use crate::utils::api_response::ApiResponse;

const SESSION_COLUMNS: &str =
    "id, name, bean_name, roast_level, memo, user_id, created_at, updated_at";
const RECORD_COLUMNS: &str = "id, session_id, bean_name, tasting_date, roast_level, bitterness, \
     acidity, body, sweetness, aroma, overall_rating, overall_impression, user_id, member_id, \
     created_at, updated_at";

/// Create a tasting session
#[utoipa::path(
    post,
    path = "/tastings/sessions",
    request_body = NewTastingSession,
    responses(
        (status = 201, description = "Session created successfully", body = TastingSession),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn create_session(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewTastingSession>,
) -> Result<ApiResponse<TastingSession>, ApiResponse<()>> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();
    let session = sqlx::query_as::<_, TastingSession>(&format!(
        "INSERT INTO tasting_sessions (id, name, bean_name, roast_level, memo, user_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(&id)
    .bind(&payload.name)
    .bind(&payload.bean_name)
    .bind(&payload.roast_level)
    .bind(&payload.memo)
    .bind(&claims.sub)
    .bind(now)
    .fetch_one(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Session created successfully",
        session,
    ))
}

/// List tasting sessions, newest first
#[utoipa::path(
    get,
    path = "/tastings/sessions",
    responses(
        (status = 200, description = "Sessions retrieved successfully", body = [TastingSession]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn get_sessions(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<TastingSession>>, ApiResponse<()>> {
    let sessions = sqlx::query_as::<_, TastingSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM tasting_sessions ORDER BY created_at DESC"
    ))
    .fetch_all(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Sessions retrieved successfully",
        sessions,
    ))
}

/// Get one session together with its records
#[utoipa::path(
    get,
    path = "/tastings/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session found"),
        (status = 404, description = "Session not found")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn get_session(
    State(pool): State<PgPool>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiResponse<()>> {
    let session = sqlx::query_as::<_, TastingSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM tasting_sessions WHERE id = $1"
    ))
    .bind(&session_id)
    .fetch_optional(&pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Session not found", None))?;

    let records = fetch_session_records(&pool, &session_id).await.map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Session found",
        json!({ "session": session, "records": records, "recordCount": records.len() }),
    ))
}

/// Update a session
#[utoipa::path(
    put,
    path = "/tastings/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Session ID")),
    request_body = UpdateTastingSession,
    responses(
        (status = 200, description = "Session updated successfully"),
        (status = 404, description = "Session not found")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn update_session(
    State(pool): State<PgPool>,
    Path(session_id): Path<String>,
    Json(payload): Json<UpdateTastingSession>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query(
        "UPDATE tasting_sessions SET
            name = COALESCE($1, name),
            bean_name = COALESCE($2, bean_name),
            roast_level = COALESCE($3, roast_level),
            memo = COALESCE($4, memo),
            updated_at = $5
         WHERE id = $6",
    )
    .bind(payload.name)
    .bind(payload.bean_name)
    .bind(payload.roast_level)
    .bind(payload.memo)
    .bind(Utc::now().naive_utc())
    .bind(&session_id)
    .execute(&pool)
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Session not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Session updated successfully",
        (),
    ))
}

/// Delete a session (records cascade)
#[utoipa::path(
    delete,
    path = "/tastings/sessions/{session_id}",
    params(("session_id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session deleted successfully"),
        (status = 404, description = "Session not found")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn delete_session(
    State(pool): State<PgPool>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM tasting_sessions WHERE id = $1")
        .bind(&session_id)
        .execute(&pool)
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Session not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Session deleted successfully",
        (),
    ))
}

/// Per-axis average scores for a session (radar-chart input)
#[utoipa::path(
    get,
    path = "/tastings/sessions/{session_id}/averages",
    params(("session_id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Average scores", body = AverageScores),
        (status = 404, description = "Session not found")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn get_session_averages(
    State(pool): State<PgPool>,
    Path(session_id): Path<String>,
) -> Result<ApiResponse<AverageScores>, ApiResponse<()>> {
    let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM tasting_sessions WHERE id = $1")
        .bind(&session_id)
        .fetch_optional(&pool)
        .await
        .map_err(internal)?;
    if exists.is_none() {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Session not found",
            None,
        ));
    }

    let records = fetch_session_records(&pool, &session_id).await.map_err(internal)?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Average scores computed",
        average_scores(&records),
    ))
}

/// Record a member's tasting scores
#[utoipa::path(
    post,
    path = "/tastings/records",
    request_body = NewTastingRecord,
    responses(
        (status = 201, description = "Record created successfully", body = TastingRecord),
        (status = 400, description = "Session or member does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn create_record(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewTastingRecord>,
) -> Result<ApiResponse<TastingRecord>, ApiResponse<()>> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();
    let record = sqlx::query_as::<_, TastingRecord>(&format!(
        "INSERT INTO tasting_records
            (id, session_id, bean_name, tasting_date, roast_level, bitterness, acidity, body,
             sweetness, aroma, overall_rating, overall_impression, user_id, member_id,
             created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $15)
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(&id)
    .bind(&payload.session_id)
    .bind(&payload.bean_name)
    .bind(payload.tasting_date)
    .bind(&payload.roast_level)
    .bind(payload.bitterness)
    .bind(payload.acidity)
    .bind(payload.body)
    .bind(payload.sweetness)
    .bind(payload.aroma)
    .bind(payload.overall_rating)
    .bind(&payload.overall_impression)
    .bind(&claims.sub)
    .bind(&payload.member_id)
    .bind(now)
    .fetch_one(&pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Session or member does not exist",
            None,
        ),
        e => internal(e),
    })?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Record created successfully",
        record,
    ))
}

/// List all tasting records, newest first
#[utoipa::path(
    get,
    path = "/tastings/records",
    responses(
        (status = 200, description = "Records retrieved successfully", body = [TastingRecord]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn get_records(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<TastingRecord>>, ApiResponse<()>> {
    let records = sqlx::query_as::<_, TastingRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM tasting_records ORDER BY created_at DESC"
    ))
    .fetch_all(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Records retrieved successfully",
        records,
    ))
}

/// Get one tasting record
#[utoipa::path(
    get,
    path = "/tastings/records/{record_id}",
    params(("record_id" = String, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record found", body = TastingRecord),
        (status = 404, description = "Record not found")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn get_record(
    State(pool): State<PgPool>,
    Path(record_id): Path<String>,
) -> Result<ApiResponse<TastingRecord>, ApiResponse<()>> {
    let record = sqlx::query_as::<_, TastingRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM tasting_records WHERE id = $1"
    ))
    .bind(&record_id)
    .fetch_optional(&pool)
    .await
    .map_err(internal)?;

    match record {
        Some(record) => Ok(ApiResponse::success(StatusCode::OK, "Record found", record)),
        None => Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Record not found",
            None,
        )),
    }
}

/// Update a tasting record
#[utoipa::path(
    put,
    path = "/tastings/records/{record_id}",
    params(("record_id" = String, Path, description = "Record ID")),
    request_body = UpdateTastingRecord,
    responses(
        (status = 200, description = "Record updated successfully"),
        (status = 404, description = "Record not found")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn update_record(
    State(pool): State<PgPool>,
    Path(record_id): Path<String>,
    Json(payload): Json<UpdateTastingRecord>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query(
        "UPDATE tasting_records SET
            bean_name = COALESCE($1, bean_name),
            tasting_date = COALESCE($2, tasting_date),
            roast_level = COALESCE($3, roast_level),
            bitterness = COALESCE($4, bitterness),
            acidity = COALESCE($5, acidity),
            body = COALESCE($6, body),
            sweetness = COALESCE($7, sweetness),
            aroma = COALESCE($8, aroma),
            overall_rating = COALESCE($9, overall_rating),
            overall_impression = COALESCE($10, overall_impression),
            member_id = COALESCE($11, member_id),
            updated_at = $12
         WHERE id = $13",
    )
    .bind(payload.bean_name)
    .bind(payload.tasting_date)
    .bind(payload.roast_level)
    .bind(payload.bitterness)
    .bind(payload.acidity)
    .bind(payload.body)
    .bind(payload.sweetness)
    .bind(payload.aroma)
    .bind(payload.overall_rating)
    .bind(payload.overall_impression)
    .bind(payload.member_id)
    .bind(Utc::now().naive_utc())
    .bind(&record_id)
    .execute(&pool)
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Record not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Record updated successfully",
        (),
    ))
}

/// Delete a tasting record
#[utoipa::path(
    delete,
    path = "/tastings/records/{record_id}",
    params(("record_id" = String, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record deleted successfully"),
        (status = 404, description = "Record not found")
    ),
    tag = "Tastings",
    security(("bearerAuth" = []))
)]
pub async fn delete_record(
    State(pool): State<PgPool>,
    Path(record_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM tasting_records WHERE id = $1")
        .bind(&record_id)
        .execute(&pool)
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Record not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Record deleted successfully",
        (),
    ))
}

async fn fetch_session_records(
    pool: &PgPool,
    session_id: &str,
) -> Result<Vec<TastingRecord>, sqlx::Error> {
    sqlx::query_as::<_, TastingRecord>(&format!(
        "SELECT {RECORD_COLUMNS} FROM tasting_records
         WHERE session_id = $1 ORDER BY created_at"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await
}

fn internal(e: sqlx::Error) -> ApiResponse<()> {
    ApiResponse::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error",
        Some(json!({ "error": e.to_string() })),
    )
}
