use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Local, NaiveDate};
use serde_json::{json, Value};
use sqlx::PgPool;
use tracing::info;

use crate::db::models::assignment::{
    Assignment, HistoryEntry, HistoryParams, ShuffleParams, SwapRequest,
};
use crate::db::queries::{member, task_label, team};
use crate::engine;
use crate::engine::Snapshot;
use crate::utils::api_response::ApiResponse;

/// Failure while assembling the roster snapshot for the engine.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Load the roster snapshot the engine computes over. History is pre-filtered
/// to the recency window; the log is unbounded and the engine never looks
/// further back than 7 days.
pub async fn load_snapshot(pool: &PgPool, target_date: NaiveDate) -> Result<Snapshot, SnapshotError> {
    let teams = team::fetch_teams(pool).await?;
    let members = member::fetch_members(pool).await?;
    let task_labels = task_label::fetch_task_labels(pool).await?;
    let assignments = fetch_assignments(pool).await?;

    let cutoff = target_date - Duration::days(7);
    let history = sqlx::query_as::<_, HistoryEntry>(
        "SELECT team_id, task_label_id, member_id, assigned_date
         FROM assignment_history WHERE assigned_date >= $1",
    )
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    Ok(Snapshot {
        teams,
        members,
        task_labels,
        assignments,
        history,
    })
}

pub async fn fetch_assignments(pool: &PgPool) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(
        "SELECT team_id, task_label_id, member_id, assigned_date FROM assignments",
    )
    .fetch_all(pool)
    .await
}

/// Get the current assignment grid together with the display label set
/// (live labels plus orphaned label ids still present in the grid).
#[utoipa::path(
    get,
    path = "/assignments",
    responses(
        (status = 200, description = "Current assignment grid"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments",
    security(("bearerAuth" = []))
)]
pub async fn get_assignments(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Value>, ApiResponse<()>> {
    let assignments = fetch_assignments(&pool).await.map_err(internal)?;
    let labels = task_label::fetch_task_labels(&pool).await.map_err(internal)?;
    let display = engine::display_labels(&labels, &assignments);

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Assignments retrieved successfully",
        json!({ "assignments": assignments, "displayLabels": display }),
    ))
}

/// Shuffle today's assignments.
///
/// Gates (skipped with `?force=true`): weekdays only, and at most one shuffle
/// per local calendar day. On success the whole grid is replaced and one
/// history row is appended per filled slot, in a single transaction.
#[utoipa::path(
    post,
    path = "/assignments/shuffle",
    params(ShuffleParams),
    responses(
        (status = 200, description = "New assignment grid committed"),
        (status = 409, description = "Weekend, or already shuffled today"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments",
    security(("bearerAuth" = []))
)]
pub async fn shuffle(
    State(pool): State<PgPool>,
    Query(params): Query<ShuffleParams>,
) -> Result<ApiResponse<Value>, ApiResponse<()>> {
    let today = Local::now().date_naive();
    let force = params.force.unwrap_or(false);

    let snapshot = load_snapshot(&pool, today).await.map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load roster snapshot",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    if !force {
        if engine::is_weekend(today) {
            return Err(ApiResponse::error(
                StatusCode::CONFLICT,
                "The roastery rests on weekends",
                None,
            ));
        }
        if engine::already_shuffled_on(&snapshot.assignments, today) {
            return Err(ApiResponse::error(
                StatusCode::CONFLICT,
                "Already shuffled today",
                None,
            ));
        }
    }

    let rows = engine::shuffle_assignments(&snapshot, today, &mut rand::thread_rng());
    let history = engine::history_rows(&rows);

    let mut tx = pool.begin().await.map_err(internal)?;
    sqlx::query("DELETE FROM assignments")
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    for a in &rows {
        sqlx::query(
            "INSERT INTO assignments (team_id, task_label_id, member_id, assigned_date)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&a.team_id)
        .bind(&a.task_label_id)
        .bind(&a.member_id)
        .bind(a.assigned_date)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    }
    for h in &history {
        sqlx::query(
            "INSERT INTO assignment_history (team_id, task_label_id, member_id, assigned_date)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&h.team_id)
        .bind(&h.task_label_id)
        .bind(&h.member_id)
        .bind(h.assigned_date)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    }
    tx.commit().await.map_err(internal)?;

    info!(
        slots = rows.len(),
        filled = history.len(),
        %today,
        "shuffle committed"
    );

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Shuffle committed",
        json!({ "assignments": rows, "historyAppended": history.len() }),
    ))
}

/// Manually exchange the members of two cells within one team.
///
/// This is a direct, unchecked mutation: no history, no recency, and no
/// exclusion check (a manual override trumps the engine's constraints).
/// Missing cells are synthesized with today's date before the exchange.
/// Swapping a cell with itself is a no-op.
#[utoipa::path(
    post,
    path = "/assignments/swap",
    request_body = SwapRequest,
    responses(
        (status = 200, description = "Cells swapped"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments",
    security(("bearerAuth" = []))
)]
pub async fn swap(
    State(pool): State<PgPool>,
    Json(payload): Json<SwapRequest>,
) -> Result<ApiResponse<Value>, ApiResponse<()>> {
    if payload.task_label_id_a == payload.task_label_id_b {
        return Ok(ApiResponse::success(StatusCode::OK, "Nothing to swap", json!({})));
    }
    let today = Local::now().date_naive();

    let mut tx = pool.begin().await.map_err(internal)?;
    let member_a = cell_member(&mut tx, &payload.team_id, &payload.task_label_id_a).await?;
    let member_b = cell_member(&mut tx, &payload.team_id, &payload.task_label_id_b).await?;

    set_cell(&mut tx, &payload.team_id, &payload.task_label_id_a, &member_b, today).await?;
    set_cell(&mut tx, &payload.team_id, &payload.task_label_id_b, &member_a, today).await?;
    tx.commit().await.map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Cells swapped",
        json!({
            "teamId": payload.team_id,
            "cells": [
                { "taskLabelId": payload.task_label_id_a, "memberId": member_b },
                { "taskLabelId": payload.task_label_id_b, "memberId": member_a },
            ]
        }),
    ))
}

/// First-match read of a cell's member (duplicate rows are tolerated).
async fn cell_member(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    team_id: &str,
    task_label_id: &str,
) -> Result<Option<String>, ApiResponse<()>> {
    let member: Option<Option<String>> = sqlx::query_scalar(
        "SELECT member_id FROM assignments
         WHERE team_id = $1 AND task_label_id = $2 LIMIT 1",
    )
    .bind(team_id)
    .bind(task_label_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(internal)?;
    Ok(member.flatten())
}

/// Write a cell's member, synthesizing the row if the cell does not exist yet.
async fn set_cell(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    team_id: &str,
    task_label_id: &str,
    member_id: &Option<String>,
    today: NaiveDate,
) -> Result<(), ApiResponse<()>> {
    let updated = sqlx::query(
        "UPDATE assignments SET member_id = $1
         WHERE team_id = $2 AND task_label_id = $3",
    )
    .bind(member_id)
    .bind(team_id)
    .bind(task_label_id)
    .execute(&mut **tx)
    .await
    .map_err(internal)?;

    if updated.rows_affected() == 0 {
        sqlx::query(
            "INSERT INTO assignments (team_id, task_label_id, member_id, assigned_date)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(team_id)
        .bind(task_label_id)
        .bind(member_id)
        .bind(today)
        .execute(&mut **tx)
        .await
        .map_err(internal)?;
    }
    Ok(())
}

/// Read back the fairness log, newest first
#[utoipa::path(
    get,
    path = "/assignments/history",
    params(HistoryParams),
    responses(
        (status = 200, description = "History entries", body = [HistoryEntry]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Assignments",
    security(("bearerAuth" = []))
)]
pub async fn get_history(
    State(pool): State<PgPool>,
    Query(params): Query<HistoryParams>,
) -> Result<ApiResponse<Vec<HistoryEntry>>, ApiResponse<()>> {
    let days = params.days.unwrap_or(30).max(1);
    let cutoff = Local::now().date_naive() - Duration::days(days);
    let entries = sqlx::query_as::<_, HistoryEntry>(
        "SELECT team_id, task_label_id, member_id, assigned_date
         FROM assignment_history WHERE assigned_date >= $1
         ORDER BY assigned_date DESC",
    )
    .bind(cutoff)
    .fetch_all(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "History retrieved successfully",
        entries,
    ))
}

fn internal(e: sqlx::Error) -> ApiResponse<()> {
    ApiResponse::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error",
        Some(json!({ "error": e.to_string() })),
    )
}
