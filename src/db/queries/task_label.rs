use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::task_label::{NewTaskLabel, TaskLabel, UpdateTaskLabel};
use crate::utils::api_response::ApiResponse;

pub async fn fetch_task_labels(pool: &PgPool) -> Result<Vec<TaskLabel>, sqlx::Error> {
    sqlx::query_as::<_, TaskLabel>(
        "SELECT id, left_label, right_label, sort_order FROM task_labels
         ORDER BY sort_order NULLS LAST, left_label",
    )
    .fetch_all(pool)
    .await
}

/// Create a task label
#[utoipa::path(
    post,
    path = "/task-labels",
    request_body = NewTaskLabel,
    responses(
        (status = 201, description = "Task label created successfully", body = TaskLabel),
        (status = 500, description = "Internal server error")
    ),
    tag = "TaskLabels",
    security(("bearerAuth" = []))
)]
pub async fn create_task_label(
    State(pool): State<PgPool>,
    Json(payload): Json<NewTaskLabel>,
) -> Result<ApiResponse<TaskLabel>, ApiResponse<()>> {
    let id = Uuid::new_v4().to_string();
    let label = sqlx::query_as::<_, TaskLabel>(
        "INSERT INTO task_labels (id, left_label, right_label, sort_order)
         VALUES ($1, $2, $3, $4)
         RETURNING id, left_label, right_label, sort_order",
    )
    .bind(&id)
    .bind(&payload.left_label)
    .bind(&payload.right_label)
    .bind(payload.sort_order)
    .fetch_one(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Task label created successfully",
        label,
    ))
}

/// List all task labels
#[utoipa::path(
    get,
    path = "/task-labels",
    responses(
        (status = 200, description = "Task labels retrieved successfully", body = [TaskLabel]),
        (status = 500, description = "Internal server error")
    ),
    tag = "TaskLabels",
    security(("bearerAuth" = []))
)]
pub async fn get_all_task_labels(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<TaskLabel>>, ApiResponse<()>> {
    let labels = fetch_task_labels(&pool).await.map_err(internal)?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Task labels retrieved successfully",
        labels,
    ))
}

/// Get one task label
#[utoipa::path(
    get,
    path = "/task-labels/{label_id}",
    params(("label_id" = String, Path, description = "Task label ID")),
    responses(
        (status = 200, description = "Task label found", body = TaskLabel),
        (status = 404, description = "Task label not found")
    ),
    tag = "TaskLabels",
    security(("bearerAuth" = []))
)]
pub async fn get_task_label(
    State(pool): State<PgPool>,
    Path(label_id): Path<String>,
) -> Result<ApiResponse<TaskLabel>, ApiResponse<()>> {
    let label = sqlx::query_as::<_, TaskLabel>(
        "SELECT id, left_label, right_label, sort_order FROM task_labels WHERE id = $1",
    )
    .bind(&label_id)
    .fetch_optional(&pool)
    .await
    .map_err(internal)?;

    match label {
        Some(label) => Ok(ApiResponse::success(
            StatusCode::OK,
            "Task label found",
            label,
        )),
        None => Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Task label not found",
            None,
        )),
    }
}

/// Update a task label
#[utoipa::path(
    put,
    path = "/task-labels/{label_id}",
    params(("label_id" = String, Path, description = "Task label ID")),
    request_body = UpdateTaskLabel,
    responses(
        (status = 200, description = "Task label updated successfully"),
        (status = 404, description = "Task label not found")
    ),
    tag = "TaskLabels",
    security(("bearerAuth" = []))
)]
pub async fn update_task_label(
    State(pool): State<PgPool>,
    Path(label_id): Path<String>,
    Json(payload): Json<UpdateTaskLabel>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query(
        "UPDATE task_labels SET
            left_label = COALESCE($1, left_label),
            right_label = COALESCE($2, right_label),
            sort_order = COALESCE($3, sort_order)
         WHERE id = $4",
    )
    .bind(payload.left_label)
    .bind(payload.right_label)
    .bind(payload.sort_order)
    .bind(&label_id)
    .execute(&pool)
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Task label not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Task label updated successfully",
        (),
    ))
}

/// Delete a task label and garbage-collect the grid and history rows that
/// reference it, plus any member exclusions pointing at it. There is no FK on
/// those columns, so the cascade is done here in one transaction.
#[utoipa::path(
    delete,
    path = "/task-labels/{label_id}",
    params(("label_id" = String, Path, description = "Task label ID")),
    responses(
        (status = 200, description = "Task label deleted successfully"),
        (status = 404, description = "Task label not found")
    ),
    tag = "TaskLabels",
    security(("bearerAuth" = []))
)]
pub async fn delete_task_label(
    State(pool): State<PgPool>,
    Path(label_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let mut tx = pool.begin().await.map_err(internal)?;

    let result = sqlx::query("DELETE FROM task_labels WHERE id = $1")
        .bind(&label_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Task label not found",
            None,
        ));
    }

    sqlx::query("DELETE FROM assignments WHERE task_label_id = $1")
        .bind(&label_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    sqlx::query("DELETE FROM assignment_history WHERE task_label_id = $1")
        .bind(&label_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    sqlx::query("DELETE FROM member_excluded_labels WHERE task_label_id = $1")
        .bind(&label_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;

    tx.commit().await.map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Task label deleted successfully",
        (),
    ))
}

fn internal(e: sqlx::Error) -> ApiResponse<()> {
    ApiResponse::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error",
        Some(json!({ "error": e.to_string() })),
    )
}
