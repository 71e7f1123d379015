use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::auth::Claims;
use crate::db::models::notification::{NewNotification, Notification, UpdateNotification};
use crate::utils::api_response::ApiResponse;

/// Create a notification (admins only)
#[utoipa::path(
    post,
    path = "/notifications",
    request_body = NewNotification,
    responses(
        (status = 201, description = "Notification created successfully", body = Notification),
        (status = 403, description = "Insufficient permissions"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Notifications",
    security(("bearerAuth" = []))
)]
pub async fn create_notification(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<NewNotification>,
) -> Result<ApiResponse<Notification>, ApiResponse<()>> {
    require_admin(&claims)?;

    let id = Uuid::new_v4().to_string();
    let notification = sqlx::query_as::<_, Notification>(
        "INSERT INTO notifications (id, title, content, date, type)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, title, content, date, type",
    )
    .bind(&id)
    .bind(&payload.title)
    .bind(&payload.content)
    .bind(payload.date)
    .bind(payload.type_field.unwrap_or_else(|| "announcement".to_string()))
    .fetch_one(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Notification created successfully",
        notification,
    ))
}

/// List notifications, newest first
#[utoipa::path(
    get,
    path = "/notifications",
    responses(
        (status = 200, description = "Notifications retrieved successfully", body = [Notification]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Notifications",
    security(("bearerAuth" = []))
)]
pub async fn get_notifications(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Notification>>, ApiResponse<()>> {
    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT id, title, content, date, type FROM notifications ORDER BY date DESC",
    )
    .fetch_all(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Notifications retrieved successfully",
        notifications,
    ))
}

/// Get one notification
#[utoipa::path(
    get,
    path = "/notifications/{notification_id}",
    params(("notification_id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification found", body = Notification),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications",
    security(("bearerAuth" = []))
)]
pub async fn get_notification(
    State(pool): State<PgPool>,
    Path(notification_id): Path<String>,
) -> Result<ApiResponse<Notification>, ApiResponse<()>> {
    let notification = sqlx::query_as::<_, Notification>(
        "SELECT id, title, content, date, type FROM notifications WHERE id = $1",
    )
    .bind(&notification_id)
    .fetch_optional(&pool)
    .await
    .map_err(internal)?;

    match notification {
        Some(n) => Ok(ApiResponse::success(StatusCode::OK, "Notification found", n)),
        None => Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Notification not found",
            None,
        )),
    }
}

/// Update a notification (admins only)
#[utoipa::path(
    put,
    path = "/notifications/{notification_id}",
    params(("notification_id" = String, Path, description = "Notification ID")),
    request_body = UpdateNotification,
    responses(
        (status = 200, description = "Notification updated successfully"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications",
    security(("bearerAuth" = []))
)]
pub async fn update_notification(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<String>,
    Json(payload): Json<UpdateNotification>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    require_admin(&claims)?;

    let result = sqlx::query(
        "UPDATE notifications SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            date = COALESCE($3, date),
            type = COALESCE($4, type)
         WHERE id = $5",
    )
    .bind(payload.title)
    .bind(payload.content)
    .bind(payload.date)
    .bind(payload.type_field)
    .bind(&notification_id)
    .execute(&pool)
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Notification not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Notification updated successfully",
        (),
    ))
}

/// Delete a notification (admins only)
#[utoipa::path(
    delete,
    path = "/notifications/{notification_id}",
    params(("notification_id" = String, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted successfully"),
        (status = 403, description = "Insufficient permissions"),
        (status = 404, description = "Notification not found")
    ),
    tag = "Notifications",
    security(("bearerAuth" = []))
)]
pub async fn delete_notification(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(notification_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    require_admin(&claims)?;

    let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
        .bind(&notification_id)
        .execute(&pool)
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Notification not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Notification deleted successfully",
        (),
    ))
}

fn require_admin(claims: &Claims) -> Result<(), ApiResponse<()>> {
    if claims.role != "admin" {
        return Err(ApiResponse::error(
            StatusCode::FORBIDDEN,
            "Insufficient permissions to manage notifications",
            None,
        ));
    }
    Ok(())
}

fn internal(e: sqlx::Error) -> ApiResponse<()> {
    ApiResponse::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error",
        Some(json!({ "error": e.to_string() })),
    )
}
