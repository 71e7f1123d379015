use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::models::member::{Member, MemberRow, NewMember, UpdateExclusions, UpdateMember};
use crate::utils::api_response::ApiResponse;

/// Join the excluded-label sets onto a batch of member rows.
pub async fn attach_exclusions(
    pool: &PgPool,
    rows: Vec<MemberRow>,
) -> Result<Vec<Member>, sqlx::Error> {
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let mut exclusions: HashMap<String, Vec<String>> = HashMap::new();
    if !ids.is_empty() {
        let pairs = sqlx::query(
            "SELECT member_id, task_label_id FROM member_excluded_labels
             WHERE member_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;
        for row in pairs {
            let member_id: String = row.get("member_id");
            let label_id: String = row.get("task_label_id");
            exclusions.entry(member_id).or_default().push(label_id);
        }
    }

    Ok(rows
        .into_iter()
        .map(|r| {
            let excluded = exclusions.remove(&r.id).unwrap_or_default();
            r.into_member(excluded)
        })
        .collect())
}

/// Fetch every member with exclusions, roster order.
pub async fn fetch_members(pool: &PgPool) -> Result<Vec<Member>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MemberRow>(
        "SELECT id, name, team_id, active, sort_order FROM members
         ORDER BY sort_order NULLS LAST, name",
    )
    .fetch_all(pool)
    .await?;
    attach_exclusions(pool, rows).await
}

/// Create a member
#[utoipa::path(
    post,
    path = "/members",
    request_body = NewMember,
    responses(
        (status = 201, description = "Member created successfully", body = Member),
        (status = 400, description = "Referenced team does not exist"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Members",
    security(("bearerAuth" = []))
)]
pub async fn create_member(
    State(pool): State<PgPool>,
    Json(payload): Json<NewMember>,
) -> Result<ApiResponse<Member>, ApiResponse<()>> {
    let id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await.map_err(internal)?;

    let row = sqlx::query_as::<_, MemberRow>(
        "INSERT INTO members (id, name, team_id, active, sort_order)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, team_id, active, sort_order",
    )
    .bind(&id)
    .bind(&payload.name)
    .bind(&payload.team_id)
    .bind(payload.active.unwrap_or(true))
    .bind(payload.sort_order)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => ApiResponse::<()>::error(
            StatusCode::BAD_REQUEST,
            "Referenced team does not exist",
            None,
        ),
        e => internal(e),
    })?;

    for label_id in &payload.excluded_task_label_ids {
        sqlx::query(
            "INSERT INTO member_excluded_labels (member_id, task_label_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(&id)
        .bind(label_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    }

    tx.commit().await.map_err(internal)?;

    let member = row.into_member(payload.excluded_task_label_ids);
    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Member created successfully",
        member,
    ))
}

/// List all members
#[utoipa::path(
    get,
    path = "/members",
    responses(
        (status = 200, description = "Members retrieved successfully", body = [Member]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Members",
    security(("bearerAuth" = []))
)]
pub async fn get_all_members(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Member>>, ApiResponse<()>> {
    let members = fetch_members(&pool).await.map_err(internal)?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Members retrieved successfully",
        members,
    ))
}

/// Get a single member
#[utoipa::path(
    get,
    path = "/members/{member_id}",
    params(("member_id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member found", body = Member),
        (status = 404, description = "Member not found")
    ),
    tag = "Members",
    security(("bearerAuth" = []))
)]
pub async fn get_member(
    State(pool): State<PgPool>,
    Path(member_id): Path<String>,
) -> Result<ApiResponse<Member>, ApiResponse<()>> {
    let row = sqlx::query_as::<_, MemberRow>(
        "SELECT id, name, team_id, active, sort_order FROM members WHERE id = $1",
    )
    .bind(&member_id)
    .fetch_optional(&pool)
    .await
    .map_err(internal)?
    .ok_or_else(|| ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Member not found", None))?;

    let members = attach_exclusions(&pool, vec![row]).await.map_err(internal)?;
    let member = members.into_iter().next().ok_or_else(|| {
        ApiResponse::<()>::error(StatusCode::INTERNAL_SERVER_ERROR, "Member vanished", None)
    })?;

    Ok(ApiResponse::success(StatusCode::OK, "Member found", member))
}

/// Update a member's basic fields
#[utoipa::path(
    put,
    path = "/members/{member_id}",
    params(("member_id" = String, Path, description = "Member ID")),
    request_body = UpdateMember,
    responses(
        (status = 200, description = "Member updated successfully"),
        (status = 404, description = "Member not found")
    ),
    tag = "Members",
    security(("bearerAuth" = []))
)]
pub async fn update_member(
    State(pool): State<PgPool>,
    Path(member_id): Path<String>,
    Json(payload): Json<UpdateMember>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query(
        "UPDATE members SET
            name = COALESCE($1, name),
            team_id = COALESCE($2, team_id),
            active = COALESCE($3, active),
            sort_order = COALESCE($4, sort_order)
         WHERE id = $5",
    )
    .bind(payload.name)
    .bind(payload.team_id)
    .bind(payload.active)
    .bind(payload.sort_order)
    .bind(&member_id)
    .execute(&pool)
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Member not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Member updated successfully",
        (),
    ))
}

/// Replace a member's excluded-label set
#[utoipa::path(
    put,
    path = "/members/{member_id}/exclusions",
    params(("member_id" = String, Path, description = "Member ID")),
    request_body = UpdateExclusions,
    responses(
        (status = 200, description = "Exclusions updated successfully"),
        (status = 404, description = "Member not found")
    ),
    tag = "Members",
    security(("bearerAuth" = []))
)]
pub async fn update_exclusions(
    State(pool): State<PgPool>,
    Path(member_id): Path<String>,
    Json(payload): Json<UpdateExclusions>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM members WHERE id = $1")
        .bind(&member_id)
        .fetch_optional(&pool)
        .await
        .map_err(internal)?;
    if exists.is_none() {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Member not found",
            None,
        ));
    }

    let mut tx = pool.begin().await.map_err(internal)?;
    sqlx::query("DELETE FROM member_excluded_labels WHERE member_id = $1")
        .bind(&member_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    for label_id in &payload.excluded_task_label_ids {
        sqlx::query(
            "INSERT INTO member_excluded_labels (member_id, task_label_id)
             VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(&member_id)
        .bind(label_id)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    }
    tx.commit().await.map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Exclusions updated successfully",
        (),
    ))
}

/// Delete a member. The FKs null out any grid slot pointing at them and strip
/// their history rows.
#[utoipa::path(
    delete,
    path = "/members/{member_id}",
    params(("member_id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member deleted successfully"),
        (status = 404, description = "Member not found")
    ),
    tag = "Members",
    security(("bearerAuth" = []))
)]
pub async fn delete_member(
    State(pool): State<PgPool>,
    Path(member_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM members WHERE id = $1")
        .bind(&member_id)
        .execute(&pool)
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Member not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Member deleted successfully",
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
