use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::member::MemberRow;
use crate::db::models::team::{NewTeam, Team, UpdateTeam};
use crate::db::queries::member::attach_exclusions;
use crate::utils::api_response::ApiResponse;

/// Create a new team
#[utoipa::path(
    post,
    path = "/teams",
    request_body = NewTeam,
    responses(
        (status = 201, description = "Team created successfully", body = Team),
        (status = 500, description = "Internal server error")
    ),
    tag = "Teams",
    security(("bearerAuth" = []))
)]
pub async fn create_team(
    State(pool): State<PgPool>,
    Json(payload): Json<NewTeam>,
) -> Result<ApiResponse<Team>, ApiResponse<()>> {
    let id = Uuid::new_v4().to_string();
    let team = sqlx::query_as::<_, Team>(
        "INSERT INTO teams (id, name, sort_order) VALUES ($1, $2, $3)
         RETURNING id, name, sort_order, created_at",
    )
    .bind(&id)
    .bind(&payload.name)
    .bind(payload.sort_order)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to create team",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Team created successfully",
        team,
    ))
}

/// Get all teams in display order
#[utoipa::path(
    get,
    path = "/teams",
    responses(
        (status = 200, description = "List of teams retrieved successfully", body = [Team]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Teams",
    security(("bearerAuth" = []))
)]
pub async fn get_all_teams(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<Team>>, ApiResponse<()>> {
    let teams = fetch_teams(&pool).await.map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to retrieve teams",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Teams retrieved successfully",
        teams,
    ))
}

/// Get a single team by ID
#[utoipa::path(
    get,
    path = "/teams/{team_id}",
    params(("team_id" = String, Path, description = "Team ID to retrieve")),
    responses(
        (status = 200, description = "Team found", body = Team),
        (status = 404, description = "Team not found")
    ),
    tag = "Teams",
    security(("bearerAuth" = []))
)]
pub async fn get_team(
    State(pool): State<PgPool>,
    Path(team_id): Path<String>,
) -> Result<ApiResponse<Team>, ApiResponse<()>> {
    let team = sqlx::query_as::<_, Team>(
        "SELECT id, name, sort_order, created_at FROM teams WHERE id = $1",
    )
    .bind(&team_id)
    .fetch_optional(&pool)
    .await
    .map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to retrieve team",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    match team {
        Some(team) => Ok(ApiResponse::success(StatusCode::OK, "Team found", team)),
        None => Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Team not found",
            None,
        )),
    }
}

/// Update a team
#[utoipa::path(
    put,
    path = "/teams/{team_id}",
    params(("team_id" = String, Path, description = "Team ID to update")),
    request_body = UpdateTeam,
    responses(
        (status = 200, description = "Team updated successfully"),
        (status = 404, description = "Team not found")
    ),
    tag = "Teams",
    security(("bearerAuth" = []))
)]
pub async fn update_team(
    State(pool): State<PgPool>,
    Path(team_id): Path<String>,
    Json(payload): Json<UpdateTeam>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query(
        "UPDATE teams SET name = COALESCE($1, name), sort_order = COALESCE($2, sort_order)
         WHERE id = $3",
    )
    .bind(payload.name)
    .bind(payload.sort_order)
    .bind(&team_id)
    .execute(&pool)
    .await
    .map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to update team",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Team not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Team updated successfully",
        (),
    ))
}

/// Delete a team. Cascades: members go with the team (FK), and so do the
/// team's assignment and history rows.
#[utoipa::path(
    delete,
    path = "/teams/{team_id}",
    params(("team_id" = String, Path, description = "Team ID to delete")),
    responses(
        (status = 200, description = "Team deleted successfully"),
        (status = 404, description = "Team not found")
    ),
    tag = "Teams",
    security(("bearerAuth" = []))
)]
pub async fn delete_team(
    State(pool): State<PgPool>,
    Path(team_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(&team_id)
        .execute(&pool)
        .await
        .map_err(|e| {
            ApiResponse::<()>::error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete team",
                Some(json!({ "error": e.to_string() })),
            )
        })?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Team not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Team deleted successfully",
        (),
    ))
}

/// Get the members of a team, exclusion sets included
#[utoipa::path(
    get,
    path = "/teams/{team_id}/members",
    params(("team_id" = String, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team members retrieved successfully"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Teams",
    security(("bearerAuth" = []))
)]
pub async fn get_team_members(
    State(pool): State<PgPool>,
    Path(team_id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, ApiResponse<()>> {
    let rows = sqlx::query_as::<_, MemberRow>(
        "SELECT id, name, team_id, active, sort_order FROM members
         WHERE team_id = $1 ORDER BY sort_order NULLS LAST, name",
    )
    .bind(&team_id)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to retrieve team members",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    let members = attach_exclusions(&pool, rows).await.map_err(|e| {
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to retrieve member exclusions",
            Some(json!({ "error": e.to_string() })),
        )
    })?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Team members retrieved successfully",
        json!({ "teamId": team_id, "members": members }),
    ))
}

/// Shared team listing used by the snapshot loader as well.
pub async fn fetch_teams(pool: &PgPool) -> Result<Vec<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>(
        "SELECT id, name, sort_order, created_at FROM teams ORDER BY sort_order NULLS LAST, name",
    )
    .fetch_all(pool)
    .await
}
