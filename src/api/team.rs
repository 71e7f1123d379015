use crate::db::models::team::{NewTeam, Team, UpdateTeam};
use crate::db::queries::team::{
    create_team, delete_team, get_all_teams, get_team, get_team_members, update_team,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;

/// Register team management routes
pub fn team_routes() -> Router<PgPool> {
    Router::new()
        .route("/teams", post(create_team).get(get_all_teams))
        .route(
            "/teams/{team_id}",
            get(get_team).put(update_team).delete(delete_team),
        )
        .route("/teams/{team_id}/members", get(get_team_members))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::db::queries::team::create_team,
        crate::db::queries::team::get_all_teams,
        crate::db::queries::team::get_team,
        crate::db::queries::team::update_team,
        crate::db::queries::team::delete_team,
        crate::db::queries::team::get_team_members,
    ),
    components(schemas(Team, NewTeam, UpdateTeam))
)]
pub struct TeamDoc;
