use crate::db::models::member::{Member, NewMember, UpdateExclusions, UpdateMember};
use crate::db::queries::member::{
    create_member, delete_member, get_all_members, get_member, update_exclusions, update_member,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;

/// Register member management routes
pub fn member_routes() -> Router<PgPool> {
    Router::new()
        .route("/members", post(create_member).get(get_all_members))
        .route(
            "/members/{member_id}",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/members/{member_id}/exclusions", put(update_exclusions))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::db::queries::member::create_member,
        crate::db::queries::member::get_all_members,
        crate::db::queries::member::get_member,
        crate::db::queries::member::update_member,
        crate::db::queries::member::update_exclusions,
        crate::db::queries::member::delete_member,
    ),
    components(schemas(Member, NewMember, UpdateMember, UpdateExclusions))
)]
pub struct MemberDoc;
