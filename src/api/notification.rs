use crate::db::models::notification::{NewNotification, Notification, UpdateNotification};
use crate::db::queries::notification::{
    create_notification, delete_notification, get_notification, get_notifications,
    update_notification,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;

pub fn notification_routes() -> Router<PgPool> {
    Router::new()
        .route(
            "/notifications",
            post(create_notification).get(get_notifications),
        )
        .route(
            "/notifications/{notification_id}",
            get(get_notification)
                .put(update_notification)
                .delete(delete_notification),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::db::queries::notification::create_notification,
        crate::db::queries::notification::get_notifications,
        crate::db::queries::notification::get_notification,
        crate::db::queries::notification::update_notification,
        crate::db::queries::notification::delete_notification,
    ),
    components(schemas(Notification, NewNotification, UpdateNotification))
)]
pub struct NotificationDoc;
