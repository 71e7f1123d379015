use crate::db::models::task_label::{NewTaskLabel, TaskLabel, UpdateTaskLabel};
use crate::db::queries::task_label::{
    create_task_label, delete_task_label, get_all_task_labels, get_task_label, update_task_label,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;

/// Register task label routes
pub fn task_label_routes() -> Router<PgPool> {
    Router::new()
        .route("/task-labels", post(create_task_label).get(get_all_task_labels))
        .route(
            "/task-labels/{label_id}",
            get(get_task_label)
                .put(update_task_label)
                .delete(delete_task_label),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::db::queries::task_label::create_task_label,
        crate::db::queries::task_label::get_all_task_labels,
        crate::db::queries::task_label::get_task_label,
        crate::db::queries::task_label::update_task_label,
        crate::db::queries::task_label::delete_task_label,
    ),
    components(schemas(TaskLabel, NewTaskLabel, UpdateTaskLabel))
)]
pub struct TaskLabelDoc;
