use anyhow::Context;
use axum::middleware::from_fn;
use axum::Router;
use sqlx::PgPool;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod config;
mod db;
mod engine;
mod middleware;
mod utils;

use crate::api::assignment::AssignmentDoc;
use crate::api::auth::AuthDoc;
use crate::api::member::MemberDoc;
use crate::api::notification::NotificationDoc;
use crate::api::schedule::ScheduleDoc;
use crate::api::task_label::TaskLabelDoc;
use crate::api::tasting::TastingDoc;
use crate::api::team::TeamDoc;
use crate::config::Config;
use crate::middleware::auth::jwt_middleware;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Config::init();

    std::fs::create_dir_all("logs").context("Failed to create logs directory")?;
    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(non_blocking)
        .init();

    let pool = db::pool::get_db_pool().await;
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let merged_doc = AuthDoc::openapi()
        .merge_from(TeamDoc::openapi())
        .merge_from(MemberDoc::openapi())
        .merge_from(TaskLabelDoc::openapi())
        .merge_from(AssignmentDoc::openapi())
        .merge_from(ScheduleDoc::openapi())
        .merge_from(TastingDoc::openapi())
        .merge_from(NotificationDoc::openapi());

    let public_routes = Router::new().merge(api::auth::auth_routes());

    let private_routes = Router::new()
        .merge(api::team::team_routes())
        .merge(api::member::member_routes())
        .merge(api::task_label::task_label_routes())
        .merge(api::assignment::assignment_routes())
        .merge(api::schedule::schedule_routes())
        .merge(api::tasting::tasting_routes())
        .merge(api::notification::notification_routes())
        .merge(api::auth::secure_auth_routes())
        .route_layer(from_fn(jwt_middleware));

    let app = Router::new()
        .merge(api::health::health_routes())
        .merge(public_routes)
        .merge(private_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", merged_doc).path("/rapidoc"))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(pool.clone());

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    run_server(app, shutdown_tx, pool).await;
    println!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal(mut shutdown_rx: broadcast::Receiver<()>, pool: PgPool) {
    tokio::select! {
        _ = signal::ctrl_c() => println!("Received Ctrl+C, shutting down..."),
        _ = shutdown_rx.recv() => println!("Received shutdown signal."),
    }
    println!("Closing database pool...");
    pool.close().await;
    println!("Database pool closed. Server shutting down.");
}

async fn run_server(app: Router, shutdown_tx: broadcast::Sender<()>, pool: PgPool) {
    let addr: SocketAddr = Config::get()
        .bind_addr
        .parse()
        .expect("BIND_ADDR must be a valid socket address");
    println!("Server running at http://{}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");

    let shutdown = shutdown_signal(shutdown_tx.subscribe(), pool.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Server encountered an error");
}
