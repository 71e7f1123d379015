use crate::db::models::schedule::{
    NewRoastSchedule, NewTimeLabel, NewTodaySchedule, RoastSchedule, TimeLabel, TodaySchedule,
    UpdateRoastSchedule, UpdateTodaySchedule,
};
use crate::db::queries::schedule::{
    create_roast_schedule, create_today_schedule, delete_roast_schedule, delete_today_schedule,
    get_roast_schedule, get_roast_schedules, get_today_schedule, get_today_schedules,
    update_roast_schedule, update_today_schedule,
};
use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;

/// Register schedule routes (daily time-table and roaster board)
pub fn schedule_routes() -> Router<PgPool> {
    Router::new()
        .route(
            "/schedules/today",
            post(create_today_schedule).get(get_today_schedules),
        )
        .route(
            "/schedules/today/{schedule_id}",
            get(get_today_schedule)
                .put(update_today_schedule)
                .delete(delete_today_schedule),
        )
        .route(
            "/schedules/roast",
            post(create_roast_schedule).get(get_roast_schedules),
        )
        .route(
            "/schedules/roast/{entry_id}",
            get(get_roast_schedule)
                .put(update_roast_schedule)
                .delete(delete_roast_schedule),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::db::queries::schedule::create_today_schedule,
        crate::db::queries::schedule::get_today_schedules,
        crate::db::queries::schedule::get_today_schedule,
        crate::db::queries::schedule::update_today_schedule,
        crate::db::queries::schedule::delete_today_schedule,
        crate::db::queries::schedule::create_roast_schedule,
        crate::db::queries::schedule::get_roast_schedules,
        crate::db::queries::schedule::get_roast_schedule,
        crate::db::queries::schedule::update_roast_schedule,
        crate::db::queries::schedule::delete_roast_schedule,
    ),
    components(schemas(
        TodaySchedule,
        TimeLabel,
        NewTodaySchedule,
        NewTimeLabel,
        UpdateTodaySchedule,
        RoastSchedule,
        NewRoastSchedule,
        UpdateRoastSchedule
    ))
)]
pub struct ScheduleDoc;
