use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::db::models::schedule::{
    machine_mode_for_blend, NewRoastSchedule, NewTimeLabel, NewTodaySchedule, RoastSchedule,
    TimeLabel, TodaySchedule, UpdateRoastSchedule, UpdateTodaySchedule,
};
use crate::utils::api_response::ApiResponse;

// ---- Today schedules (daily time-table) ----

/// Create a day's time-table
#[utoipa::path(
    post,
    path = "/schedules/today",
    request_body = NewTodaySchedule,
    responses(
        (status = 201, description = "Schedule created successfully", body = TodaySchedule),
        (status = 409, description = "A schedule for that date already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn create_today_schedule(
    State(pool): State<PgPool>,
    Json(payload): Json<NewTodaySchedule>,
) -> Result<ApiResponse<TodaySchedule>, ApiResponse<()>> {
    let id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await.map_err(internal)?;

    sqlx::query("INSERT INTO today_schedules (id, date) VALUES ($1, $2)")
        .bind(&id)
        .bind(payload.date)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => ApiResponse::<()>::error(
                StatusCode::CONFLICT,
                "A schedule for that date already exists",
                None,
            ),
            e => internal(e),
        })?;

    let time_labels = insert_time_labels(&mut tx, &id, &payload.time_labels).await?;
    tx.commit().await.map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Schedule created successfully",
        TodaySchedule {
            id,
            date: payload.date,
            time_labels,
        },
    ))
}

/// List day time-tables with their time labels
#[utoipa::path(
    get,
    path = "/schedules/today",
    responses(
        (status = 200, description = "Schedules retrieved successfully", body = [TodaySchedule]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn get_today_schedules(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<TodaySchedule>>, ApiResponse<()>> {
    let headers = sqlx::query("SELECT id, date FROM today_schedules ORDER BY date DESC")
        .fetch_all(&pool)
        .await
        .map_err(internal)?;

    let mut schedules = Vec::with_capacity(headers.len());
    for row in headers {
        let id: String = row.get("id");
        let date: chrono::NaiveDate = row.get("date");
        let time_labels = fetch_time_labels(&pool, &id).await.map_err(internal)?;
        schedules.push(TodaySchedule {
            id,
            date,
            time_labels,
        });
    }

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Schedules retrieved successfully",
        schedules,
    ))
}

/// Get one day's time-table
#[utoipa::path(
    get,
    path = "/schedules/today/{schedule_id}",
    params(("schedule_id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule found", body = TodaySchedule),
        (status = 404, description = "Schedule not found")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn get_today_schedule(
    State(pool): State<PgPool>,
    Path(schedule_id): Path<String>,
) -> Result<ApiResponse<TodaySchedule>, ApiResponse<()>> {
    let header = sqlx::query("SELECT id, date FROM today_schedules WHERE id = $1")
        .bind(&schedule_id)
        .fetch_optional(&pool)
        .await
        .map_err(internal)?
        .ok_or_else(|| {
            ApiResponse::<()>::error(StatusCode::NOT_FOUND, "Schedule not found", None)
        })?;

    let date: chrono::NaiveDate = header.get("date");
    let time_labels = fetch_time_labels(&pool, &schedule_id).await.map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Schedule found",
        TodaySchedule {
            id: schedule_id,
            date,
            time_labels,
        },
    ))
}

/// Update a day's time-table. A supplied time-label list replaces the
/// existing one wholesale; omitting it keeps the current labels.
#[utoipa::path(
    put,
    path = "/schedules/today/{schedule_id}",
    params(("schedule_id" = String, Path, description = "Schedule ID")),
    request_body = UpdateTodaySchedule,
    responses(
        (status = 200, description = "Schedule updated successfully"),
        (status = 404, description = "Schedule not found"),
        (status = 409, description = "A schedule for that date already exists")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn update_today_schedule(
    State(pool): State<PgPool>,
    Path(schedule_id): Path<String>,
    Json(payload): Json<UpdateTodaySchedule>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let mut tx = pool.begin().await.map_err(internal)?;

    let result = sqlx::query("UPDATE today_schedules SET date = COALESCE($1, date) WHERE id = $2")
        .bind(payload.date)
        .bind(&schedule_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => ApiResponse::<()>::error(
                StatusCode::CONFLICT,
                "A schedule for that date already exists",
                None,
            ),
            e => internal(e),
        })?;
    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Schedule not found",
            None,
        ));
    }

    if let Some(labels) = &payload.time_labels {
        sqlx::query("DELETE FROM time_labels WHERE schedule_id = $1")
            .bind(&schedule_id)
            .execute(&mut *tx)
            .await
            .map_err(internal)?;
        insert_time_labels(&mut tx, &schedule_id, labels).await?;
    }
    tx.commit().await.map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Schedule updated successfully",
        (),
    ))
}

/// Delete a day's time-table (its time labels cascade)
#[utoipa::path(
    delete,
    path = "/schedules/today/{schedule_id}",
    params(("schedule_id" = String, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule deleted successfully"),
        (status = 404, description = "Schedule not found")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn delete_today_schedule(
    State(pool): State<PgPool>,
    Path(schedule_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM today_schedules WHERE id = $1")
        .bind(&schedule_id)
        .execute(&pool)
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Schedule not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Schedule deleted successfully",
        (),
    ))
}

// ---- Roast schedules (roaster board) ----

/// Create a roast board entry. If no machine mode is given it is resolved
/// from the bean preset (blend ratio respected).
#[utoipa::path(
    post,
    path = "/schedules/roast",
    request_body = NewRoastSchedule,
    responses(
        (status = 201, description = "Roast entry created successfully", body = RoastSchedule),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn create_roast_schedule(
    State(pool): State<PgPool>,
    Json(payload): Json<NewRoastSchedule>,
) -> Result<ApiResponse<RoastSchedule>, ApiResponse<()>> {
    let id = Uuid::new_v4().to_string();
    let machine_mode = payload.machine_mode.clone().or_else(|| {
        machine_mode_for_blend(
            payload.bean_name.as_deref(),
            payload.bean_name2.as_deref(),
            payload.blend_ratio.as_deref(),
        )
        .map(|m| m.as_str().to_string())
    });

    let entry = sqlx::query_as::<_, RoastSchedule>(
        "INSERT INTO roast_schedules
            (id, time, entry_kind, bean_name, bean_name2, blend_ratio, machine_mode,
             weight, roast_level, roast_count, bag_count, sort_order)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         RETURNING id, time, entry_kind, bean_name, bean_name2, blend_ratio, machine_mode,
                   weight, roast_level, roast_count, bag_count, sort_order",
    )
    .bind(&id)
    .bind(&payload.time)
    .bind(&payload.entry_kind)
    .bind(&payload.bean_name)
    .bind(&payload.bean_name2)
    .bind(&payload.blend_ratio)
    .bind(&machine_mode)
    .bind(payload.weight)
    .bind(&payload.roast_level)
    .bind(payload.roast_count)
    .bind(payload.bag_count)
    .bind(payload.sort_order)
    .fetch_one(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Roast entry created successfully",
        entry,
    ))
}

/// List roast board entries in time order
#[utoipa::path(
    get,
    path = "/schedules/roast",
    responses(
        (status = 200, description = "Roast entries retrieved successfully", body = [RoastSchedule]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn get_roast_schedules(
    State(pool): State<PgPool>,
) -> Result<ApiResponse<Vec<RoastSchedule>>, ApiResponse<()>> {
    let entries = sqlx::query_as::<_, RoastSchedule>(
        "SELECT id, time, entry_kind, bean_name, bean_name2, blend_ratio, machine_mode,
                weight, roast_level, roast_count, bag_count, sort_order
         FROM roast_schedules ORDER BY sort_order NULLS LAST, time",
    )
    .fetch_all(&pool)
    .await
    .map_err(internal)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Roast entries retrieved successfully",
        entries,
    ))
}

/// Get one roast board entry
#[utoipa::path(
    get,
    path = "/schedules/roast/{entry_id}",
    params(("entry_id" = String, Path, description = "Roast entry ID")),
    responses(
        (status = 200, description = "Roast entry found", body = RoastSchedule),
        (status = 404, description = "Roast entry not found")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn get_roast_schedule(
    State(pool): State<PgPool>,
    Path(entry_id): Path<String>,
) -> Result<ApiResponse<RoastSchedule>, ApiResponse<()>> {
    let entry = sqlx::query_as::<_, RoastSchedule>(
        "SELECT id, time, entry_kind, bean_name, bean_name2, blend_ratio, machine_mode,
                weight, roast_level, roast_count, bag_count, sort_order
         FROM roast_schedules WHERE id = $1",
    )
    .bind(&entry_id)
    .fetch_optional(&pool)
    .await
    .map_err(internal)?;

    match entry {
        Some(entry) => Ok(ApiResponse::success(
            StatusCode::OK,
            "Roast entry found",
            entry,
        )),
        None => Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Roast entry not found",
            None,
        )),
    }
}

/// Update a roast board entry
#[utoipa::path(
    put,
    path = "/schedules/roast/{entry_id}",
    params(("entry_id" = String, Path, description = "Roast entry ID")),
    request_body = UpdateRoastSchedule,
    responses(
        (status = 200, description = "Roast entry updated successfully"),
        (status = 404, description = "Roast entry not found")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn update_roast_schedule(
    State(pool): State<PgPool>,
    Path(entry_id): Path<String>,
    Json(payload): Json<UpdateRoastSchedule>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query(
        "UPDATE roast_schedules SET
            time = COALESCE($1, time),
            entry_kind = COALESCE($2, entry_kind),
            bean_name = COALESCE($3, bean_name),
            bean_name2 = COALESCE($4, bean_name2),
            blend_ratio = COALESCE($5, blend_ratio),
            machine_mode = COALESCE($6, machine_mode),
            weight = COALESCE($7, weight),
            roast_level = COALESCE($8, roast_level),
            roast_count = COALESCE($9, roast_count),
            bag_count = COALESCE($10, bag_count),
            sort_order = COALESCE($11, sort_order)
         WHERE id = $12",
    )
    .bind(payload.time)
    .bind(payload.entry_kind)
    .bind(payload.bean_name)
    .bind(payload.bean_name2)
    .bind(payload.blend_ratio)
    .bind(payload.machine_mode)
    .bind(payload.weight)
    .bind(payload.roast_level)
    .bind(payload.roast_count)
    .bind(payload.bag_count)
    .bind(payload.sort_order)
    .bind(&entry_id)
    .execute(&pool)
    .await
    .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Roast entry not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Roast entry updated successfully",
        (),
    ))
}

/// Delete a roast board entry
#[utoipa::path(
    delete,
    path = "/schedules/roast/{entry_id}",
    params(("entry_id" = String, Path, description = "Roast entry ID")),
    responses(
        (status = 200, description = "Roast entry deleted successfully"),
        (status = 404, description = "Roast entry not found")
    ),
    tag = "Schedules",
    security(("bearerAuth" = []))
)]
pub async fn delete_roast_schedule(
    State(pool): State<PgPool>,
    Path(entry_id): Path<String>,
) -> Result<ApiResponse<()>, ApiResponse<()>> {
    let result = sqlx::query("DELETE FROM roast_schedules WHERE id = $1")
        .bind(&entry_id)
        .execute(&pool)
        .await
        .map_err(internal)?;

    if result.rows_affected() == 0 {
        return Err(ApiResponse::error(
            StatusCode::NOT_FOUND,
            "Roast entry not found",
            None,
        ));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Roast entry deleted successfully",
        (),
    ))
}

async fn fetch_time_labels(pool: &PgPool, schedule_id: &str) -> Result<Vec<TimeLabel>, sqlx::Error> {
    sqlx::query_as::<_, TimeLabel>(
        "SELECT id, time, content, memo, sort_order FROM time_labels
         WHERE schedule_id = $1 ORDER BY sort_order NULLS LAST, time",
    )
    .bind(schedule_id)
    .fetch_all(pool)
    .await
}

async fn insert_time_labels(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    schedule_id: &str,
    labels: &[NewTimeLabel],
) -> Result<Vec<TimeLabel>, ApiResponse<()>> {
    let mut inserted = Vec::with_capacity(labels.len());
    for tl in labels {
        let label_id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO time_labels (id, schedule_id, time, content, memo, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&label_id)
        .bind(schedule_id)
        .bind(&tl.time)
        .bind(&tl.content)
        .bind(&tl.memo)
        .bind(tl.sort_order)
        .execute(&mut **tx)
        .await
        .map_err(internal)?;
        inserted.push(TimeLabel {
            id: label_id,
            time: tl.time.clone(),
            content: tl.content.clone(),
            memo: tl.memo.clone(),
            sort_order: tl.sort_order,
        });
    }
    Ok(inserted)
}

fn internal(e: sqlx::Error) -> ApiResponse<()> {
    ApiResponse::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error",
        Some(json!({ "error": e.to_string() })),
    )
}
