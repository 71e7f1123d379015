use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// One cell of the current assignment grid, keyed `(team_id, task_label_id)`.
/// `member_id = None` means nobody holds the slot today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub team_id: String,
    pub task_label_id: String,
    pub member_id: Option<String>,
    pub assigned_date: NaiveDate,
}

/// Append-only fairness log entry. Null slots are never logged.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub team_id: String,
    pub task_label_id: String,
    pub member_id: String,
    pub assigned_date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ShuffleParams {
    /// Skip the weekday / once-per-day gates (developer force shuffle).
    pub force: Option<bool>,
}

/// Exchange the members of two cells within the same team.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub team_id: String,
    pub task_label_id_a: String,
    pub task_label_id_b: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryParams {
    /// Lookback window in days (default 30).
    pub days: Option<i64>,
}
