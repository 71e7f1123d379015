use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// One assignable work-slot position. Every team gets its own cell for each
/// label in the assignment grid.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskLabel {
    pub id: String,
    pub left_label: String,
    pub right_label: Option<String>,
    pub sort_order: Option<i32>,
}

impl TaskLabel {
    /// Empty-label stand-in for a label id that no longer has a record, and
    /// for the synthetic slots the engine pads a scarce label list with.
    pub fn placeholder(id: impl Into<String>) -> Self {
        TaskLabel {
            id: id.into(),
            left_label: String::new(),
            right_label: None,
            sort_order: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTaskLabel {
    pub left_label: String,
    pub right_label: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskLabel {
    pub left_label: Option<String>,
    pub right_label: Option<String>,
    pub sort_order: Option<i32>,
}
