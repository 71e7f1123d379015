use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A roster member. `excluded_task_label_ids` is a hard constraint: the
/// shuffle engine never places this member on a label in the set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    pub name: String,
    pub team_id: String,
    pub active: bool,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub excluded_task_label_ids: Vec<String>,
}

impl Member {
    pub fn is_excluded_from(&self, task_label_id: &str) -> bool {
        self.excluded_task_label_ids
            .iter()
            .any(|id| id == task_label_id)
    }
}

/// Row shape before the exclusion set is joined in.
#[derive(Debug, FromRow)]
pub struct MemberRow {
    pub id: String,
    pub name: String,
    pub team_id: String,
    pub active: bool,
    pub sort_order: Option<i32>,
}

impl MemberRow {
    pub fn into_member(self, excluded_task_label_ids: Vec<String>) -> Member {
        Member {
            id: self.id,
            name: self.name,
            team_id: self.team_id,
            active: self.active,
            sort_order: self.sort_order,
            excluded_task_label_ids,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewMember {
    pub name: String,
    pub team_id: String,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub excluded_task_label_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMember {
    pub name: Option<String>,
    pub team_id: Option<String>,
    pub active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Full replacement of a member's excluded-label set.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExclusions {
    pub excluded_task_label_ids: Vec<String>,
}
