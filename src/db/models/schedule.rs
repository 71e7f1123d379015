use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Roaster gas-mode setting, keyed off the bean being roasted.
/// Ordering matters: when a 50/50 blend ties, the lower-numbered mode wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum RoastMachineMode {
    G1,
    G2,
    G3,
}

impl RoastMachineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoastMachineMode::G1 => "G1",
            RoastMachineMode::G2 => "G2",
            RoastMachineMode::G3 => "G3",
        }
    }
}

/// Look up the machine mode for a single-origin bean. Unknown beans have no
/// preset and the operator picks the mode by hand.
pub fn machine_mode_for(bean_name: &str) -> Option<RoastMachineMode> {
    match bean_name.trim().to_ascii_lowercase().as_str() {
        "brazil" | "jamaica" | "dominica" | "vietnam" | "haiti" => Some(RoastMachineMode::G1),
        "peru" | "el salvador" | "guatemala" => Some(RoastMachineMode::G2),
        "ethiopia" | "colombia" | "indonesia" | "tanzania" | "rwanda" | "malawi" | "india" => {
            Some(RoastMachineMode::G3)
        }
        _ => None,
    }
}

/// Resolve the machine mode for a roast, blended or not.
///
/// Single origin uses the first bean's preset. For a blend the majority bean's
/// mode wins; an even split takes the lower-numbered mode. A malformed ratio
/// falls back to the first bean's preset.
pub fn machine_mode_for_blend(
    bean_name: Option<&str>,
    bean_name2: Option<&str>,
    blend_ratio: Option<&str>,
) -> Option<RoastMachineMode> {
    let (bean2, ratio) = match (bean_name2, blend_ratio) {
        (Some(b), Some(r)) => (b, r),
        _ => return bean_name.and_then(machine_mode_for),
    };
    let bean1 = bean_name?;

    let parsed = parse_blend_ratio(ratio);
    let (r1, r2) = match parsed {
        Some(parts) => parts,
        None => return machine_mode_for(bean1),
    };

    let mode1 = machine_mode_for(bean1);
    let mode2 = machine_mode_for(bean2);
    let (m1, m2) = match (mode1, mode2) {
        (Some(m1), Some(m2)) => (m1, m2),
        _ => return mode1.or(mode2),
    };

    if r1 > r2 {
        Some(m1)
    } else if r2 > r1 {
        Some(m2)
    } else {
        Some(m1.min(m2))
    }
}

/// Parse a "5:5" / "8:2" style blend ratio.
fn parse_blend_ratio(ratio: &str) -> Option<(u32, u32)> {
    let (a, b) = ratio.split_once(':')?;
    let r1 = a.parse::<u32>().ok()?;
    let r2 = b.parse::<u32>().ok()?;
    Some((r1, r2))
}

/// One entry on the roast scheduler board. `entry_kind` is one of
/// `roaster_on`, `roast`, `after_purge`, `chaff_cleaning`; the bean/weight
/// fields only apply to preheat entries, the count fields to roast entries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoastSchedule {
    pub id: String,
    pub time: String,
    pub entry_kind: String,
    pub bean_name: Option<String>,
    pub bean_name2: Option<String>,
    pub blend_ratio: Option<String>,
    pub machine_mode: Option<String>,
    pub weight: Option<i32>,
    pub roast_level: Option<String>,
    pub roast_count: Option<i32>,
    pub bag_count: Option<i32>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewRoastSchedule {
    pub time: String,
    pub entry_kind: String,
    pub bean_name: Option<String>,
    pub bean_name2: Option<String>,
    pub blend_ratio: Option<String>,
    pub machine_mode: Option<String>,
    pub weight: Option<i32>,
    pub roast_level: Option<String>,
    pub roast_count: Option<i32>,
    pub bag_count: Option<i32>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoastSchedule {
    pub time: Option<String>,
    pub entry_kind: Option<String>,
    pub bean_name: Option<String>,
    pub bean_name2: Option<String>,
    pub blend_ratio: Option<String>,
    pub machine_mode: Option<String>,
    pub weight: Option<i32>,
    pub roast_level: Option<String>,
    pub roast_count: Option<i32>,
    pub bag_count: Option<i32>,
    pub sort_order: Option<i32>,
}

/// Daily time-table: one schedule per date, holding ordered time labels.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodaySchedule {
    pub id: String,
    pub date: NaiveDate,
    pub time_labels: Vec<TimeLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeLabel {
    pub id: String,
    pub time: String,
    pub content: String,
    pub memo: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTodaySchedule {
    pub date: NaiveDate,
    #[serde(default)]
    pub time_labels: Vec<NewTimeLabel>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeLabel {
    pub time: String,
    pub content: String,
    pub memo: Option<String>,
    pub sort_order: Option<i32>,
}

/// Patch for a day's time-table. `time_labels = None` leaves the label list
/// untouched; `Some(labels)` replaces it wholesale.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodaySchedule {
    pub date: Option<NaiveDate>,
    pub time_labels: Option<Vec<NewTimeLabel>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_origin_uses_bean_preset() {
        assert_eq!(machine_mode_for("Brazil"), Some(RoastMachineMode::G1));
        assert_eq!(machine_mode_for("guatemala"), Some(RoastMachineMode::G2));
        assert_eq!(machine_mode_for("Ethiopia"), Some(RoastMachineMode::G3));
        assert_eq!(machine_mode_for("kopi luwak"), None);
    }

    #[test]
    fn blend_majority_bean_wins() {
        let mode = machine_mode_for_blend(Some("Brazil"), Some("Ethiopia"), Some("8:2"));
        assert_eq!(mode, Some(RoastMachineMode::G1));
        let mode = machine_mode_for_blend(Some("Brazil"), Some("Ethiopia"), Some("2:8"));
        assert_eq!(mode, Some(RoastMachineMode::G3));
    }

    #[test]
    fn blend_tie_takes_lower_mode() {
        let mode = machine_mode_for_blend(Some("Ethiopia"), Some("Peru"), Some("5:5"));
        assert_eq!(mode, Some(RoastMachineMode::G2));
    }

    #[test]
    fn blend_with_unknown_bean_falls_back_to_known_side() {
        let mode = machine_mode_for_blend(Some("mystery"), Some("Peru"), Some("5:5"));
        assert_eq!(mode, Some(RoastMachineMode::G2));
    }

    #[test]
    fn malformed_ratio_falls_back_to_first_bean() {
        let mode = machine_mode_for_blend(Some("Brazil"), Some("Ethiopia"), Some("half"));
        assert_eq!(mode, Some(RoastMachineMode::G1));
    }

    #[test]
    fn missing_second_bean_is_single_origin() {
        let mode = machine_mode_for_blend(Some("Peru"), None, Some("5:5"));
        assert_eq!(mode, Some(RoastMachineMode::G2));
        assert_eq!(machine_mode_for_blend(None, None, None), None);
    }

    #[test]
    fn today_schedule_patch_fields_are_independent() {
        let patch: UpdateTodaySchedule = serde_json::from_str(r#"{"date":"2025-06-02"}"#).unwrap();
        assert_eq!(patch.date, NaiveDate::from_ymd_opt(2025, 6, 2));
        assert!(patch.time_labels.is_none());

        let patch: UpdateTodaySchedule = serde_json::from_str(r#"{"timeLabels":[]}"#).unwrap();
        assert!(patch.date.is_none());
        assert!(patch.time_labels.unwrap().is_empty());
    }
}
