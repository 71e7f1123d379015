use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TastingSession {
    pub id: String,
    pub name: Option<String>,
    pub bean_name: String,
    pub roast_level: String,
    pub memo: Option<String>,
    pub user_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTastingSession {
    pub name: Option<String>,
    pub bean_name: String,
    pub roast_level: String,
    pub memo: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTastingSession {
    pub name: Option<String>,
    pub bean_name: Option<String>,
    pub roast_level: Option<String>,
    pub memo: Option<String>,
}

/// One member's scoring of a session. Scores run 1.0–5.0 in 0.125 steps.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TastingRecord {
    pub id: String,
    pub session_id: String,
    pub bean_name: String,
    pub tasting_date: NaiveDate,
    pub roast_level: String,
    pub bitterness: f64,
    pub acidity: f64,
    pub body: f64,
    pub sweetness: f64,
    pub aroma: f64,
    pub overall_rating: f64,
    pub overall_impression: Option<String>,
    pub user_id: String,
    pub member_id: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTastingRecord {
    pub session_id: String,
    pub bean_name: String,
    pub tasting_date: NaiveDate,
    pub roast_level: String,
    pub bitterness: f64,
    pub acidity: f64,
    pub body: f64,
    pub sweetness: f64,
    pub aroma: f64,
    pub overall_rating: f64,
    pub overall_impression: Option<String>,
    pub member_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTastingRecord {
    pub bean_name: Option<String>,
    pub tasting_date: Option<NaiveDate>,
    pub roast_level: Option<String>,
    pub bitterness: Option<f64>,
    pub acidity: Option<f64>,
    pub body: Option<f64>,
    pub sweetness: Option<f64>,
    pub aroma: Option<f64>,
    pub overall_rating: Option<f64>,
    pub overall_impression: Option<String>,
    pub member_id: Option<String>,
}

/// Mean of each score axis across a session's records (radar-chart input).
#[derive(Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AverageScores {
    pub bitterness: f64,
    pub acidity: f64,
    pub body: f64,
    pub sweetness: f64,
    pub aroma: f64,
    pub overall_rating: f64,
}

/// Average the score axes over a session's records. Empty input yields zeros.
pub fn average_scores(records: &[TastingRecord]) -> AverageScores {
    if records.is_empty() {
        return AverageScores::default();
    }
    let count = records.len() as f64;
    let mut sum = AverageScores::default();
    for r in records {
        sum.bitterness += r.bitterness;
        sum.acidity += r.acidity;
        sum.body += r.body;
        sum.sweetness += r.sweetness;
        sum.aroma += r.aroma;
        sum.overall_rating += r.overall_rating;
    }
    AverageScores {
        bitterness: sum.bitterness / count,
        acidity: sum.acidity / count,
        body: sum.body / count,
        sweetness: sum.sweetness / count,
        aroma: sum.aroma / count,
        overall_rating: sum.overall_rating / count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(bitterness: f64, aroma: f64) -> TastingRecord {
        let now = NaiveDate::from_ymd_opt(2025, 6, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        TastingRecord {
            id: "r".into(),
            session_id: "s".into(),
            bean_name: "Brazil".into(),
            tasting_date: now.date(),
            roast_level: "medium".into(),
            bitterness,
            acidity: 3.0,
            body: 3.0,
            sweetness: 3.0,
            aroma,
            overall_rating: 4.0,
            overall_impression: None,
            user_id: "u".into(),
            member_id: "m".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn averages_over_records() {
        let avg = average_scores(&[record(2.0, 5.0), record(4.0, 3.0)]);
        assert_eq!(avg.bitterness, 3.0);
        assert_eq!(avg.aroma, 4.0);
        assert_eq!(avg.acidity, 3.0);
        assert_eq!(avg.overall_rating, 4.0);
    }

    #[test]
    fn empty_session_averages_to_zero() {
        assert_eq!(average_scores(&[]), AverageScores::default());
    }
}
