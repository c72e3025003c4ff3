//! Minimal `FitbitClient` trait and basic reqwest-based skeleton.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;
pub mod csv_import;
pub mod envelope;
pub mod http_client;
pub mod observability;
pub mod series;

#[derive(Debug, Error)]
pub enum FitbitError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to fetch {resource}: {status_text}")]
    Fetch {
        resource: &'static str,
        status_text: String,
    },
    #[error("failed to log {metric}: {status_text}")]
    Write {
        metric: &'static str,
        status_text: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid CSV at line {line}: {message}")]
    CsvFormat { line: usize, message: String },
    #[error("invalid {field} at line {line}: '{value}'")]
    CsvValidation {
        line: usize,
        field: &'static str,
        value: String,
    },
}

/// Single-day activity totals as reported by the provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivitySummary {
    pub calories_out: u32,
    pub steps: u32,
}

/// One day on the dashboard: burned vs consumed calories, weight, steps.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: String,
    pub calories_burned: u32,
    pub calories_consumed: u32,
    pub weight: f64,
    pub steps: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalorieRecord {
    pub date: String,
    pub calories_out: u32,
    pub calories_in: u32,
}

/// Calorie record joined with the weight series. `weight` is `None` when
/// the scale has no entry for that date; it is never zero-filled.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalorieWeightRecord {
    pub date: String,
    pub calories_out: u32,
    pub calories_in: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightBodyFatRecord {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat: Option<f64>,
}

/// One row of the weight/body-fat CSV after validation, date canonicalized
/// to `YYYY-MM-DD`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightCsvRecord {
    pub date: String,
    pub weight: f64,
    pub body_fat: f64,
}

/// Outcome of a CSV import batch. `errors` holds one `"{date}: {cause}"`
/// entry per failed record, in batch order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ImportOutcome {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FoodLogEntry {
    pub log_id: u64,
    pub meal_type_id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub calories: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyFoodLog {
    pub date: String,
    pub entries: Vec<FoodLogEntry>,
    pub total_calories: f64,
}

/// Dashboard label for a provider meal-type id.
pub fn meal_type_label(meal_type_id: u32) -> &'static str {
    match meal_type_id {
        1 => "朝食",
        2 => "午前の間食",
        3 => "昼食",
        4 => "午後の間食",
        5 => "夕食",
        _ => "その他",
    }
}

#[async_trait]
pub trait FitbitClient: Send + Sync + 'static {
    /// Activity totals (calories out, steps) for one day.
    async fn get_activity_summary(&self, date: &str) -> Result<ActivitySummary, FitbitError>;

    /// Calories consumed on one day.
    async fn get_nutrition_summary(&self, date: &str) -> Result<f64, FitbitError>;

    /// Most recent logged weight for one day, `0` when nothing was logged.
    async fn get_logged_weight(&self, date: &str) -> Result<f64, FitbitError>;

    /// Compose activity, nutrition and weight into one snapshot. Fails as
    /// a whole if any component fetch fails.
    async fn get_daily_summary(&self, date: &str) -> Result<DailySummary, FitbitError>;

    /// Logged foods for one day with per-entry detail.
    async fn get_food_log(&self, date: &str) -> Result<DailyFoodLog, FitbitError>;

    async fn get_calories_series(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<CalorieRecord>, FitbitError>;

    async fn get_calories_and_weight_series(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<CalorieWeightRecord>, FitbitError>;

    async fn get_weight_and_body_fat_series(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<WeightBodyFatRecord>, FitbitError>;

    /// Record a weight measurement (kg) for a date.
    async fn log_weight(&self, date: &str, weight_kg: f64) -> Result<(), FitbitError>;

    /// Record a body-fat percentage for a date.
    async fn log_body_fat(&self, date: &str, percent: f64) -> Result<(), FitbitError>;

    /// Write every record to the provider, isolating per-record failures.
    /// Never fails as a whole; inspect the outcome for partial failures.
    async fn import_weight_records(&self, records: &[WeightCsvRecord]) -> ImportOutcome;
}

#[cfg(test)]
mod tests {
    use crate::http_client::ReqwestFitbitClient;

    #[tokio::test]
    async fn client_new_and_basic() {
        let client = ReqwestFitbitClient::new(
            "http://localhost",
            secrecy::SecretString::new("token".into()),
        );
        let _ = client;
    }

    #[test]
    fn calorie_weight_record_omits_absent_weight() {
        let record = super::CalorieWeightRecord {
            date: "2024-01-02".into(),
            calories_out: 2300,
            calories_in: 1800,
            weight: None,
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert!(json.get("weight").is_none());
        assert_eq!(json["caloriesOut"], 2300);
    }

    #[test]
    fn daily_summary_uses_camel_case_keys() {
        let summary = super::DailySummary {
            date: "2024-01-01".into(),
            calories_burned: 2500,
            calories_consumed: 2000,
            weight: 70.5,
            steps: 10000,
        };
        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["caloriesBurned"], 2500);
        assert_eq!(json["caloriesConsumed"], 2000);
        assert_eq!(json["steps"], 10000);
    }

    #[test]
    fn meal_type_label_falls_back_for_unknown_ids() {
        assert_eq!(super::meal_type_label(1), "朝食");
        assert_eq!(super::meal_type_label(5), "夕食");
        assert_eq!(super::meal_type_label(42), "その他");
    }
}
