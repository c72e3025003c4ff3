//! HTTP client implementation for the Fitbit Web API.
//!
//! This module provides a reqwest-based implementation of the
//! [`FitbitClient`](crate::FitbitClient) trait: the authenticated fetch
//! adapter, the per-endpoint response shapes, and the aggregation entry
//! points the dashboard routes call.

use crate::series::{self, SeriesPoint};
use crate::{
    ActivitySummary, CalorieRecord, CalorieWeightRecord, DailyFoodLog, DailySummary, FitbitClient,
    FitbitError, FoodLogEntry, ImportOutcome, WeightBodyFatRecord, WeightCsvRecord,
};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

/// Client for the Fitbit Web API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestFitbitClient {
    base_url: String,
    access_token: SecretString,
    client: reqwest::Client,
}

impl ReqwestFitbitClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the Fitbit API (e.g., "https://api.fitbit.com")
    /// * `access_token` - The pre-provisioned OAuth bearer token
    pub fn new(base_url: &str, access_token: SecretString) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .expect("reqwest client build should not fail");
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            client,
        }
    }

    /// Build a resource URL under the authenticated user scope.
    fn user_url(&self, path: &str) -> String {
        format!("{}/1/user/-/{}", self.base_url, path)
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Build an authenticated POST request.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(self.access_token.expose_secret())
    }

    /// Execute a GET and decode the JSON body, mapping non-success
    /// statuses to [`FitbitError::Fetch`].
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        resource: &'static str,
        url: &str,
    ) -> Result<T, FitbitError> {
        tracing::debug!(resource, "fetching");
        metrics::counter!("fitbit_client_requests_total").increment(1);
        let resp = self.get_request(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FitbitError::Fetch {
                resource,
                status_text: status_text(status),
            });
        }
        Ok(resp.json::<T>().await?)
    }

    /// Execute a form-encoded POST with no expected response body.
    async fn post_form(
        &self,
        metric: &'static str,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<(), FitbitError> {
        metrics::counter!("fitbit_client_requests_total").increment(1);
        let resp = self.post_request(url).form(params).send().await?;
        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(metric, status = %status, "write rejected");
            return Err(FitbitError::Write {
                metric,
                status_text: status_text(status),
            });
        }
        Ok(())
    }

    /// Fetch one range endpoint and extract its series.
    async fn fetch_series(
        &self,
        resource: &'static str,
        path: &str,
        series_key: &str,
    ) -> Result<Vec<SeriesPoint>, FitbitError> {
        let raw: serde_json::Value = self.fetch_json(resource, &self.user_url(path)).await?;
        Ok(series::parse_series(&raw, series_key))
    }
}

/// Human-readable reason phrase for a status, falling back to the code.
fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string())
}

/// Reject anything that is not a `YYYY-MM-DD` calendar date before it
/// reaches a URL path segment. The length check keeps out unpadded dates,
/// which chrono would otherwise accept.
fn validate_date(date: &str) -> Result<(), FitbitError> {
    let well_formed =
        date.len() == 10 && chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(FitbitError::InvalidInput(format!("invalid date: {date}")))
    }
}

#[async_trait]
impl FitbitClient for ReqwestFitbitClient {
    async fn get_activity_summary(&self, date: &str) -> Result<ActivitySummary, FitbitError> {
        validate_date(date)?;
        let url = self.user_url(&format!("activities/date/{date}.json"));

        #[derive(serde::Deserialize)]
        struct ActivityPayload {
            summary: Option<ActivityTotals>,
        }
        #[derive(serde::Deserialize, Default)]
        struct ActivityTotals {
            #[serde(default, rename = "caloriesOut")]
            calories_out: u32,
            #[serde(default)]
            steps: u32,
        }

        let payload: ActivityPayload = self.fetch_json("activity data", &url).await?;
        let totals = payload.summary.unwrap_or_default();
        Ok(ActivitySummary {
            calories_out: totals.calories_out,
            steps: totals.steps,
        })
    }

    async fn get_nutrition_summary(&self, date: &str) -> Result<f64, FitbitError> {
        validate_date(date)?;
        let url = self.user_url(&format!("foods/log/date/{date}.json"));

        #[derive(serde::Deserialize)]
        struct FoodLogPayload {
            summary: Option<NutritionTotals>,
        }
        #[derive(serde::Deserialize)]
        struct NutritionTotals {
            #[serde(default)]
            calories: f64,
        }

        let payload: FoodLogPayload = self.fetch_json("nutrition data", &url).await?;
        Ok(payload.summary.map(|s| s.calories).unwrap_or(0.0))
    }

    async fn get_logged_weight(&self, date: &str) -> Result<f64, FitbitError> {
        validate_date(date)?;
        let url = self.user_url(&format!("body/log/weight/date/{date}.json"));

        #[derive(serde::Deserialize)]
        struct WeightLogPayload {
            #[serde(default, rename = "body-weight")]
            body_weight: Vec<LoggedValue>,
            #[serde(default)]
            weight: Vec<ScaleEntry>,
        }
        #[derive(serde::Deserialize)]
        struct LoggedValue {
            #[serde(default)]
            value: serde_json::Value,
        }
        #[derive(serde::Deserialize)]
        struct ScaleEntry {
            #[serde(default)]
            weight: f64,
        }

        let payload: WeightLogPayload = self.fetch_json("weight data", &url).await?;
        if let Some(first) = payload.body_weight.first() {
            return Ok(series::lenient_number(Some(&first.value)));
        }
        Ok(payload.weight.first().map(|e| e.weight).unwrap_or(0.0))
    }

    async fn get_daily_summary(&self, date: &str) -> Result<DailySummary, FitbitError> {
        // Fail-fast join: any component failure fails the whole snapshot,
        // never a partially populated one.
        let (activity, calories_consumed, weight) = tokio::try_join!(
            self.get_activity_summary(date),
            self.get_nutrition_summary(date),
            self.get_logged_weight(date),
        )?;
        Ok(DailySummary {
            date: date.to_string(),
            calories_burned: activity.calories_out,
            calories_consumed: calories_consumed as u32,
            weight,
            steps: activity.steps,
        })
    }

    async fn get_food_log(&self, date: &str) -> Result<DailyFoodLog, FitbitError> {
        validate_date(date)?;
        let url = self.user_url(&format!("foods/log/date/{date}.json"));

        #[derive(serde::Deserialize)]
        struct FoodsPayload {
            #[serde(default)]
            foods: Vec<FoodItem>,
            summary: Option<NutritionTotals>,
        }
        #[derive(serde::Deserialize)]
        struct NutritionTotals {
            #[serde(default)]
            calories: f64,
        }
        #[derive(serde::Deserialize)]
        struct FoodItem {
            #[serde(default, rename = "logId")]
            log_id: u64,
            #[serde(rename = "loggedFood")]
            logged_food: Option<LoggedFood>,
        }
        #[derive(serde::Deserialize)]
        struct LoggedFood {
            #[serde(default)]
            name: String,
            #[serde(default, rename = "mealTypeId")]
            meal_type_id: u32,
            #[serde(default)]
            amount: Option<f64>,
            unit: Option<FoodUnit>,
            #[serde(default)]
            calories: f64,
        }
        #[derive(serde::Deserialize)]
        struct FoodUnit {
            #[serde(default)]
            name: String,
        }

        let payload: FoodsPayload = self.fetch_json("food log", &url).await?;
        let entries = payload
            .foods
            .into_iter()
            .filter_map(|item| {
                let food = item.logged_food?;
                Some(FoodLogEntry {
                    log_id: item.log_id,
                    meal_type_id: food.meal_type_id,
                    name: food.name,
                    amount: food.amount,
                    unit: food.unit.map(|u| u.name),
                    calories: food.calories,
                })
            })
            .collect();
        Ok(DailyFoodLog {
            date: date.to_string(),
            entries,
            total_calories: payload.summary.map(|s| s.calories).unwrap_or(0.0),
        })
    }

    async fn get_calories_series(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<CalorieRecord>, FitbitError> {
        validate_date(start)?;
        validate_date(end)?;
        let out_path = format!("activities/calories/date/{start}/{end}.json");
        let consumed_path = format!("foods/log/caloriesIn/date/{start}/{end}.json");
        let (out, consumed) = tokio::try_join!(
            self.fetch_series(
                "activities time series",
                &out_path,
                "activities-calories",
            ),
            self.fetch_series(
                "nutrition time series",
                &consumed_path,
                "foods-log-caloriesIn",
            ),
        )?;
        Ok(series::merge_series(&[&out, &consumed])
            .into_iter()
            .map(|row| CalorieRecord {
                calories_out: series::calorie_column(row.values[0]),
                calories_in: series::calorie_column(row.values[1]),
                date: row.date,
            })
            .collect())
    }

    async fn get_calories_and_weight_series(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<CalorieWeightRecord>, FitbitError> {
        validate_date(start)?;
        validate_date(end)?;
        let out_path = format!("activities/calories/date/{start}/{end}.json");
        let consumed_path = format!("foods/log/caloriesIn/date/{start}/{end}.json");
        let weight_path = format!("body/weight/date/{start}/{end}.json");
        let (out, consumed, weight) = tokio::try_join!(
            self.fetch_series(
                "activities time series",
                &out_path,
                "activities-calories",
            ),
            self.fetch_series(
                "nutrition time series",
                &consumed_path,
                "foods-log-caloriesIn",
            ),
            self.fetch_series(
                "weight time series",
                &weight_path,
                "body-weight",
            ),
        )?;
        Ok(series::merge_series(&[&out, &consumed, &weight])
            .into_iter()
            .map(|row| CalorieWeightRecord {
                calories_out: series::calorie_column(row.values[0]),
                calories_in: series::calorie_column(row.values[1]),
                weight: row.values[2],
                date: row.date,
            })
            .collect())
    }

    async fn get_weight_and_body_fat_series(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<WeightBodyFatRecord>, FitbitError> {
        validate_date(start)?;
        validate_date(end)?;
        let weight_path = format!("body/weight/date/{start}/{end}.json");
        let body_fat_path = format!("body/fat/date/{start}/{end}.json");
        let (weight, body_fat) = tokio::try_join!(
            self.fetch_series(
                "weight time series",
                &weight_path,
                "body-weight",
            ),
            self.fetch_series(
                "body fat time series",
                &body_fat_path,
                "body-fat",
            ),
        )?;
        Ok(series::merge_series(&[&weight, &body_fat])
            .into_iter()
            .map(|row| WeightBodyFatRecord {
                weight: row.values[0],
                body_fat: row.values[1],
                date: row.date,
            })
            .collect())
    }

    async fn log_weight(&self, date: &str, weight_kg: f64) -> Result<(), FitbitError> {
        validate_date(date)?;
        let url = self.user_url("body/log/weight.json");
        let params = [
            ("weight", weight_kg.to_string()),
            ("date", date.to_string()),
        ];
        self.post_form("weight", &url, &params).await
    }

    async fn log_body_fat(&self, date: &str, percent: f64) -> Result<(), FitbitError> {
        validate_date(date)?;
        let url = self.user_url("body/log/fat.json");
        let params = [("fat", percent.to_string()), ("date", date.to_string())];
        self.post_form("body fat", &url, &params).await
    }

    async fn import_weight_records(&self, records: &[WeightCsvRecord]) -> ImportOutcome {
        let mut outcome = ImportOutcome::default();
        for record in records {
            let (weight_res, fat_res) = tokio::join!(
                self.log_weight(&record.date, record.weight),
                self.log_body_fat(&record.date, record.body_fat),
            );
            // Both writes always run; when both fail the weight write's
            // error is the one reported.
            match weight_res.err().or(fat_res.err()) {
                None => outcome.success += 1,
                Some(err) => {
                    tracing::warn!(date = %record.date, error = %err, "import record failed");
                    outcome.failed += 1;
                    outcome.errors.push(format!("{}: {}", record.date, err));
                }
            }
        }
        tracing::debug!(
            success = outcome.success,
            failed = outcome.failed,
            "import batch finished"
        );
        outcome
    }
}
