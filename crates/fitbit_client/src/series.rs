//! Parsing and reconciliation of date-keyed daily metric series.
//!
//! Provider time-series responses arrive as `{"<series-key>": [{"dateTime",
//! "value"}, ...]}` with string-encoded values and no ordering guarantee.
//! [`parse_series`] turns one such response into an ordered [`SeriesPoint`]
//! sequence; [`merge_series`] joins any number of parsed series on the
//! union of their dates.

use serde_json::Value;
use std::collections::BTreeMap;

/// One sample of a daily metric series, keyed by a `YYYY-MM-DD` date.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// One output row of [`merge_series`]: a union date plus, per input series,
/// the sample value or `None` where that series has no data for the date.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedRow {
    pub date: String,
    pub values: Vec<Option<f64>>,
}

/// Extract the series stored under `series_key` from a raw provider
/// response, sorted ascending by date.
///
/// Malformed values (empty strings, non-numeric text) coerce to `0.0`
/// rather than failing. A missing or empty array yields an empty vec.
/// Elements without a `dateTime` are skipped.
pub fn parse_series(raw: &Value, series_key: &str) -> Vec<SeriesPoint> {
    let Some(items) = raw.get(series_key).and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut points: Vec<SeriesPoint> = items
        .iter()
        .filter_map(|item| {
            let date = item.get("dateTime")?.as_str()?.to_string();
            Some(SeriesPoint {
                date,
                value: lenient_number(item.get("value")),
            })
        })
        .collect();
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

/// Coerce a JSON value to `f64`, accepting both string-encoded and plain
/// numbers. Anything unparseable becomes `0.0`.
pub(crate) fn lenient_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Union-and-fill join of any number of date-keyed series.
///
/// The output holds one row per date appearing in at least one input,
/// strictly ascending with no duplicates; `values[i]` is input `i`'s
/// sample for that date or `None`. Callers apply the per-field missing
/// policy (see [`calorie_column`] for calorie-typed fields; weight and
/// body-fat fields keep the `Option`).
pub fn merge_series(inputs: &[&[SeriesPoint]]) -> Vec<MergedRow> {
    let mut by_date: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
    for (idx, series) in inputs.iter().enumerate() {
        for point in *series {
            by_date
                .entry(point.date.as_str())
                .or_insert_with(|| vec![None; inputs.len()])[idx] = Some(point.value);
        }
    }
    by_date
        .into_iter()
        .map(|(date, values)| MergedRow {
            date: date.to_string(),
            values,
        })
        .collect()
}

/// Missing policy for calorie-typed columns: no data means no calories.
pub fn calorie_column(value: Option<f64>) -> u32 {
    value.unwrap_or(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn series(points: &[(&str, f64)]) -> Vec<SeriesPoint> {
        points
            .iter()
            .map(|(date, value)| SeriesPoint {
                date: (*date).into(),
                value: *value,
            })
            .collect()
    }

    #[test]
    fn parse_series_sorts_by_date() {
        let raw = json!({
            "body-weight": [
                {"dateTime": "2024-01-03", "value": "69.8"},
                {"dateTime": "2024-01-01", "value": "70.5"},
                {"dateTime": "2024-01-02", "value": "70.2"},
            ]
        });
        let parsed = parse_series(&raw, "body-weight");
        let dates: Vec<&str> = parsed.iter().map(|p| p.date.as_str()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(parsed[0].value, 70.5);
    }

    #[test]
    fn parse_series_coerces_malformed_values_to_zero() {
        let raw = json!({
            "activities-calories": [
                {"dateTime": "2024-01-01", "value": "invalid"},
                {"dateTime": "2024-01-02", "value": ""},
                {"dateTime": "2024-01-03", "value": "2700"},
            ]
        });
        let parsed = parse_series(&raw, "activities-calories");
        assert_eq!(parsed[0].value, 0.0);
        assert_eq!(parsed[1].value, 0.0);
        assert_eq!(parsed[2].value, 2700.0);
    }

    #[test]
    fn parse_series_accepts_plain_numbers() {
        let raw = json!({"body-fat": [{"dateTime": "2024-01-01", "value": 15.5}]});
        let parsed = parse_series(&raw, "body-fat");
        assert_eq!(parsed[0].value, 15.5);
    }

    #[test]
    fn parse_series_missing_key_yields_empty() {
        let raw = json!({"something-else": []});
        assert!(parse_series(&raw, "body-weight").is_empty());
        assert!(parse_series(&json!({"body-weight": []}), "body-weight").is_empty());
    }

    #[test]
    fn parse_series_skips_elements_without_date() {
        let raw = json!({
            "body-weight": [
                {"value": "70.0"},
                {"dateTime": "2024-01-02", "value": "70.2"},
            ]
        });
        let parsed = parse_series(&raw, "body-weight");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].date, "2024-01-02");
    }

    #[test]
    fn merge_series_keys_by_union_of_dates() {
        let a = series(&[("2024-01-01", 2500.0), ("2024-01-03", 2700.0)]);
        let b = series(&[("2024-01-02", 1800.0), ("2024-01-03", 2200.0)]);
        let merged = merge_series(&[&a, &b]);

        assert_eq!(merged.len(), 3);
        let dates: Vec<&str> = merged.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(merged[0].values, vec![Some(2500.0), None]);
        assert_eq!(merged[1].values, vec![None, Some(1800.0)]);
        assert_eq!(merged[2].values, vec![Some(2700.0), Some(2200.0)]);
    }

    #[test]
    fn merge_series_is_commutative_per_field() {
        let a = series(&[("2024-01-01", 1.0), ("2024-01-02", 2.0)]);
        let b = series(&[("2024-01-02", 3.0), ("2024-01-04", 4.0)]);

        let ab = merge_series(&[&a, &b]);
        let ba = merge_series(&[&b, &a]);

        assert_eq!(ab.len(), ba.len());
        for (row_ab, row_ba) in ab.iter().zip(&ba) {
            assert_eq!(row_ab.date, row_ba.date);
            assert_eq!(row_ab.values[0], row_ba.values[1]);
            assert_eq!(row_ab.values[1], row_ba.values[0]);
        }
    }

    #[test]
    fn merge_series_output_has_no_duplicate_dates() {
        let a = series(&[("2024-01-01", 1.0), ("2024-01-01", 5.0)]);
        let b = series(&[("2024-01-01", 2.0)]);
        let merged = merge_series(&[&a, &b]);
        assert_eq!(merged.len(), 1);
        // last sample for a repeated date wins within one series
        assert_eq!(merged[0].values, vec![Some(5.0), Some(2.0)]);
    }

    #[test]
    fn merge_series_of_empty_inputs_is_empty() {
        let merged = merge_series(&[&[], &[]]);
        assert!(merged.is_empty());
    }

    #[test]
    fn merge_series_three_way_union() {
        let a = series(&[("2024-01-01", 2500.0)]);
        let b = series(&[("2024-01-01", 2000.0), ("2024-01-02", 1800.0)]);
        let c = series(&[("2024-01-02", 70.2)]);
        let merged = merge_series(&[&a, &b, &c]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].values, vec![Some(2500.0), Some(2000.0), None]);
        assert_eq!(merged[1].values, vec![None, Some(1800.0), Some(70.2)]);
    }

    #[test]
    fn calorie_column_defaults_missing_to_zero() {
        assert_eq!(calorie_column(None), 0);
        assert_eq!(calorie_column(Some(2500.0)), 2500);
        assert_eq!(calorie_column(Some(2500.7)), 2500);
    }
}
