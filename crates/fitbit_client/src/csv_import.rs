//! Parsing and validation of the weight/body-fat CSV export.
//!
//! The import format is the fixed three-column sheet the dashboard's users
//! download from their scale vendor: a Japanese header row followed by
//! `YYYY/M/D,weight,body-fat` rows. Month and day arrive without zero
//! padding; dates are canonicalized to `YYYY-MM-DD` so they join with the
//! provider's series keys.

use crate::{FitbitError, WeightCsvRecord};
use std::collections::BTreeMap;

const EXPECTED_HEADERS: [&str; 3] = ["日付", "体重(kg)", "体脂肪率(%)"];

/// Parse the CSV text into validated records, deduplicated by date
/// (last row in file order wins) and sorted ascending.
///
/// A header-only file parses to an empty vec; structural problems fail
/// with [`FitbitError::CsvFormat`] and out-of-range numeric fields with
/// [`FitbitError::CsvValidation`], both carrying the 1-based line number.
pub fn parse_weight_csv(text: &str) -> Result<Vec<WeightCsvRecord>, FitbitError> {
    let mut lines = text.lines();
    let header = lines.next().unwrap_or("");
    if !EXPECTED_HEADERS.iter().all(|h| header.contains(h)) {
        return Err(FitbitError::CsvFormat {
            line: 1,
            message: format!("expected headers: {}", EXPECTED_HEADERS.join(", ")),
        });
    }

    let mut by_date: BTreeMap<String, WeightCsvRecord> = BTreeMap::new();
    for (idx, line) in lines.enumerate() {
        let line_no = idx + 2;
        let row = line.trim();
        if row.is_empty() {
            continue;
        }
        let fields: Vec<&str> = row.split(',').collect();
        if fields.len() != 3 {
            return Err(FitbitError::CsvFormat {
                line: line_no,
                message: format!("expected 3 columns, got {}", fields.len()),
            });
        }
        let date = canonical_date(fields[0].trim()).ok_or_else(|| FitbitError::CsvFormat {
            line: line_no,
            message: "expected YYYY/M/D date".into(),
        })?;
        let weight =
            positive_float(fields[1].trim()).ok_or_else(|| FitbitError::CsvValidation {
                line: line_no,
                field: "weight",
                value: fields[1].trim().into(),
            })?;
        let body_fat =
            positive_float(fields[2].trim()).ok_or_else(|| FitbitError::CsvValidation {
                line: line_no,
                field: "body fat",
                value: fields[2].trim().into(),
            })?;
        by_date.insert(
            date.clone(),
            WeightCsvRecord {
                date,
                weight,
                body_fat,
            },
        );
    }
    Ok(by_date.into_values().collect())
}

/// Canonicalize a `YYYY/M/D` date (month and day one or two digits) to
/// `YYYY-MM-DD`. Only the grammar is checked; calendar validity is not.
fn canonical_date(raw: &str) -> Option<String> {
    let parts: Vec<&str> = raw.split('/').collect();
    if parts.len() != 3 {
        return None;
    }
    let year: u32 = parts[0].trim().parse().ok()?;
    let month: u32 = parts[1].trim().parse().ok()?;
    let day: u32 = parts[2].trim().parse().ok()?;
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn positive_float(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| *v > 0.0)
}
