// Extracted Document Metrics
//
// Read-only helpers over the facility-agreement JSON the extraction service returns.

use serde::Serialize;
use serde_json::Value;

const AMOUNT_FIELDS: [&str; 3] = ["amount", "commitmentAmount", "facilityAmount"];

/// Number of entries in `facilities`, 0 when absent or not an array
pub fn facilities_count(document: &Value) -> usize {
    document
        .get("facilities")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Sum of all facility amounts
pub fn total_facility_amount(document: &Value) -> f64 {
    let Some(facilities) = document.get("facilities").and_then(Value::as_array) else {
        return 0.0;
    };

    facilities
        .iter()
        .map(|facility| {
            AMOUNT_FIELDS
                .iter()
                .filter_map(|field| facility.get(*field))
                .find(|v| !v.is_null())
                .map_or(0.0, amount_value)
        })
        .sum()
}

/// Supports both `amount: "£4,300,000"` and `amount: {"value": "£4,300,000", ...}`
fn amount_value(node: &Value) -> f64 {
    match node {
        Value::Object(map) => map.get("value").map_or(0.0, amount_value),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_amount(s),
        _ => 0.0,
    }
}

/// Strip currency symbols and thousands separators. Unparsable input counts as 0.
fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(*c, '.' | '-'))
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// 1_200_000 -> "$1.2M"
pub fn format_money_compact(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return format!("{}0", currency);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();

    let scaled = |n: f64, suffix: &str| {
        let text = format!("{:.1}", n);
        let text = text.strip_suffix(".0").unwrap_or(&text);
        format!("{}{}{}{}", sign, currency, text, suffix)
    };

    if abs >= 1_000_000_000.0 {
        scaled(abs / 1_000_000_000.0, "B")
    } else if abs >= 1_000_000.0 {
        scaled(abs / 1_000_000.0, "M")
    } else if abs >= 1_000.0 {
        scaled(abs / 1_000.0, "K")
    } else {
        format!("{}{}{}", sign, currency, abs.round())
    }
}

/// One gap reported by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

/// Flatten `validationAndGaps` into a list of issues
pub fn validation_issues(document: &Value) -> Vec<ValidationIssue> {
    let Some(gaps) = document.get("validationAndGaps") else {
        return Vec::new();
    };

    [
        ("missing", "missingItems"),
        ("nonSearchable", "nonSearchablePages"),
        ("notes", "notes"),
    ]
    .into_iter()
    .flat_map(|(field, key)| {
        gaps.get(key)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(move |item| ValidationIssue {
                field: field.to_string(),
                message: display_value(item),
            })
    })
    .collect()
}

/// Headline fields shown after an extraction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealSummary {
    pub deal_name: String,
    pub borrower: String,
    pub agent: String,
    pub facilities: usize,
    pub total_amount: f64,
}

impl DealSummary {
    pub fn from_document(document: &Value) -> Self {
        Self {
            deal_name: first_present(document, &[&["dealName"], &["profile"]])
                .unwrap_or_else(|| "Facility Agreement".to_string()),
            borrower: first_present(
                document,
                &[&["parties", "borrower", "legalName"], &["parties", "borrowerName"]],
            )
            .unwrap_or_default(),
            agent: first_present(document, &[
                &["parties", "administrativeAgent", "legalName"],
                &["parties", "administrativeAgentName"],
            ])
            .unwrap_or_default(),
            facilities: facilities_count(document),
            total_amount: total_facility_amount(document),
        }
    }
}

fn first_present(document: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| lookup(document, path))
        .map(friendly_value)
        .find(|v| !v.is_empty())
}

fn lookup<'a>(document: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(document, |node, key| node.get(*key))
}

/// Scalars as text, `{value, citation}` cells unwrapped, containers summarized.
/// Empty string means "nothing to show".
fn friendly_value(node: &Value) -> String {
    match node {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(_) | Value::Bool(_) => node.to_string(),
        Value::Object(map) if map.contains_key("value") && map.contains_key("citation") => {
            map.get("value").map(friendly_value).unwrap_or_default()
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(_) => "[object]".to_string(),
    }
}

fn display_value(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_facility_metrics() {
        let doc = json!({
            "facilities": [
                {"amount": {"value": "£4,300,000,000", "citation": "p.3"}},
                {"commitmentAmount": "250,000.50"},
                {"facilityAmount": 1000},
                {"amount": "n/a"}
            ]
        });

        assert_eq!(facilities_count(&doc), 4);
        assert_eq!(total_facility_amount(&doc), 4_300_251_000.5);
    }

    #[test]
    fn test_metrics_without_facilities() {
        assert_eq!(facilities_count(&json!({})), 0);
        assert_eq!(facilities_count(&json!({"facilities": "none"})), 0);
        assert_eq!(total_facility_amount(&json!(null)), 0.0);
    }

    #[test]
    fn test_format_money_compact() {
        assert_eq!(format_money_compact(1_200_000.0, "$"), "$1.2M");
        assert_eq!(format_money_compact(4_000_000_000.0, "£"), "£4B");
        assert_eq!(format_money_compact(1_500.0, "$"), "$1.5K");
        assert_eq!(format_money_compact(-2_000_000.0, "$"), "-$2M");
        assert_eq!(format_money_compact(999.6, "$"), "$1000");
        assert_eq!(format_money_compact(f64::NAN, "$"), "$0");
    }

    #[test]
    fn test_validation_issues() {
        let doc = json!({
            "validationAndGaps": {
                "missingItems": ["margin grid"],
                "nonSearchablePages": [12, 13],
                "notes": "not an array"
            }
        });

        let issues = validation_issues(&doc);
        assert_eq!(issues.len(), 3);
        assert_eq!(issues[0].field, "missing");
        assert_eq!(issues[0].message, "margin grid");
        assert_eq!(issues[2].message, "13");
        assert!(validation_issues(&json!({})).is_empty());
    }

    #[test]
    fn test_deal_summary_fallbacks() {
        let doc = json!({
            "profile": "FACILITY_AGREEMENT",
            "parties": {
                "borrower": {"legalName": {"value": "Acme plc", "citation": "p.1"}},
                "administrativeAgentName": "Big Bank"
            },
            "facilities": [{"amount": "100"}]
        });

        let summary = DealSummary::from_document(&doc);
        assert_eq!(summary.deal_name, "FACILITY_AGREEMENT");
        assert_eq!(summary.borrower, "Acme plc");
        assert_eq!(summary.agent, "Big Bank");
        assert_eq!(summary.facilities, 1);
        assert_eq!(summary.total_amount, 100.0);

        let empty = DealSummary::from_document(&json!({}));
        assert_eq!(empty.deal_name, "Facility Agreement");
        assert_eq!(empty.borrower, "");
    }
}
