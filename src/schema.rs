use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel rendered wherever a metric has no value for a period.
pub const MISSING: &str = "N/A";

/// Statement type assigned to line items that cannot be attributed to a
/// recognized statement.
pub const GENERAL_STATEMENT: &str = "General";

/// The two report families. Annual and quarterly windows are fetched and
/// displayed separately, never interleaved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFamily {
    Annual,
    Quarterly,
}

impl fmt::Display for ReportFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual => write!(f, "annual"),
            Self::Quarterly => write!(f, "quarterly"),
        }
    }
}

/// Identifies one reporting interval for a company. Quarter 0 denotes an
/// annual period.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct PeriodKey {
    pub year: i32,
    pub quarter: u8,
}

impl PeriodKey {
    pub fn annual(year: i32) -> Self {
        Self { year, quarter: 0 }
    }

    pub fn quarterly(year: i32, quarter: u8) -> Self {
        Self { year, quarter }
    }

    /// Machine-readable composite key, e.g. `"2023-0"`.
    pub fn composite_key(&self) -> String {
        format!("{}-{}", self.year, self.quarter)
    }
}

/// A raw scalar from the report blob, decoded once at the boundary. All
/// downstream comparisons work on this variant rather than on untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    String(String),
    Null,
}

impl RawValue {
    /// Plain decimal string form, or `None` for an absent value.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Number(n) => Some(format_decimal(*n)),
            Self::String(s) => Some(s.clone()),
            Self::Null => None,
        }
    }
}

fn format_decimal(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One raw report for one company and period, as stored by the acquisition
/// subsystem. Read-only input for a normalization pass; the duplicate-period
/// year shift is the single exception and goes through the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub record_id: u64,
    pub period: PeriodKey,
    pub end_date: NaiveDate,
    pub is_parsed: bool,
    /// The report's flat key/value blob, exactly as stored.
    pub fields_json: String,
}

impl RawRecord {
    pub fn new(
        record_id: u64,
        period: PeriodKey,
        end_date: NaiveDate,
        is_parsed: bool,
        fields_json: String,
    ) -> Self {
        Self {
            record_id,
            period,
            end_date,
            is_parsed,
            fields_json,
        }
    }

    /// Builds a parsed record from decoded field pairs.
    pub fn from_fields(
        record_id: u64,
        period: PeriodKey,
        end_date: NaiveDate,
        fields: &[(&str, RawValue)],
    ) -> Self {
        let map: serde_json::Map<String, serde_json::Value> = fields
            .iter()
            .map(|(key, value)| {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (key.to_string(), json)
            })
            .collect();
        Self::new(
            record_id,
            period,
            end_date,
            true,
            serde_json::Value::Object(map).to_string(),
        )
    }

    /// Decodes the field blob. A malformed blob degrades to an empty field
    /// set, so the period renders as all missing-markers instead of aborting
    /// the run.
    pub fn decoded_fields(&self) -> BTreeMap<String, RawValue> {
        match serde_json::from_str(&self.fields_json) {
            Ok(fields) => fields,
            Err(err) => {
                warn!(
                    "Record {} for period {} has a malformed field blob: {}",
                    self.record_id,
                    self.period.composite_key(),
                    err
                );
                BTreeMap::new()
            }
        }
    }
}

/// Derived identity of one line item: canonical statement type plus metric
/// name. Two different raw field names may normalize to the same key; that
/// compression is the point of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedKey {
    pub statement_type: String,
    pub metric_name: String,
}

impl NormalizedKey {
    pub fn new(statement_type: impl Into<String>, metric_name: impl Into<String>) -> Self {
        Self {
            statement_type: statement_type.into(),
            metric_name: metric_name.into(),
        }
    }

    /// Key for an untagged field name that skips canonicalization entirely.
    pub fn untagged(raw_key: impl Into<String>) -> Self {
        Self::new(GENERAL_STATEMENT, raw_key)
    }

    /// Case-insensitive identity used for table lookups.
    pub(crate) fn fold(&self) -> String {
        format!(
            "{}\u{1f}{}",
            self.statement_type.to_lowercase(),
            self.metric_name.to_lowercase()
        )
    }
}

/// Display label and machine-readable key for one column of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub display_name: String,
    pub composite_key: String,
}

impl ReportPeriod {
    pub fn for_family(family: ReportFamily, period: PeriodKey) -> Self {
        let display_name = match family {
            ReportFamily::Annual => period.year.to_string(),
            ReportFamily::Quarterly => format!("Q{}Report {}", period.quarter, period.year),
        };
        Self {
            display_name,
            composite_key: period.composite_key(),
        }
    }
}

/// One display row, aligned 1:1 with the statement's period window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRow {
    pub display_name: String,
    pub values: Vec<String>,
    /// True when this row consolidated more than one variant line item.
    pub is_merged: bool,
}

/// An ordered statement block ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFinancialData {
    pub statement_type: String,
    pub rows: Vec<MetricRow>,
    pub scaling_label: String,
}

/// The full output contract exposed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyStatements {
    pub company_name: String,
    pub company_symbol: String,
    pub family: ReportFamily,
    pub periods: Vec<ReportPeriod>,
    pub statements: Vec<StatementFinancialData>,
    /// Formatted live price, `"$X.XX"` or `"N/A"` when unavailable.
    pub stock_price: String,
}
