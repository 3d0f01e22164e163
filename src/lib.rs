//! # Statement Normalizer
//!
//! A library for turning sparse, schema-drifting per-period financial
//! report data (one flat key/value blob per company per reporting period)
//! into a small number of ordered, human-readable statement tables aligned
//! across periods.
//!
//! ## Core Concepts
//!
//! - **Raw record**: one report's flat key/value blob plus its period key,
//!   end date, and parse flag, as produced by the acquisition subsystem
//! - **Canonicalization**: deterministic mapping from a raw field name to a
//!   (statement type, metric name) pair; different vintages of the same
//!   line item compress onto one key
//! - **Alignment**: every key observed in any period gets an equal-length,
//!   chronologically ordered value sequence ("N/A" where absent)
//! - **Merging**: variant line items sharing a base name collapse into one
//!   display row, first valid value per period winning
//! - **Scaling**: each statement picks a power-of-ten divisor from its own
//!   magnitudes, share-count and per-share rows exempted
//! - **Duplicate periods**: two records claiming the same (year, quarter)
//!   slot are resolved by end date; the stale one shifts back a year
//!
//! ## Example
//!
//! ```rust,ignore
//! use statement_normalizer::*;
//! use chrono::NaiveDate;
//!
//! let mut store = InMemoryStore::new();
//! store.add_company(1, "Acme Corp", "ACME");
//! store.add_record(
//!     1,
//!     RawRecord::from_fields(
//!         1,
//!         PeriodKey::annual(2023),
//!         NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
//!         &[(
//!             "HTML_AnnualReport_ConsolidatedBalanceSheets_TotalAssets",
//!             RawValue::Number(1_500_000_000.0),
//!         )],
//!     ),
//! );
//!
//! let view = normalize_company(&mut store, "ACME", ReportFamily::Annual).unwrap();
//! assert_eq!(view.statements[0].statement_type, "Balance Sheet");
//! ```

pub mod align;
pub mod canonical;
pub mod dedup;
pub mod error;
pub mod merge;
pub mod pipeline;
pub mod scale;
pub mod schema;
pub mod statements;
pub mod store;

pub use align::{align_tagged, align_untagged, AlignedTable};
pub use canonical::{canonicalize_key, is_tagged_key, normalize_statement_type, TAGGED_PREFIX};
pub use dedup::{apply_corrections, detect_year_corrections, YearCorrection};
pub use error::{NormalizeError, Result};
pub use merge::{base_name, find_merge_conflicts, merge_metric_rows, MergeConflict};
pub use pipeline::{ExtractionMode, NormalizerConfig, StatementNormalizer};
pub use scale::{is_exempt_metric, scale_statement, scaling_factor, scaling_label};
pub use schema::*;
pub use statements::{group_by_statement, order_statements, StatementGroup};
pub use store::*;

/// Convenience wrapper: one tagged-mode normalization pass with default
/// window sizes and no price annotation.
pub fn normalize_company<S>(
    store: &mut S,
    name_or_symbol: &str,
    family: ReportFamily,
) -> Result<CompanyStatements>
where
    S: RecordStore + CompanyDirectory,
{
    StatementNormalizer::new().build_statements(
        store,
        None,
        name_or_symbol,
        family,
        ExtractionMode::Tagged,
    )
}
