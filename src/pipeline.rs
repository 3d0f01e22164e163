//! End-to-end orchestration: window selection, duplicate-period
//! resolution, alignment, grouping, ordering, scaling, merging, and the
//! final output contract.

use crate::align::{align_tagged, align_untagged};
use crate::dedup::{apply_corrections, detect_year_corrections};
use crate::error::{NormalizeError, Result};
use crate::merge::merge_metric_rows;
use crate::scale::{scale_statement, scaling_label};
use crate::schema::{
    CompanyStatements, NormalizedKey, PeriodKey, RawRecord, ReportFamily, ReportPeriod,
    StatementFinancialData, MISSING,
};
use crate::statements::{group_by_statement, order_statements};
use crate::store::{CompanyDirectory, PriceSource, RecordStore};
use log::{debug, info, warn};

/// Which extraction path produced the raw fields being aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Statement-tagged fields, canonicalized per raw key.
    #[default]
    Tagged,
    /// Untagged (XBRL) fields keyed by raw name, grouped under "General".
    Untagged,
}

/// Window sizes for the two report families.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub annual_window: usize,
    pub quarterly_window: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            annual_window: 10,
            quarterly_window: 6,
        }
    }
}

impl NormalizerConfig {
    fn validate(&self) -> Result<()> {
        if self.annual_window == 0 {
            return Err(NormalizeError::InvalidWindowSize(self.annual_window));
        }
        if self.quarterly_window == 0 {
            return Err(NormalizeError::InvalidWindowSize(self.quarterly_window));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct StatementNormalizer {
    config: NormalizerConfig,
}

impl StatementNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Runs one normalization pass for a company and report family and
    /// returns the ordered statement blocks with their period labels.
    ///
    /// The duplicate-period correction is persisted through the store as a
    /// side effect; everything else is computed fresh per call.
    pub fn build_statements<S>(
        &self,
        store: &mut S,
        prices: Option<&dyn PriceSource>,
        name_or_symbol: &str,
        family: ReportFamily,
        mode: ExtractionMode,
    ) -> Result<CompanyStatements>
    where
        S: RecordStore + CompanyDirectory,
    {
        self.config.validate()?;

        let company = store
            .resolve_company(name_or_symbol)
            .ok_or_else(|| NormalizeError::CompanyNotFound(name_or_symbol.to_string()))?;
        info!(
            "Normalizing {} statements for {} ({})",
            family, company.name, company.symbol
        );

        let mut records = store.fetch_raw_records(company.company_id, family)?;
        debug!("Fetched {} raw records", records.len());

        let corrections = detect_year_corrections(&records);
        if !corrections.is_empty() {
            warn!(
                "Re-keying {} duplicate-period record(s) for {}",
                corrections.len(),
                company.name
            );
            for correction in &corrections {
                store.persist_year_correction(correction.record_id, correction.new_year)?;
            }
            apply_corrections(&mut records, &corrections);
        }

        let periods = self.select_window(&records, family);
        if periods.is_empty() {
            return Err(NormalizeError::NoData {
                company: company.name,
                family,
            });
        }

        let table = match mode {
            ExtractionMode::Tagged => align_tagged(&records, &periods),
            ExtractionMode::Untagged => align_untagged(&records, &periods),
        };
        let statements = build_statement_blocks(table.into_rows(), periods.len());
        debug!("Produced {} statement block(s)", statements.len());

        let stock_price = prices
            .and_then(|source| source.fetch_price(&company.symbol))
            .map(|price| format!("${:.2}", price))
            .unwrap_or_else(|| MISSING.to_string());

        Ok(CompanyStatements {
            company_name: company.name,
            company_symbol: company.symbol,
            family,
            periods: periods
                .iter()
                .map(|period| ReportPeriod::for_family(family, *period))
                .collect(),
            statements,
            stock_price,
        })
    }

    /// Chooses the alignment window: the most recent distinct parsed
    /// periods of the family, in chronological order.
    fn select_window(&self, records: &[RawRecord], family: ReportFamily) -> Vec<PeriodKey> {
        let (keep, limit) = match family {
            ReportFamily::Annual => (0u8..=0, self.config.annual_window),
            ReportFamily::Quarterly => (1..=u8::MAX, self.config.quarterly_window),
        };

        let mut periods: Vec<PeriodKey> = records
            .iter()
            .filter(|record| record.is_parsed && keep.contains(&record.period.quarter))
            .map(|record| record.period)
            .collect();
        periods.sort_unstable();
        periods.dedup();

        let skip = periods.len().saturating_sub(limit);
        periods.split_off(skip)
    }
}

/// Per-statement finishing: scale, then collapse variant rows.
fn build_statement_blocks(
    rows: Vec<(NormalizedKey, Vec<String>)>,
    period_count: usize,
) -> Vec<StatementFinancialData> {
    let groups = order_statements(group_by_statement(rows));
    groups
        .into_iter()
        .map(|group| {
            let (scaled, factor) = scale_statement(group.metrics);
            StatementFinancialData {
                statement_type: group.statement_type,
                rows: merge_metric_rows(&scaled, period_count),
                scaling_label: scaling_label(factor).to_string(),
            }
        })
        .collect()
}
