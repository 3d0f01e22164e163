//! Boundary contracts for the external collaborators the pipeline consumes:
//! the raw data source, the persistence sink for year corrections, company
//! lookup, and the optional live price source. No wire format is mandated
//! here; implementations wrap whatever storage or network client the
//! surrounding system uses, along with its timeout/retry policy.

use crate::error::Result;
use crate::schema::{RawRecord, ReportFamily};
use std::collections::HashMap;

/// Resolved company identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyRef {
    pub company_id: u64,
    pub name: String,
    pub symbol: String,
}

pub trait CompanyDirectory {
    /// Looks a company up by display name or ticker symbol.
    fn resolve_company(&self, name_or_symbol: &str) -> Option<CompanyRef>;
}

pub trait RecordStore {
    /// Returns the company's raw records for one report family: annual
    /// records carry quarter 0, quarterly records carry quarter >= 1.
    fn fetch_raw_records(&self, company_id: u64, family: ReportFamily) -> Result<Vec<RawRecord>>;

    /// Persists a duplicate-period year rewrite. Callers serving concurrent
    /// requests must serialize these writes per company.
    fn persist_year_correction(&mut self, record_id: u64, new_year: i32) -> Result<()>;
}

pub trait PriceSource {
    fn fetch_price(&self, symbol: &str) -> Option<f64>;
}

/// In-memory implementation of the boundary contracts, used by the
/// integration tests and handy as a fixture for embedding callers.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    companies: Vec<CompanyRef>,
    records: Vec<(u64, RawRecord)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_company(&mut self, company_id: u64, name: &str, symbol: &str) {
        self.companies.push(CompanyRef {
            company_id,
            name: name.to_string(),
            symbol: symbol.to_string(),
        });
    }

    pub fn add_record(&mut self, company_id: u64, record: RawRecord) {
        self.records.push((company_id, record));
    }

    pub fn record(&self, record_id: u64) -> Option<&RawRecord> {
        self.records
            .iter()
            .map(|(_, record)| record)
            .find(|record| record.record_id == record_id)
    }
}

impl CompanyDirectory for InMemoryStore {
    fn resolve_company(&self, name_or_symbol: &str) -> Option<CompanyRef> {
        self.companies
            .iter()
            .find(|c| {
                c.name.eq_ignore_ascii_case(name_or_symbol)
                    || c.symbol.eq_ignore_ascii_case(name_or_symbol)
            })
            .cloned()
    }
}

impl RecordStore for InMemoryStore {
    fn fetch_raw_records(&self, company_id: u64, family: ReportFamily) -> Result<Vec<RawRecord>> {
        let records = self
            .records
            .iter()
            .filter(|(owner, record)| {
                *owner == company_id
                    && match family {
                        ReportFamily::Annual => record.period.quarter == 0,
                        ReportFamily::Quarterly => record.period.quarter >= 1,
                    }
            })
            .map(|(_, record)| record.clone())
            .collect();
        Ok(records)
    }

    fn persist_year_correction(&mut self, record_id: u64, new_year: i32) -> Result<()> {
        for (_, record) in &mut self.records {
            if record.record_id == record_id {
                record.period.year = new_year;
                return Ok(());
            }
        }
        Err(crate::error::NormalizeError::Storage(format!(
            "No record with id {} to correct",
            record_id
        )))
    }
}

/// Fixed symbol-to-price table implementing [`PriceSource`].
#[derive(Debug, Default)]
pub struct StaticPrices {
    prices: HashMap<String, f64>,
}

impl StaticPrices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, symbol: &str, price: f64) {
        self.prices.insert(symbol.to_uppercase(), price);
    }
}

impl PriceSource for StaticPrices {
    fn fetch_price(&self, symbol: &str) -> Option<f64> {
        self.prices.get(&symbol.to_uppercase()).copied()
    }
}
