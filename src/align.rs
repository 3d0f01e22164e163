//! Sparse multi-period alignment.
//!
//! Raw records are sparse and schema-drifting: a metric present in one
//! period is routinely absent from the next. Alignment produces a dense
//! table where every key observed in at least one period holds exactly one
//! value per period in the requested window.

use crate::canonical::{canonicalize_key, is_tagged_key};
use crate::schema::{NormalizedKey, PeriodKey, RawRecord, RawValue, MISSING};
use log::debug;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Dense key/value table. Invariant: every row's value sequence length
/// equals the number of periods in the window.
#[derive(Debug, Clone)]
pub struct AlignedTable {
    periods: Vec<PeriodKey>,
    rows: Vec<(NormalizedKey, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl AlignedTable {
    fn new(periods: Vec<PeriodKey>) -> Self {
        Self {
            periods,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn periods(&self) -> &[PeriodKey] {
        &self.periods
    }

    pub fn rows(&self) -> &[(NormalizedKey, Vec<String>)] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<(NormalizedKey, Vec<String>)> {
        self.rows
    }

    pub fn get(&self, key: &NormalizedKey) -> Option<&[String]> {
        self.index
            .get(&key.fold())
            .map(|&slot| self.rows[slot].1.as_slice())
    }

    /// Registers a key first observed at period index `seen_at`, back-filling
    /// the missing-marker for every period already processed.
    fn register(&mut self, key: NormalizedKey, seen_at: usize) {
        let fold = key.fold();
        if self.index.contains_key(&fold) {
            return;
        }
        self.rows.push((key, vec![MISSING.to_string(); seen_at]));
        self.index.insert(fold, self.rows.len() - 1);
    }

    /// Appends one period column: the registered value where present, the
    /// missing-marker everywhere else.
    fn push_column(&mut self, column: &HashMap<String, String>) {
        for (key, values) in &mut self.rows {
            let value = column
                .get(&key.fold())
                .cloned()
                .unwrap_or_else(|| MISSING.to_string());
            values.push(value);
        }
    }

    fn push_missing_column(&mut self) {
        for (_, values) in &mut self.rows {
            values.push(MISSING.to_string());
        }
    }
}

/// Basic mode: statement-tagged fields only, canonicalized per raw key.
///
/// A registration pass gives every key observed anywhere in the window a
/// row; the fill pass then walks the periods in chronological order. A
/// period with no parsed record (or a malformed blob) contributes a full
/// column of missing-markers. Two raw fields canonicalizing to the same key
/// within one period resolve last-write-wins.
pub fn align_tagged(records: &[RawRecord], periods: &[PeriodKey]) -> AlignedTable {
    let mut table = AlignedTable::new(periods.to_vec());
    let lookup = decoded_lookup(records, periods);

    for period in periods {
        let Some(fields) = lookup.get(period) else {
            continue;
        };
        for raw_key in fields.keys() {
            if is_tagged_key(raw_key) {
                table.register(canonicalize_key(raw_key), 0);
            }
        }
    }
    debug!(
        "Registered {} normalized keys across {} periods",
        table.rows.len(),
        periods.len()
    );

    for period in periods {
        match lookup.get(period) {
            None => table.push_missing_column(),
            Some(fields) => {
                let mut column = HashMap::new();
                for (raw_key, value) in fields {
                    if !is_tagged_key(raw_key) {
                        continue;
                    }
                    let key = canonicalize_key(raw_key);
                    let rendered = value.render().unwrap_or_else(|| MISSING.to_string());
                    column.insert(key.fold(), rendered);
                }
                table.push_column(&column);
            }
        }
    }
    table
}

/// Enhanced mode: untagged (XBRL) fields keyed by raw field name, no
/// canonicalization. Keys appear as schemas grow over time, so a newly
/// observed key is back-filled with the missing-marker for every period
/// before its first appearance.
pub fn align_untagged(records: &[RawRecord], periods: &[PeriodKey]) -> AlignedTable {
    let mut table = AlignedTable::new(periods.to_vec());
    let lookup = decoded_lookup(records, periods);

    for (idx, period) in periods.iter().enumerate() {
        match lookup.get(period) {
            None => table.push_missing_column(),
            Some(fields) => {
                let mut column = HashMap::new();
                for (raw_key, value) in fields {
                    if is_tagged_key(raw_key) {
                        continue;
                    }
                    let key = NormalizedKey::untagged(raw_key.as_str());
                    table.register(key.clone(), idx);
                    let rendered = value.render().unwrap_or_else(|| MISSING.to_string());
                    column.insert(key.fold(), rendered);
                }
                table.push_column(&column);
            }
        }
    }
    table
}

/// Decodes each parsed in-window record once. Unparsed records are treated
/// the same as absent ones.
fn decoded_lookup(
    records: &[RawRecord],
    periods: &[PeriodKey],
) -> HashMap<PeriodKey, BTreeMap<String, RawValue>> {
    let wanted: HashSet<PeriodKey> = periods.iter().copied().collect();
    let mut lookup = HashMap::new();
    for record in records {
        if !record.is_parsed || !wanted.contains(&record.period) {
            continue;
        }
        lookup.insert(record.period, record.decoded_fields());
    }
    lookup
}
