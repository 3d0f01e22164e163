//! Duplicate-period detection.
//!
//! A company occasionally carries two raw records claiming the same
//! (year, quarter) slot, usually a mis-dated duplicate filing. The record
//! with the latest end date is the real one; every other record in the
//! group is pushed back into the previous year's slot. Detection is pure;
//! persisting the rewrite is the caller's job (the pipeline routes it
//! through the record store). Once no collisions remain, detection returns
//! nothing, so the correction is a one-time idempotent step — never a
//! reversible one.

use crate::schema::{PeriodKey, RawRecord};
use std::collections::BTreeMap;

/// A pending year rewrite for one stale duplicate record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearCorrection {
    pub record_id: u64,
    pub from: PeriodKey,
    pub new_year: i32,
}

/// Groups records by period and emits one correction per stale duplicate.
/// On an end-date tie the earliest record in input order keeps the slot.
pub fn detect_year_corrections(records: &[RawRecord]) -> Vec<YearCorrection> {
    let mut groups: BTreeMap<PeriodKey, Vec<&RawRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.period).or_default().push(record);
    }

    let mut corrections = Vec::new();
    for (period, members) in groups {
        if members.len() < 2 {
            continue;
        }
        let Some(latest) = members.iter().map(|r| r.end_date).max() else {
            continue;
        };
        let mut primary_taken = false;
        for record in members {
            if !primary_taken && record.end_date == latest {
                primary_taken = true;
                continue;
            }
            corrections.push(YearCorrection {
                record_id: record.record_id,
                from: period,
                new_year: period.year - 1,
            });
        }
    }
    corrections
}

/// Applies corrections to an in-memory record set, mirroring what the store
/// persisted so the rest of the run sees the corrected periods.
pub fn apply_corrections(records: &mut [RawRecord], corrections: &[YearCorrection]) {
    for correction in corrections {
        if let Some(record) = records
            .iter_mut()
            .find(|r| r.record_id == correction.record_id)
        {
            record.period.year = correction.new_year;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: u64, period: PeriodKey, end_date: (i32, u32, u32)) -> RawRecord {
        RawRecord::new(
            id,
            period,
            NaiveDate::from_ymd_opt(end_date.0, end_date.1, end_date.2).unwrap(),
            true,
            "{}".to_string(),
        )
    }

    #[test]
    fn test_stale_duplicate_is_rekeyed() {
        let records = vec![
            record(1, PeriodKey::annual(2021), (2021, 12, 31)),
            record(2, PeriodKey::annual(2021), (2021, 6, 30)),
        ];

        let corrections = detect_year_corrections(&records);
        assert_eq!(
            corrections,
            vec![YearCorrection {
                record_id: 2,
                from: PeriodKey::annual(2021),
                new_year: 2020,
            }]
        );
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut records = vec![
            record(1, PeriodKey::annual(2021), (2021, 12, 31)),
            record(2, PeriodKey::annual(2021), (2021, 6, 30)),
        ];
        let corrections = detect_year_corrections(&records);
        apply_corrections(&mut records, &corrections);

        assert_eq!(records[0].period, PeriodKey::annual(2021));
        assert_eq!(records[1].period, PeriodKey::annual(2020));
        assert!(detect_year_corrections(&records).is_empty());
    }

    #[test]
    fn test_collision_free_set_is_untouched() {
        let records = vec![
            record(1, PeriodKey::annual(2021), (2021, 12, 31)),
            record(2, PeriodKey::annual(2022), (2022, 12, 31)),
            record(3, PeriodKey::quarterly(2022, 1), (2022, 3, 31)),
        ];
        assert!(detect_year_corrections(&records).is_empty());
    }

    #[test]
    fn test_triplicate_group() {
        let records = vec![
            record(1, PeriodKey::annual(2021), (2021, 3, 31)),
            record(2, PeriodKey::annual(2021), (2021, 12, 31)),
            record(3, PeriodKey::annual(2021), (2021, 6, 30)),
        ];

        let corrections = detect_year_corrections(&records);
        let rekeyed: Vec<u64> = corrections.iter().map(|c| c.record_id).collect();
        assert_eq!(rekeyed, vec![1, 3]);
        assert!(corrections.iter().all(|c| c.new_year == 2020));
    }

    #[test]
    fn test_end_date_tie_keeps_first_in_input_order() {
        let records = vec![
            record(9, PeriodKey::annual(2021), (2021, 12, 31)),
            record(4, PeriodKey::annual(2021), (2021, 12, 31)),
        ];
        let corrections = detect_year_corrections(&records);
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].record_id, 4);
    }
}
