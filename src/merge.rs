//! Duplicate-line-item consolidation.
//!
//! Different report vintages label the same line item with parenthetical
//! qualifiers (`"Revenue (Total)"` vs `"Revenue (Net)"`). Rows sharing a
//! base name collapse into one display row; for each period the first valid
//! value in group order wins. This is intentionally lossy: a later member's
//! valid value for the same period is silently discarded. Callers who want
//! to know run [`find_merge_conflicts`] first.

use crate::scale::parse_numeric;
use crate::schema::{MetricRow, MISSING};
use std::collections::HashMap;

/// The substring before the first `'('`, trimmed; or the full name when no
/// parenthetical exists (or the name starts with one).
pub fn base_name(metric_name: &str) -> &str {
    match metric_name.find('(') {
        Some(idx) if idx > 0 => metric_name[..idx].trim(),
        _ => metric_name,
    }
}

/// Collapses variant rows into display rows. The merged row takes the first
/// member's original (unstripped) name; `is_merged` records whether more
/// than one variant fed the row.
pub fn merge_metric_rows(
    metrics: &[(String, Vec<String>)],
    period_count: usize,
) -> Vec<MetricRow> {
    group_by_base_name(metrics)
        .into_iter()
        .map(|members| {
            let mut values = Vec::with_capacity(period_count);
            for idx in 0..period_count {
                let mut merged = MISSING.to_string();
                for (_, member_values) in &members {
                    if let Some(value) = member_values.get(idx) {
                        if is_valid(value) {
                            merged = value.clone();
                            break;
                        }
                    }
                }
                values.push(merged);
            }
            MetricRow {
                display_name: members[0].0.clone(),
                is_merged: members.len() > 1,
                values,
            }
        })
        .collect()
}

/// A period where more than one variant in a base-name group holds a
/// numeric value. Reported, never enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub base_name: String,
    pub period_index: usize,
    /// Original names of the contending variants, in group order.
    pub contenders: Vec<String>,
}

/// Opt-in strict validation pass: reports every (group, period) slot where
/// the first-valid-wins merge would discard a numeric value.
pub fn find_merge_conflicts(
    metrics: &[(String, Vec<String>)],
    period_count: usize,
) -> Vec<MergeConflict> {
    let mut conflicts = Vec::new();
    for members in group_by_base_name(metrics) {
        if members.len() < 2 {
            continue;
        }
        for idx in 0..period_count {
            let contenders: Vec<String> = members
                .iter()
                .filter(|(_, values)| {
                    values
                        .get(idx)
                        .is_some_and(|v| is_valid(v) && parse_numeric(v).is_some())
                })
                .map(|(name, _)| name.clone())
                .collect();
            if contenders.len() > 1 {
                conflicts.push(MergeConflict {
                    base_name: base_name(&members[0].0).to_string(),
                    period_index: idx,
                    contenders,
                });
            }
        }
    }
    conflicts
}

fn group_by_base_name(metrics: &[(String, Vec<String>)]) -> Vec<Vec<&(String, Vec<String>)>> {
    let mut groups: Vec<Vec<&(String, Vec<String>)>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for metric in metrics {
        let fold = base_name(&metric.0).to_lowercase();
        match index.get(&fold) {
            Some(&slot) => groups[slot].push(metric),
            None => {
                index.insert(fold, groups.len());
                groups.push(vec![metric]);
            }
        }
    }
    groups
}

fn is_valid(value: &str) -> bool {
    !value.is_empty() && value != MISSING
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str, values: &[&str]) -> (String, Vec<String>) {
        (
            name.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("Revenue (Total)"), "Revenue");
        assert_eq!(base_name("Revenue"), "Revenue");
        assert_eq!(base_name("(Loss) before tax"), "(Loss) before tax");
    }

    #[test]
    fn test_merge_first_valid_wins() {
        let metrics = vec![
            metric("Revenue (Total)", &["N/A", "200.00", "300.00"]),
            metric("Revenue (Net)", &["150.00", "250.00", "N/A"]),
        ];

        let rows = merge_metric_rows(&metrics, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display_name, "Revenue (Total)");
        assert!(rows[0].is_merged);
        // Index 1 holds valid values from both variants: the first group
        // member wins, the later value is dropped.
        assert_eq!(rows[0].values, vec!["150.00", "200.00", "300.00"]);
    }

    #[test]
    fn test_merge_grouping_is_case_insensitive() {
        let metrics = vec![
            metric("NetIncome (As Reported)", &["N/A"]),
            metric("netincome (Restated)", &["5.00"]),
        ];
        let rows = merge_metric_rows(&metrics, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].display_name, "NetIncome (As Reported)");
        assert_eq!(rows[0].values, vec!["5.00"]);
    }

    #[test]
    fn test_unmerged_row_passes_through() {
        let metrics = vec![metric("TotalAssets", &["1.00", "N/A"])];
        let rows = merge_metric_rows(&metrics, 2);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].is_merged);
        assert_eq!(rows[0].values, vec!["1.00", "N/A"]);
    }

    #[test]
    fn test_short_member_pads_with_missing() {
        let metrics = vec![metric("Revenue", &["1.00"])];
        let rows = merge_metric_rows(&metrics, 3);
        assert_eq!(rows[0].values, vec!["1.00", "N/A", "N/A"]);
    }

    #[test]
    fn test_conflict_detection() {
        let metrics = vec![
            metric("Revenue (Total)", &["100.00", "200.00"]),
            metric("Revenue (Net)", &["150.00", "N/A"]),
        ];

        let conflicts = find_merge_conflicts(&metrics, 2);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].base_name, "Revenue");
        assert_eq!(conflicts[0].period_index, 0);
        assert_eq!(
            conflicts[0].contenders,
            vec!["Revenue (Total)", "Revenue (Net)"]
        );
    }

    #[test]
    fn test_non_numeric_values_do_not_conflict() {
        let metrics = vec![
            metric("Auditor (Current)", &["Smith LLP"]),
            metric("Auditor (Prior)", &["Jones LLP"]),
        ];
        assert!(find_merge_conflicts(&metrics, 1).is_empty());
    }
}
