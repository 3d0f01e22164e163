//! Statement grouping and ordering.

use crate::schema::NormalizedKey;
use std::collections::HashMap;

/// One statement's metric rows, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementGroup {
    pub statement_type: String,
    pub metrics: Vec<(String, Vec<String>)>,
}

/// The human-expected presentation order. The first entry is a placeholder:
/// whichever actual statement fuzzy-matches "operations" replaces it.
const DESIRED_ORDER: [&str; 4] = [
    "Statement of Operations",
    "Income Statement",
    "Cashflow",
    "Balance Sheet",
];

/// Partitions aligned rows by statement type. Pure partition: values pass
/// through untouched and both group and metric order follow first
/// appearance.
pub fn group_by_statement(rows: Vec<(NormalizedKey, Vec<String>)>) -> Vec<StatementGroup> {
    let mut groups: Vec<StatementGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for (key, values) in rows {
        let fold = key.statement_type.to_lowercase();
        let slot = match index.get(&fold) {
            Some(&slot) => slot,
            None => {
                groups.push(StatementGroup {
                    statement_type: key.statement_type.clone(),
                    metrics: Vec::new(),
                });
                index.insert(fold, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].metrics.push((key.metric_name, values));
    }
    groups
}

/// Arranges statement groups into the deterministic display order: desired
/// entries first (skipping any with no match), then every remaining
/// statement in its original order.
pub fn order_statements(groups: Vec<StatementGroup>) -> Vec<StatementGroup> {
    let mut desired: Vec<String> = DESIRED_ORDER.iter().map(|s| (*s).to_string()).collect();
    if let Some(operations) = groups.iter().find(|group| {
        let fold = group.statement_type.to_lowercase();
        fold == "operations" || fold.contains("operations")
    }) {
        desired[0] = operations.statement_type.clone();
    }

    let mut slots: Vec<Option<StatementGroup>> = groups.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for want in &desired {
        let found = slots.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|group| fuzzy_match(&group.statement_type, want))
        });
        if let Some(pos) = found {
            if let Some(group) = slots[pos].take() {
                ordered.push(group);
            }
        }
    }
    for slot in slots {
        if let Some(group) = slot {
            ordered.push(group);
        }
    }
    ordered
}

fn fuzzy_match(actual: &str, desired: &str) -> bool {
    actual.eq_ignore_ascii_case(desired)
        || actual.to_lowercase().contains(&desired.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(statement_type: &str) -> StatementGroup {
        StatementGroup {
            statement_type: statement_type.to_string(),
            metrics: vec![("Metric".to_string(), vec!["1".to_string()])],
        }
    }

    fn names(groups: &[StatementGroup]) -> Vec<&str> {
        groups.iter().map(|g| g.statement_type.as_str()).collect()
    }

    #[test]
    fn test_grouping_partitions_by_statement() {
        let rows = vec![
            (
                NormalizedKey::new("Balance Sheet", "TotalAssets"),
                vec!["1".to_string()],
            ),
            (
                NormalizedKey::new("Statement of Operations", "Revenue"),
                vec!["2".to_string()],
            ),
            (
                NormalizedKey::new("Balance Sheet", "TotalLiabilities"),
                vec!["3".to_string()],
            ),
        ];

        let groups = group_by_statement(rows);
        assert_eq!(names(&groups), vec!["Balance Sheet", "Statement of Operations"]);
        assert_eq!(groups[0].metrics.len(), 2);
        assert_eq!(groups[0].metrics[0].0, "TotalAssets");
        assert_eq!(groups[0].metrics[1].0, "TotalLiabilities");
    }

    #[test]
    fn test_operations_promoted_to_front() {
        let groups = vec![
            group("Balance Sheet"),
            group("Income Statement"),
            group("Statement of Operations"),
        ];
        let ordered = order_statements(groups);
        assert_eq!(
            names(&ordered),
            vec!["Statement of Operations", "Income Statement", "Balance Sheet"]
        );
    }

    #[test]
    fn test_unmatched_desired_entries_are_skipped() {
        let groups = vec![group("General"), group("Balance Sheet")];
        let ordered = order_statements(groups);
        assert_eq!(names(&ordered), vec!["Balance Sheet", "General"]);
    }

    #[test]
    fn test_remaining_statements_keep_insertion_order() {
        let groups = vec![
            group("Notes"),
            group("General"),
            group("Cashflow Statement"),
        ];
        let ordered = order_statements(groups);
        assert_eq!(names(&ordered), vec!["Cashflow Statement", "Notes", "General"]);
    }

    #[test]
    fn test_ordering_is_deterministic() {
        let build = || {
            vec![
                group("General"),
                group("Cashflow Statement"),
                group("Balance Sheet"),
                group("Income Statement"),
            ]
        };
        assert_eq!(order_statements(build()), order_statements(build()));
    }
}
