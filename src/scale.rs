//! Per-statement magnitude scaling.

/// Metric names never scaled regardless of magnitude: share counts and
/// per-share figures live on a different scale than the statement body.
const STATIC_EXEMPT: [&str; 6] = [
    "DividendsDeclared",
    "CommonStockIssued",
    "DilutedInShares",
    "BasicInShares",
    "SharesUsedInComputingEarningsPerShareDiluted",
    "SharesUsedInComputingEarningsPerShareBasic",
];

const EXEMPT_KEYWORDS: [&str; 5] = [
    "per share",
    "earnings per share",
    "eps",
    "shares outstanding",
    "diluted",
];

/// Whether a metric is exempt from scaling, either by the static list or by
/// case-insensitive keyword match.
pub fn is_exempt_metric(metric_name: &str) -> bool {
    if STATIC_EXEMPT
        .iter()
        .any(|exempt| exempt.eq_ignore_ascii_case(metric_name))
    {
        return true;
    }
    let fold = metric_name.to_lowercase();
    EXEMPT_KEYWORDS.iter().any(|keyword| fold.contains(keyword))
}

/// Power-of-ten divisor exponent derived from the maximum absolute value.
pub fn scaling_factor(values: impl IntoIterator<Item = f64>) -> u32 {
    let mut max_abs: Option<f64> = None;
    for value in values {
        let abs = value.abs();
        max_abs = Some(max_abs.map_or(abs, |m| m.max(abs)));
    }
    match max_abs {
        Some(max) if max >= 1e9 => 9,
        Some(max) if max >= 1e6 => 6,
        Some(max) if max >= 1e3 => 3,
        _ => 0,
    }
}

pub fn scaling_label(factor: u32) -> &'static str {
    match factor {
        9 => "in Billions $",
        6 => "in Millions $",
        3 => "in Thousands $",
        _ => "",
    }
}

/// Scales one statement's metrics in place and returns the chosen factor.
///
/// The factor comes from non-exempt numeric values only. Every non-exempt
/// numeric value is divided by `10^factor` and formatted to two decimals;
/// exempt and non-numeric values pass through bit-identical.
pub fn scale_statement(metrics: Vec<(String, Vec<String>)>) -> (Vec<(String, Vec<String>)>, u32) {
    let factor = scaling_factor(
        metrics
            .iter()
            .filter(|(name, _)| !is_exempt_metric(name))
            .flat_map(|(_, values)| values.iter())
            .filter_map(|value| parse_numeric(value)),
    );

    let divisor = 10f64.powi(factor as i32);
    let scaled = metrics
        .into_iter()
        .map(|(name, values)| {
            if is_exempt_metric(&name) {
                return (name, values);
            }
            let values = values
                .into_iter()
                .map(|value| match parse_numeric(&value) {
                    Some(n) => format!("{:.2}", n / divisor),
                    None => value,
                })
                .collect();
            (name, values)
        })
        .collect();
    (scaled, factor)
}

pub(crate) fn parse_numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
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
    fn test_scaling_thresholds() {
        assert_eq!(scaling_factor([999.0]), 0);
        assert_eq!(scaling_factor([1_000.0]), 3);
        assert_eq!(scaling_factor([1_000_000.0]), 6);
        assert_eq!(scaling_factor([1_000_000_000.0]), 9);
        assert_eq!(scaling_factor([]), 0);
    }

    #[test]
    fn test_scaling_uses_absolute_value() {
        assert_eq!(scaling_factor([-2_000_000.0, 100.0]), 6);
    }

    #[test]
    fn test_scaling_labels() {
        assert_eq!(scaling_label(9), "in Billions $");
        assert_eq!(scaling_label(6), "in Millions $");
        assert_eq!(scaling_label(3), "in Thousands $");
        assert_eq!(scaling_label(0), "");
    }

    #[test]
    fn test_exempt_detection() {
        assert!(is_exempt_metric("DilutedInShares"));
        assert!(is_exempt_metric("Basic Earnings Per Share"));
        assert!(is_exempt_metric("EPS Growth"));
        assert!(!is_exempt_metric("TotalRevenue"));
    }

    #[test]
    fn test_exempt_values_pass_through_unchanged() {
        let metrics = vec![
            metric("Revenue", &["1500000000"]),
            metric("DilutedInShares", &["1234567"]),
        ];
        let (scaled, factor) = scale_statement(metrics);
        assert_eq!(factor, 9);
        assert_eq!(scaled[0].1, vec!["1.50"]);
        assert_eq!(scaled[1].1, vec!["1234567"]);
    }

    #[test]
    fn test_non_numeric_values_pass_through() {
        let metrics = vec![metric("Revenue", &["N/A", "2000000", "see note 4"])];
        let (scaled, factor) = scale_statement(metrics);
        assert_eq!(factor, 6);
        assert_eq!(scaled[0].1, vec!["N/A", "2.00", "see note 4"]);
    }

    #[test]
    fn test_factor_zero_still_formats_numerics() {
        let metrics = vec![metric("Fees", &["999"])];
        let (scaled, factor) = scale_statement(metrics);
        assert_eq!(factor, 0);
        assert_eq!(scaled[0].1, vec!["999.00"]);
    }

    #[test]
    fn test_statement_with_only_exempt_numerics_gets_no_label() {
        let metrics = vec![metric("BasicInShares", &["5000000000"])];
        let (scaled, factor) = scale_statement(metrics);
        assert_eq!(factor, 0);
        assert_eq!(scaling_label(factor), "");
        assert_eq!(scaled[0].1, vec!["5000000000"]);
    }
}
