//! Raw-key canonicalization.
//!
//! Report vintages disagree wildly on how they label the same line item.
//! This module turns one raw field name into a `(statement type, metric
//! name)` pair deterministically; malformed input never fails, it collapses
//! into the `"General"` bucket instead.

use crate::schema::{NormalizedKey, GENERAL_STATEMENT};
use once_cell::sync::Lazy;
use regex::Regex;

/// Marker carried by statement-tagged raw fields. Fields without it belong
/// to the untagged (XBRL) extraction path.
pub const TAGGED_PREFIX: &str = "HTML_";

/// The expected three-part shape: report-family prefix, statement-type
/// segment, metric-name segment.
static TAGGED_KEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:HTML_)?(?:AnnualReport|Q\dReport)_(?P<statement>.*?)_(?P<metric>.+)$")
        .expect("tagged key pattern is valid")
});

static PARENTHETICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\(.*?\)\s*").expect("parenthetical pattern is valid"));

/// Qualifiers that carry no identity.
const STOP_WORDS: [&str; 4] = ["consolidated", "condensed", "unaudited", "the"];

/// Canonical statement names, matched exactly first and then by containment
/// (concatenated vintages like `ConsolidatedBalanceSheets` have no word
/// boundaries for the stop-word pass to work with).
const STATEMENT_TYPE_MAP: [(&str, &str); 4] = [
    ("operations", "Statement of Operations"),
    ("cashflows", "Cashflow Statement"),
    ("balancesheets", "Balance Sheet"),
    ("comprehensiveincome", "Income Statement"),
];

/// Whether a raw field name carries the statement-tag prefix.
pub fn is_tagged_key(key: &str) -> bool {
    key.get(..TAGGED_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(TAGGED_PREFIX))
}

/// Parses one raw field name into a `NormalizedKey`.
///
/// Field names matching the three-part pattern have their statement-type
/// capture canonicalized; legacy names fall back to a positional split on
/// `'_'`; anything else lands in `"General"` with the whole name as metric.
pub fn canonicalize_key(raw_key: &str) -> NormalizedKey {
    if let Some(caps) = TAGGED_KEY_RE.captures(raw_key) {
        let statement = caps.name("statement").map(|m| m.as_str()).unwrap_or("");
        let metric = caps.name("metric").map(|m| m.as_str()).unwrap_or("");
        return NormalizedKey::new(normalize_statement_type(statement.trim()), metric.trim());
    }
    fallback_normalize(raw_key)
}

fn fallback_normalize(raw_key: &str) -> NormalizedKey {
    let parts: Vec<&str> = raw_key.split('_').collect();
    if parts.len() >= 4 {
        let statement = normalize_statement_type(parts[2].trim());
        let metric = parts[3..].join("_");
        NormalizedKey::new(statement, metric.trim())
    } else {
        NormalizedKey::new(GENERAL_STATEMENT, raw_key.trim())
    }
}

/// Canonicalizes a statement-type string: lower-case, strip parenthetical
/// qualifiers, drop stop words, collapse whitespace, title-case, then map
/// through the fixed lookup table. Unmapped types become `"General"`.
pub fn normalize_statement_type(statement_type: &str) -> String {
    if statement_type.is_empty() {
        return GENERAL_STATEMENT.to_string();
    }

    let lowered = statement_type.to_lowercase();
    let stripped = PARENTHETICAL_RE.replace_all(&lowered, " ");
    let collapsed: Vec<&str> = stripped
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .collect();
    let titled = title_case(&collapsed.join(" "));

    let fold = titled.to_lowercase();
    for (needle, canonical) in STATEMENT_TYPE_MAP {
        if fold == needle || fold.contains(needle) {
            return canonical.to_string();
        }
    }
    GENERAL_STATEMENT.to_string()
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
