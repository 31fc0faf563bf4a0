//! Human-readable column labels derived from field paths.

use regex::Regex;
use std::sync::LazyLock;

/// Known abbreviations and their canonical spelling, applied in this order.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("gdp", "GDP"),
    ("gini", "Gini"),
    ("hiv", "HIV"),
    ("aids", "AIDS"),
    ("co2", "CO2"),
    ("pm25", "PM2.5"),
    ("us", "US"),
    ("uk", "UK"),
    ("eu", "EU"),
    ("un", "UN"),
    ("nato", "NATO"),
    ("wto", "WTO"),
    ("imf", "IMF"),
    ("worldbank", "World Bank"),
];

const TEXT_SUFFIX: &str = ".text";

static LOWER_TO_UPPER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("invalid regex"));
static ACRONYM_TO_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("invalid regex"));

/// Derive a display label from a dotted path.
///
/// `Economy.Real GDP (purchasing power parity).text` becomes `Real GDP (Purchasing Power Parity)`.
#[must_use]
pub fn name_for(path: &str) -> String {
    let trimmed = path.strip_suffix(TEXT_SUFFIX).unwrap_or(path);
    let raw = trimmed.rsplit('.').next().unwrap_or(trimmed);

    let expanded = expand_abbreviations(raw);
    let split = ACRONYM_TO_WORD.replace_all(&LOWER_TO_UPPER.replace_all(&expanded, "${1} ${2}"), "${1} ${2}").into_owned();

    split.split_whitespace().map(title_case_word).collect::<Vec<_>>().join(" ")
}

/// Rewrite the first case-insensitive occurrence of each known abbreviation.
///
/// An occurrence glued to neighboring letters or digits is set apart with spaces, so `realgdp`
/// becomes `real GDP` and the canonical spelling survives word splitting.
fn expand_abbreviations(raw: &str) -> String {
    let mut name = raw.to_string();

    for &(abbreviation, canonical) in ABBREVIATIONS {
        // ASCII lowercasing keeps byte offsets aligned with `name`
        let Some(start) = name.to_ascii_lowercase().find(abbreviation) else {
            continue;
        };
        let end = start + abbreviation.len();

        let bytes = name.as_bytes();
        let glued_before = start > 0 && bytes.get(start - 1).is_some_and(u8::is_ascii_alphanumeric);
        let glued_after = bytes.get(end).is_some_and(u8::is_ascii_alphanumeric);

        let mut replacement = String::with_capacity(canonical.len() + 2);
        if glued_before {
            replacement.push(' ');
        }
        replacement.push_str(canonical);
        if glued_after {
            replacement.push(' ');
        }

        name.replace_range(start..end, &replacement);
    }

    name
}

/// Capitalize a word, leaving acronyms such as `GDP` or `PM2.5` untouched.
fn title_case_word(word: &str) -> String {
    let has_lower = word.chars().any(char::is_lowercase);
    let alphabetic = word.chars().filter(|c| c.is_alphabetic()).count();
    if !has_lower && alphabetic >= 2 {
        return word.to_string();
    }

    let mut out = String::with_capacity(word.len());
    let mut seen_letter = false;
    for ch in word.chars() {
        if ch.is_alphabetic() {
            if seen_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
                seen_letter = true;
            }
        } else {
            out.push(ch);
        }
    }

    out
}
