use once_cell::sync::Lazy;
use regex::Regex;

// A 5+ character run (segments may be hyphen-joined) followed by digits and an
// optional word tail: `field12345x`, `btn-8821xk`, `ember1024`.
static AUTO_GENERATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[\w-]{5,}\d+\w*\b").expect("auto-generated pattern is valid"));

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-/\[\],.&]+").expect("separator pattern is valid"));

static UNDERSCORE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__+").expect("underscore pattern is valid"));

/// Heuristic: does this attribute value look machine-generated?
///
/// Framework ids and hashed class names tend to carry a long prefix with a
/// numeric suffix. False positives (`section-12`) and negatives are accepted.
pub fn is_auto_generated(value: &str) -> bool {
    AUTO_GENERATED.is_match(value)
}

/// Turn a raw attribute value or button text into an identifier-ish name.
///
/// Separators (whitespace, `-`, `/`, brackets, `,`, `.`, `&`) become `_`,
/// underscore runs collapse, and edge underscores are trimmed. The result is
/// not guaranteed to be a legal identifier in every target language.
pub fn variable_name(value: &str) -> String {
    let replaced = SEPARATORS.replace_all(value, "_");
    let collapsed = UNDERSCORE_RUNS.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_string()
}
