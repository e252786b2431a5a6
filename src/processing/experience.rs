//! Required-experience parsing

use once_cell::sync::Lazy;
use regex::Regex;

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\.?\d*").expect("valid number regex"));

/// Extract the first decimal number from a free-text requirement such as
/// "3+ years". Absent or unparsable input yields 0.
pub fn parse_required_years(text: Option<&str>) -> f64 {
    text.and_then(|t| NUMBER.find(t))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(0.0)
}
