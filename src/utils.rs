// Utility functions
use crate::model::UNAVAILABLE;
use chrono::{DateTime, Utc};

/// Formats an amount as Vietnamese dong, e.g. `15.990.000 ₫`.
pub fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{} ₫", grouped)
}

/// Trimmed value, or the unavailable marker when blank.
pub fn display_or_unavailable(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNAVAILABLE.to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Converts a label to kebab-case, keeping only ASCII alphanumerics.
pub fn to_kebab_case(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Report file name for a labelled comparison, e.g. `gaming-pick-20250101T120000Z.json`.
pub fn report_file_name(label: &str, at: DateTime<Utc>) -> String {
    let stem = match to_kebab_case(label) {
        s if s.is_empty() => "comparison".to_string(),
        s => s,
    };
    format!("{}-{}.json", stem, at.format("%Y%m%dT%H%M%SZ"))
}
