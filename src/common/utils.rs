use chrono::{Local, NaiveDate};

/// Current calendar date in the operator's local timezone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Round a percentage or average to one decimal place for reporting.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Trim free text, collapsing blank input to `None`.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
