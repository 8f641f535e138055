use chrono::{DateTime, Local};

/// Format an ISO-8601 timestamp as a short local date/time (`DD.MM. HH:MM`).
/// Returns an empty string when the input is absent or unparseable.
pub fn short_datetime(iso: &str) -> String {
    match DateTime::parse_from_rfc3339(iso) {
        Ok(dt) => dt.with_timezone(&Local).format("%d.%m. %H:%M").to_string(),
        Err(_) => String::new(),
    }
}

pub fn short_datetime_opt(iso: Option<&str>) -> String {
    iso.map(short_datetime).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_garbage_input_yield_empty_string() {
        assert_eq!(short_datetime(""), "");
        assert_eq!(short_datetime("not a date"), "");
        assert_eq!(short_datetime("2024-13-40T99:99:99Z"), "");
        assert_eq!(short_datetime_opt(None), "");
    }

    #[test]
    fn valid_timestamp_formats_as_short_date() {
        let out = short_datetime("2024-03-05T14:30:00+00:00");
        // Exact digits depend on the local timezone; check the shape.
        assert!(!out.is_empty());
        assert!(out.contains('.'));
        assert!(out.contains(':'));
    }

    #[test]
    fn offset_timestamps_are_accepted() {
        assert!(!short_datetime("2024-03-05T14:30:00+02:00").is_empty());
    }
}
