/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring match for search filtering
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a date string to a more readable format
pub fn format_date(date: &str) -> String {
    // Try to parse ISO format and convert to readable
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 {
        // Fall back to the date part of an unparsed timestamp
        date.chars().take(10).collect()
    } else {
        date.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-09-10"), "Sep 10, 2025");
        assert_eq!(format_date("2025-09-10T09:00:00+02:00"), "Sep 10, 2025");
        assert_eq!(format_date("someday"), "someday");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("RustConf Europe", "conf"));
        assert!(contains_ignore_case("RustConf", ""));
        assert!(!contains_ignore_case("RustConf", "python"));
    }

}
