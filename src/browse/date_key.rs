//! Best-effort date extraction from titles for the newest-first ordering.
//!
//! Titles like `Đề 5.3.24` or `Reading 12-11` carry the exam date. The first
//! `D.M` or `D.M.Y` looking substring wins; any other number pattern that
//! happens to match is taken at face value.

use std::sync::LazyLock;

use regex::Regex;

static DATE_SNIPPET: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[./-]\d{1,2}(?:[./-]\d{2,4})?").ok());

/// First date-like substring of `title`, if any.
#[must_use]
pub fn extract_date_snippet(title: &str) -> Option<&str> {
    DATE_SNIPPET
        .as_ref()
        .and_then(|re| re.find(title))
        .map(|m| m.as_str())
}

/// Turn a snippet into a comparable `YYYYMMDD` integer.
///
/// Two-digit years land in the 2000s. A day-month snippet takes
/// `fallback_year`. Anything that does not split into two or three numeric
/// parts is `0`.
#[must_use]
pub fn snippet_key(snippet: &str, fallback_year: i32) -> i64 {
    let parts: Vec<&str> = snippet.split(['.', '-', '/']).collect();
    let numbers: Option<Vec<i64>> = parts.iter().map(|p| p.parse::<i64>().ok()).collect();
    let Some(numbers) = numbers else {
        return 0;
    };
    match (parts.as_slice(), numbers.as_slice()) {
        ([_, _, year_text], [day, month, year]) => {
            let year = if year_text.len() == 2 { 2000 + year } else { *year };
            year * 10_000 + month * 100 + day
        }
        (_, [day, month]) => i64::from(fallback_year) * 10_000 + month * 100 + day,
        _ => 0,
    }
}

/// Sort key of a title; `0` when it carries no date.
#[must_use]
pub fn date_sort_key(title: &str, fallback_year: i32) -> i64 {
    extract_date_snippet(title).map_or(0, |snippet| snippet_key(snippet, fallback_year))
}

/// Calendar year used for day-month titles.
#[must_use]
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_month_two_digit_year() {
        assert_eq!(date_sort_key("Đề 5.3.24", 1999), 20_240_305);
    }

    #[test]
    fn four_digit_year_and_dash_separator() {
        assert_eq!(date_sort_key("Listening 12-11-2023 full", 1999), 20_231_112);
    }

    #[test]
    fn slash_separator() {
        assert_eq!(date_sort_key("Writing 1/2/25", 1999), 20_250_201);
    }

    #[test]
    fn day_month_uses_fallback_year() {
        assert_eq!(date_sort_key("Reading 7.8", 2026), 20_260_807);
    }

    #[test]
    fn no_date_is_zero() {
        assert_eq!(date_sort_key("Cambridge Reading Test", 2026), 0);
        assert_eq!(date_sort_key("", 2026), 0);
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(extract_date_snippet("a 1.2 b 3.4.25"), Some("1.2"));
    }

    #[test]
    fn malformed_snippet_is_zero() {
        assert_eq!(snippet_key("5", 2026), 0);
        assert_eq!(snippet_key("1.2.3.4", 2026), 0);
        assert_eq!(snippet_key("a.b", 2026), 0);
    }

    #[test]
    fn numeric_false_positives_are_taken_at_face_value() {
        // A version number is read as day 3, month 14.
        assert_eq!(date_sort_key("Build 3.14", 2026), 20_261_403);
    }
}
