//! Release date detection (`March 5, 2025`, `Mar 5, 2025`)

use chrono::NaiveDate;
use regex::Regex;

/// Finds the first human-readable calendar date in a text
pub struct DateMatcher {
    date_re: Regex,
}

impl DateMatcher {
    pub fn new() -> Self {
        Self {
            // Full names are listed before abbreviations so `March` is not cut to `Mar`
            date_re: Regex::new(
                r"\b(January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+(0?[1-9]|[12]\d|3[01]),\s*(\d{4})\b",
            )
            .unwrap(),
        }
    }

    /// First valid date in document order.
    ///
    /// Matches that name an impossible day (`February 30, 2024`) are skipped.
    pub fn first_date(&self, text: &str) -> Option<NaiveDate> {
        self.date_re.captures_iter(text).find_map(|caps| {
            let month = month_number(caps.get(1)?.as_str())?;
            let day = caps.get(2)?.as_str().parse().ok()?;
            let year = caps.get(3)?.as_str().parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        })
    }
}

impl Default for DateMatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(month)
}
