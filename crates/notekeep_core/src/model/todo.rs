//! To-do entry model and due-date ordering policy.
//!
//! # Invariants
//! - Due dates are kept as typed text; parsing happens at compare time.
//! - An unparseable due date orders after every parseable one.
//! - `done` never affects ordering.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Identity of a to-do entry within one session.
pub type TodoId = Uuid;

/// Accepted due-date shape: `MM/dd/YYYY`.
pub const DUE_DATE_FORMAT: &str = "%m/%d/%Y";

// chrono's `%Y` also takes a sign and fewer digits; the field shape is fixed.
static DUE_DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").expect("valid due date regex"));

/// In-memory task entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: TodoId,
    pub description: String,
    /// Raw due-date text as typed; may be unparseable.
    pub due_date: String,
    /// Cosmetic completion flag.
    pub done: bool,
}

impl TodoItem {
    pub fn new(description: impl Into<String>, due_date: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            due_date: due_date.into(),
            done: false,
        }
    }

    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        parse_due_date(&self.due_date)
    }
}

/// Parses `MM/dd/YYYY`; `None` for anything else, including impossible dates.
pub fn parse_due_date(text: &str) -> Option<NaiveDate> {
    if !DUE_DATE_SHAPE_RE.is_match(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, DUE_DATE_FORMAT).ok()
}

/// Orders parsed due dates ascending, with missing dates last.
///
/// Two missing dates compare `Equal` so a stable sort keeps their prior order.
pub fn compare_due_dates(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Keeps only the characters a due-date field accepts: digits and `/`.
pub fn sanitize_due_date_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '/')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{compare_due_dates, parse_due_date, sanitize_due_date_input};
    use chrono::NaiveDate;
    use std::cmp::Ordering;

    #[test]
    fn parses_strict_month_day_year() {
        assert_eq!(
            parse_due_date("03/01/2020"),
            NaiveDate::from_ymd_opt(2020, 3, 1)
        );
        assert_eq!(parse_due_date("2020-03-01"), None);
        assert_eq!(parse_due_date("02/30/2020"), None);
        assert_eq!(parse_due_date("03/01/2020 tomorrow"), None);
        assert_eq!(parse_due_date(""), None);
        assert_eq!(parse_due_date("03/01/-5"), None);
        assert_eq!(parse_due_date("03/01/+2020"), None);
        assert_eq!(parse_due_date("1/5/2020"), None);
        assert_eq!(parse_due_date("03/01/20201"), None);
    }

    #[test]
    fn invalid_dates_sort_after_valid_ones() {
        let valid = parse_due_date("12/31/2099");
        assert_eq!(compare_due_dates(valid, None), Ordering::Less);
        assert_eq!(compare_due_dates(None, valid), Ordering::Greater);
        assert_eq!(compare_due_dates(None, None), Ordering::Equal);
    }

    #[test]
    fn sanitize_keeps_digits_and_slashes() {
        assert_eq!(sanitize_due_date_input("0a3/-01/ 2020x"), "03/01/2020");
    }
}
