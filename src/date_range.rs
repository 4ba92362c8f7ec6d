//! The inclusive range of dates that the transactions table and the dashboard
//! overview show, and the rule for changing it.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, Duration, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, html::FORM_LABEL_STYLE};

/// The default maximum number of days between the start and end of a date range.
pub const MAX_DATE_RANGE_DAYS: i64 = 90;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first day in the range.
    pub from: Date,
    /// The last day in the range.
    pub to: Date,
}

impl DateRange {
    /// The range from the first day of `today`'s month up to and including `today`.
    pub fn month_to_date(today: Date) -> Self {
        Self {
            from: today - Duration::days(i64::from(today.day()) - 1),
            to: today,
        }
    }

    /// Create a range from `from` to `to`, inclusive.
    ///
    /// # Errors
    /// Returns an [Error::InvertedDateRange] if `from` is after `to`, or an
    /// [Error::DateRangeTooLarge] if the range spans more than `max_days` days.
    pub fn new(from: Date, to: Date, max_days: i64) -> Result<Self, Error> {
        if from > to {
            return Err(Error::InvertedDateRange(from, to));
        }

        let range = Self { from, to };

        if range.days() > max_days {
            return Err(Error::DateRangeTooLarge(max_days));
        }

        Ok(range)
    }

    /// The number of days from the start to the end of the range.
    pub fn days(&self) -> i64 {
        (self.to - self.from).whole_days()
    }

    /// The range as URL query parameters, e.g. "from=2025-01-01&to=2025-01-31".
    pub fn to_query_string(&self) -> String {
        format!("from={}&to={}", self.from, self.to)
    }
}

/// Apply a user's change to the date range.
///
/// The current range is kept when either bound is missing, since the user
/// has not finished picking dates yet.
///
/// # Errors
/// Returns an [Error::InvertedDateRange] if `from` is after `to`, or an
/// [Error::DateRangeTooLarge] if the range spans more than `max_days` days.
pub fn select_range(
    current: DateRange,
    from: Option<Date>,
    to: Option<Date>,
    max_days: i64,
) -> Result<DateRange, Error> {
    match (from, to) {
        (Some(from), Some(to)) => DateRange::new(from, to, max_days),
        _ => Ok(current),
    }
}

/// The date range query parameters, e.g. `?from=2025-01-01&to=2025-01-31`.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    /// The start date as `YYYY-MM-DD`.
    pub from: Option<String>,
    /// The end date as `YYYY-MM-DD`.
    pub to: Option<String>,
}

impl DateRangeQuery {
    /// Parse the bounds, treating empty values as missing.
    ///
    /// # Errors
    /// Returns an [Error::InvalidDate] if a bound is not a YYYY-MM-DD date.
    pub fn parse(&self) -> Result<(Option<Date>, Option<Date>), Error> {
        Ok((parse_bound(self.from.as_deref())?, parse_bound(self.to.as_deref())?))
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<Date>, Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Date::parse(text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| Error::InvalidDate(text.to_owned())),
    }
}

/// Render a pair of date inputs that fetch `endpoint` into `target` whenever
/// either date changes.
pub fn date_range_picker(range: DateRange, endpoint: &str, target: &str) -> Markup {
    html! {
        form
            hx-get=(endpoint)
            hx-trigger="change"
            hx-target=(target)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            class="flex flex-wrap items-end gap-4"
        {
            div
            {
                label for="from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    type="date"
                    id="from"
                    name="from"
                    value=(range.from)
                    class="rounded border border-gray-300 p-2 text-sm dark:bg-gray-700 dark:border-gray-600 dark:text-white";
            }

            div
            {
                label for="to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    type="date"
                    id="to"
                    name="to"
                    value=(range.to)
                    class="rounded border border-gray-300 p-2 text-sm dark:bg-gray-700 dark:border-gray-600 dark:text-white";
            }
        }
    }
}

#[cfg(test)]
mod select_range_tests {
    use time::macros::date;

    use crate::Error;

    use super::{DateRange, DateRangeQuery, MAX_DATE_RANGE_DAYS, select_range};

    fn current() -> DateRange {
        DateRange {
            from: date!(2025 - 03 - 01),
            to: date!(2025 - 03 - 15),
        }
    }

    #[test]
    fn month_to_date_starts_on_first_of_month() {
        let got = DateRange::month_to_date(date!(2025 - 02 - 18));

        assert_eq!(
            got,
            DateRange {
                from: date!(2025 - 02 - 01),
                to: date!(2025 - 02 - 18),
            }
        );
    }

    #[test]
    fn missing_bound_keeps_current_range() {
        let got = select_range(current(), Some(date!(2025 - 01 - 01)), None, MAX_DATE_RANGE_DAYS);
        assert_eq!(got, Ok(current()));

        let got = select_range(current(), None, Some(date!(2025 - 01 - 01)), MAX_DATE_RANGE_DAYS);
        assert_eq!(got, Ok(current()));
    }

    #[test]
    fn accepts_range_of_exactly_max_days() {
        let from = date!(2025 - 01 - 01);
        let to = date!(2025 - 04 - 01);

        let got = select_range(current(), Some(from), Some(to), MAX_DATE_RANGE_DAYS);

        assert_eq!(got, Ok(DateRange { from, to }));
    }

    #[test]
    fn rejects_range_over_max_days() {
        let got = select_range(
            current(),
            Some(date!(2025 - 01 - 01)),
            Some(date!(2025 - 04 - 02)),
            MAX_DATE_RANGE_DAYS,
        );

        assert_eq!(got, Err(Error::DateRangeTooLarge(MAX_DATE_RANGE_DAYS)));
    }

    #[test]
    fn respects_configured_max_days() {
        let got = select_range(
            current(),
            Some(date!(2025 - 01 - 01)),
            Some(date!(2025 - 01 - 09)),
            7,
        );

        assert_eq!(got, Err(Error::DateRangeTooLarge(7)));
    }

    #[test]
    fn rejects_inverted_range() {
        let from = date!(2025 - 02 - 01);
        let to = date!(2025 - 01 - 01);

        let got = select_range(current(), Some(from), Some(to), MAX_DATE_RANGE_DAYS);

        assert_eq!(got, Err(Error::InvertedDateRange(from, to)));
    }

    #[test]
    fn query_treats_empty_values_as_missing() {
        let query = DateRangeQuery {
            from: Some(String::new()),
            to: Some("2025-01-31".to_owned()),
        };

        assert_eq!(query.parse(), Ok((None, Some(date!(2025 - 01 - 31)))));
    }

    #[test]
    fn query_rejects_malformed_dates() {
        let query = DateRangeQuery {
            from: Some("31/01/2025".to_owned()),
            to: None,
        };

        assert_eq!(
            query.parse(),
            Err(Error::InvalidDate("31/01/2025".to_owned()))
        );
    }
}
