//! The history section of the dashboard: income and expenses per day of a
//! month, or per month of a year.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error, UserID,
    currency::Currency,
    endpoints,
    html::{CARD_STYLE, FORM_LABEL_STYLE},
    settings::get_currency,
    timezone::local_today,
    transaction_type::TransactionType,
};

pub(super) const HISTORY_ID: &str = "history";

/// Whether the history shows the days of a month or the months of a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    /// One bar for each day of a month.
    #[default]
    Month,
    /// One bar for each month of a year.
    Year,
}

impl Timeframe {
    fn as_str(self) -> &'static str {
        match self {
            Timeframe::Month => "month",
            Timeframe::Year => "year",
        }
    }
}

/// The month or year to show the history for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Period {
    pub timeframe: Timeframe,
    pub year: i32,
    /// Only used when `timeframe` is [Timeframe::Month].
    pub month: Month,
}

impl Period {
    /// The current month.
    pub fn containing(today: Date) -> Self {
        Self {
            timeframe: Timeframe::Month,
            year: today.year(),
            month: today.month(),
        }
    }

    fn to_query_string(self) -> String {
        format!(
            "timeframe={}&year={}&month={}",
            self.timeframe.as_str(),
            self.year,
            u8::from(self.month)
        )
    }
}

/// The query parameters for the history, e.g. `?timeframe=month&year=2025&month=3`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// Whether to show a month or a year.
    pub timeframe: Option<Timeframe>,
    /// The year, e.g. 2025.
    pub year: Option<i32>,
    /// The month number, from 1 to 12. Ignored when showing a year.
    pub month: Option<u8>,
}

impl HistoryQuery {
    /// Fill in missing parameters from `default`.
    ///
    /// # Errors
    /// Returns an [Error::InvalidDate] if the month is not between 1 and 12.
    fn into_period(self, default: Period) -> Result<Period, Error> {
        let year = self.year.unwrap_or(default.year);
        let month = match self.month {
            Some(month) => Month::try_from(month)
                .map_err(|_| Error::InvalidDate(format!("{year}-{month:02}")))?,
            None => default.month,
        };

        Ok(Period {
            timeframe: self.timeframe.unwrap_or(default.timeframe),
            year,
            month,
        })
    }
}

/// Income and expenses for one day or month.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct HistoryEntry {
    /// The day of the month or the month number, starting at 1.
    pub period: u8,
    pub income: f64,
    pub expense: f64,
}

/// Get the user's totals for each day of the month or each month of the year
/// in `period`, including periods without transactions.
pub(super) fn get_history(
    user_id: UserID,
    period: Period,
    connection: &Connection,
) -> Result<Vec<HistoryEntry>, Error> {
    let (group_format, filter_format, filter_value, period_count) = match period.timeframe {
        Timeframe::Month => (
            "%d",
            "%Y-%m",
            format!("{:04}-{:02}", period.year, u8::from(period.month)),
            period.month.length(period.year),
        ),
        Timeframe::Year => ("%m", "%Y", format!("{:04}", period.year), 12),
    };

    let totals = connection
        .prepare(&format!(
            "SELECT CAST(strftime('{group_format}', date) AS INTEGER) AS period, type, SUM(amount)
             FROM \"transaction\"
             WHERE user_id = ?1 AND strftime('{filter_format}', date) = ?2
             GROUP BY period, type"
        ))?
        .query_map((user_id.as_i64(), filter_value), |row| {
            Ok((
                row.get::<_, u8>(0)?,
                row.get::<_, TransactionType>(1)?,
                row.get::<_, f64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut by_period: HashMap<u8, HistoryEntry> = HashMap::new();
    for (period, transaction_type, amount) in totals {
        let entry = by_period.entry(period).or_insert(HistoryEntry {
            period,
            income: 0.0,
            expense: 0.0,
        });

        match transaction_type {
            TransactionType::Income => entry.income += amount,
            TransactionType::Expense => entry.expense += amount,
        }
    }

    Ok((1..=period_count)
        .map(|period| {
            by_period.remove(&period).unwrap_or(HistoryEntry {
                period,
                income: 0.0,
                expense: 0.0,
            })
        })
        .collect())
}

/// The years in which the user has transactions, newest first.
///
/// Returns `current_year` alone if the user has no transactions.
pub(super) fn get_history_years(
    user_id: UserID,
    current_year: i32,
    connection: &Connection,
) -> Result<Vec<i32>, Error> {
    let years = connection
        .prepare(
            "SELECT DISTINCT CAST(strftime('%Y', date) AS INTEGER) AS year
             FROM \"transaction\" WHERE user_id = ?1 ORDER BY year DESC",
        )?
        .query_map([user_id.as_i64()], |row| row.get(0))?
        .collect::<Result<Vec<i32>, _>>()?;

    if years.is_empty() {
        Ok(vec![current_year])
    } else {
        Ok(years)
    }
}

/// Load the history data and render the history section.
pub(super) fn history_section(
    user_id: UserID,
    period: Period,
    current_year: i32,
    connection: &Connection,
) -> Result<Markup, Error> {
    let entries = get_history(user_id, period, connection)?;
    let years = get_history_years(user_id, current_year, connection)?;
    let currency = get_currency(user_id, connection)?;

    Ok(history_view(period, &years, &entries, currency))
}

fn period_label(timeframe: Timeframe, period: u8) -> String {
    match (timeframe, Month::try_from(period)) {
        (Timeframe::Year, Ok(month)) => month_name(month)[..3].to_owned(),
        _ => period.to_string(),
    }
}

fn month_name(month: Month) -> &'static str {
    match month {
        Month::January => "January",
        Month::February => "February",
        Month::March => "March",
        Month::April => "April",
        Month::May => "May",
        Month::June => "June",
        Month::July => "July",
        Month::August => "August",
        Month::September => "September",
        Month::October => "October",
        Month::November => "November",
        Month::December => "December",
    }
}

fn history_view(
    period: Period,
    years: &[i32],
    entries: &[HistoryEntry],
    currency: Currency,
) -> Markup {
    let refresh_url = format!("{}?{}", endpoints::HISTORY, period.to_query_string());
    let max_amount = entries
        .iter()
        .flat_map(|entry| [entry.income, entry.expense])
        .fold(0.0_f64, f64::max);
    let bar_width = |amount: f64| {
        if max_amount > 0.0 {
            amount / max_amount * 100.0
        } else {
            0.0
        }
    };
    let has_data = entries
        .iter()
        .any(|entry| entry.income > 0.0 || entry.expense > 0.0);

    html! {
        section
            id=(HISTORY_ID)
            hx-get=(refresh_url)
            hx-trigger="overview from:body"
            hx-swap="outerHTML"
            class="w-full space-y-4"
        {
            div class="flex flex-wrap items-end justify-between gap-4"
            {
                h2 class="text-2xl font-bold" { "History" }

                form
                    hx-get=(endpoints::HISTORY)
                    hx-trigger="change"
                    hx-target={ "#" (HISTORY_ID) }
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class="flex flex-wrap items-end gap-4"
                {
                    div
                    {
                        label for="timeframe" class=(FORM_LABEL_STYLE) { "Timeframe" }
                        select id="timeframe" name="timeframe" class=(SELECT_STYLE)
                        {
                            option value="month" selected[period.timeframe == Timeframe::Month] { "Month" }
                            option value="year" selected[period.timeframe == Timeframe::Year] { "Year" }
                        }
                    }

                    div
                    {
                        label for="year" class=(FORM_LABEL_STYLE) { "Year" }
                        select id="year" name="year" class=(SELECT_STYLE)
                        {
                            @for year in years {
                                option value=(year) selected[*year == period.year] { (year) }
                            }
                        }
                    }

                    @if period.timeframe == Timeframe::Month {
                        div
                        {
                            label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                            select id="month" name="month" class=(SELECT_STYLE)
                            {
                                @for number in 1..=12_u8 {
                                    @if let Ok(month) = Month::try_from(number) {
                                        option value=(number) selected[month == period.month]
                                        {
                                            (month_name(month))
                                        }
                                    }
                                }
                            }
                        }
                    } @else {
                        input type="hidden" name="month" value=(u8::from(period.month));
                    }
                }
            }

            div class=(CARD_STYLE)
            {
                @if !has_data {
                    p class="py-6 text-center text-sm text-gray-500 dark:text-gray-400"
                    {
                        "No data for the selected period"
                    }
                } @else {
                    table class="w-full text-sm"
                    {
                        thead class="text-xs uppercase text-gray-500 dark:text-gray-400"
                        {
                            tr
                            {
                                th scope="col" class="w-12 py-1 text-left" {
                                    @match period.timeframe {
                                        Timeframe::Month => "Day",
                                        Timeframe::Year => "Month",
                                    }
                                }
                                th scope="col" class="py-1 text-left" { "Income / Expense" }
                            }
                        }

                        tbody
                        {
                            @for entry in entries {
                                tr
                                {
                                    td class="py-1 align-top font-medium"
                                    {
                                        (period_label(period.timeframe, entry.period))
                                    }
                                    td class="py-1 space-y-1"
                                    {
                                        div
                                            class="h-2 rounded bg-emerald-500"
                                            style=(format!("width: {:.1}%", bar_width(entry.income)))
                                            title={ "Income: " (currency.format(entry.income)) }
                                        {}
                                        div
                                            class="h-2 rounded bg-rose-500"
                                            style=(format!("width: {:.1}%", bar_width(entry.expense)))
                                            title={ "Expense: " (currency.format(entry.expense)) }
                                        {}
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

const SELECT_STYLE: &str = "rounded border border-gray-300 p-2 text-sm \
    dark:bg-gray-700 dark:border-gray-600 dark:text-white";

/// The state needed for the dashboard history.
#[derive(Debug, Clone)]
pub struct HistoryState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for HistoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the history section for the period in the query, defaulting to the
/// current month.
pub async fn get_history_section(
    State(state): State<HistoryState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let period = match query.into_period(Period::containing(today)) {
        Ok(period) => period,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match history_section(user_id, period, today.year(), &connection) {
        Ok(section) => section.into_response(),
        Err(error) => {
            tracing::error!("could not load history for {period:?}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod history_tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::Selector;
    use time::{Month, macros::date};

    use crate::{
        User,
        test_utils::{
            assert_status, assert_valid_html, create_test_category, create_test_user,
            get_test_connection, parse_html_fragment, shared_connection,
        },
        transaction::{NewTransaction, create_transaction},
        transaction_type::TransactionType,
    };

    use super::{
        HistoryEntry, HistoryQuery, HistoryState, Period, Timeframe, get_history,
        get_history_section, get_history_years,
    };

    fn get_state() -> (HistoryState, User) {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        create_test_category(&user, "Salary", "💼", TransactionType::Income, &connection);
        create_test_category(&user, "Food", "🍕", TransactionType::Expense, &connection);

        for (amount, category, transaction_type, date) in [
            (100.0, "Salary", TransactionType::Income, date!(2024 - 02 - 03)),
            (20.0, "Food", TransactionType::Expense, date!(2024 - 02 - 03)),
            (5.5, "Food", TransactionType::Expense, date!(2024 - 02 - 03)),
            (40.0, "Food", TransactionType::Expense, date!(2024 - 02 - 29)),
            (60.0, "Food", TransactionType::Expense, date!(2024 - 07 - 14)),
            (10.0, "Food", TransactionType::Expense, date!(2023 - 12 - 24)),
        ] {
            create_transaction(
                user.id,
                NewTransaction {
                    amount,
                    description: String::new(),
                    date,
                    category: category.to_owned(),
                    transaction_type,
                },
                &connection,
            )
            .expect("Could not create transaction");
        }

        (
            HistoryState {
                local_timezone: "Etc/UTC".to_owned(),
                db_connection: shared_connection(connection),
            },
            user,
        )
    }

    #[test]
    fn month_history_has_every_day() {
        let (state, user) = get_state();
        let connection = state.db_connection.lock().unwrap();
        let period = Period {
            timeframe: Timeframe::Month,
            year: 2024,
            month: Month::February,
        };

        let got = get_history(user.id, period, &connection).unwrap();

        assert_eq!(got.len(), 29, "February 2024 has 29 days");
        assert_eq!(
            got[2],
            HistoryEntry {
                period: 3,
                income: 100.0,
                expense: 25.5
            }
        );
        assert_eq!(got[28].expense, 40.0);
        assert_eq!(got[0].income + got[0].expense, 0.0);
    }

    #[test]
    fn year_history_has_every_month() {
        let (state, user) = get_state();
        let connection = state.db_connection.lock().unwrap();
        let period = Period {
            timeframe: Timeframe::Year,
            year: 2024,
            month: Month::January,
        };

        let got = get_history(user.id, period, &connection).unwrap();

        assert_eq!(got.len(), 12);
        assert_eq!(got[1].expense, 65.5);
        assert_eq!(got[6].expense, 60.0);
        assert_eq!(got[11].expense, 0.0);
    }

    #[test]
    fn years_with_data_newest_first() {
        let (state, user) = get_state();
        let connection = state.db_connection.lock().unwrap();

        let got = get_history_years(user.id, 2030, &connection).unwrap();

        assert_eq!(got, vec![2024, 2023]);
    }

    #[test]
    fn years_default_to_current_year() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        let got = get_history_years(user.id, 2030, &connection).unwrap();

        assert_eq!(got, vec![2030]);
    }

    #[tokio::test]
    async fn renders_selected_period() {
        let (state, user) = get_state();

        let response = get_history_section(
            State(state),
            Extension(user.id),
            Query(HistoryQuery {
                timeframe: Some(Timeframe::Year),
                year: Some(2024),
                month: Some(2),
            }),
        )
        .await;

        assert_status(&response, StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let rows = html
            .select(&Selector::parse("tbody tr").unwrap())
            .count();
        assert_eq!(rows, 12);
        let selected_year = html
            .select(&Selector::parse("select[name=year] option[selected]").unwrap())
            .map(|option| option.text().collect::<String>())
            .collect::<Vec<_>>();
        assert_eq!(selected_year, vec!["2024"]);
    }

    #[tokio::test]
    async fn rejects_invalid_month() {
        let (state, user) = get_state();

        let response = get_history_section(
            State(state),
            Extension(user.id),
            Query(HistoryQuery {
                timeframe: None,
                year: Some(2024),
                month: Some(13),
            }),
        )
        .await;

        assert_status(&response, StatusCode::BAD_REQUEST);
    }
}
