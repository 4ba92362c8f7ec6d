//! The overview section of the dashboard: income, expense and balance totals
//! for a date range, and how each category contributes to its type's total.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    currency::Currency,
    date_range::{DateRange, DateRangeQuery, date_range_picker},
    endpoints,
    html::CARD_STYLE,
    settings::get_currency,
    transaction_type::TransactionType,
};

pub(super) const OVERVIEW_ID: &str = "overview";

/// The sum of income and expenses over a date range.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct Totals {
    pub income: f64,
    pub expense: f64,
}

impl Totals {
    /// Income minus expenses.
    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

/// The total for one category over a date range.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CategoryTotal {
    /// The category name.
    pub category: String,
    /// The category's emoji.
    pub icon: String,
    pub transaction_type: TransactionType,
    pub amount: f64,
}

/// Sum the user's income and expenses dated within `range`.
pub(super) fn get_totals(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Totals, Error> {
    let mut totals = Totals::default();

    let rows = connection
        .prepare(
            "SELECT type, SUM(amount) FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             GROUP BY type",
        )?
        .query_map((user_id.as_i64(), range.from, range.to), |row| {
            Ok((row.get::<_, TransactionType>(0)?, row.get::<_, f64>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (transaction_type, amount) in rows {
        match transaction_type {
            TransactionType::Income => totals.income = amount,
            TransactionType::Expense => totals.expense = amount,
        }
    }

    Ok(totals)
}

/// Sum the user's transactions dated within `range` per category, largest first.
pub(super) fn get_category_totals(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Vec<CategoryTotal>, Error> {
    connection
        .prepare(
            "SELECT category, MAX(category_icon), type, SUM(amount) AS total
             FROM \"transaction\"
             WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
             GROUP BY type, category
             ORDER BY total DESC, category ASC",
        )?
        .query_map((user_id.as_i64(), range.from, range.to), |row| {
            Ok(CategoryTotal {
                category: row.get(0)?,
                icon: row.get(1)?,
                transaction_type: row.get(2)?,
                amount: row.get(3)?,
            })
        })?
        .map(|maybe_total| maybe_total.map_err(|error| error.into()))
        .collect()
}

/// The share of `total` that `amount` makes up, as a percentage.
fn percentage(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}

/// Load the overview data and render the overview section.
pub(super) fn overview_section(
    user_id: UserID,
    range: DateRange,
    connection: &Connection,
) -> Result<Markup, Error> {
    let totals = get_totals(user_id, range, connection)?;
    let category_totals = get_category_totals(user_id, range, connection)?;
    let currency = get_currency(user_id, connection)?;

    Ok(overview_view(range, totals, &category_totals, currency))
}

fn overview_view(
    range: DateRange,
    totals: Totals,
    category_totals: &[CategoryTotal],
    currency: Currency,
) -> Markup {
    let refresh_url = format!("{}?{}", endpoints::OVERVIEW, range.to_query_string());

    html! {
        section
            id=(OVERVIEW_ID)
            hx-get=(refresh_url)
            hx-trigger="overview from:body"
            hx-swap="outerHTML"
            class="w-full space-y-4"
        {
            div class="flex flex-wrap items-end justify-between gap-4"
            {
                h2 class="text-2xl font-bold" { "Overview" }

                (date_range_picker(range, endpoints::OVERVIEW, &format!("#{OVERVIEW_ID}")))
            }

            div class="grid grid-cols-1 gap-4 md:grid-cols-3"
            {
                (stat_card("Income", "📈", totals.income, currency, "text-emerald-500"))
                (stat_card("Expense", "📉", totals.expense, currency, "text-rose-500"))
                (stat_card("Balance", "💰", totals.balance(), currency, ""))
            }

            div class="grid grid-cols-1 gap-4 md:grid-cols-2"
            {
                (category_stats_card(TransactionType::Income, totals.income, category_totals, currency))
                (category_stats_card(TransactionType::Expense, totals.expense, category_totals, currency))
            }
        }
    }
}

fn stat_card(title: &str, icon: &str, amount: f64, currency: Currency, style: &str) -> Markup {
    html! {
        div class={ (CARD_STYLE) " flex items-center gap-4" }
        {
            span class="text-3xl" role="img" { (icon) }

            div
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { (title) }
                p class={ "text-2xl font-semibold " (style) } { (currency.format(amount)) }
            }
        }
    }
}

fn category_stats_card(
    transaction_type: TransactionType,
    type_total: f64,
    category_totals: &[CategoryTotal],
    currency: Currency,
) -> Markup {
    let totals = category_totals
        .iter()
        .filter(|total| total.transaction_type == transaction_type)
        .collect::<Vec<_>>();
    let bar_style = match transaction_type {
        TransactionType::Income => "h-2 rounded bg-emerald-500",
        TransactionType::Expense => "h-2 rounded bg-rose-500",
    };

    html! {
        div class=(CARD_STYLE)
        {
            h3 class="mb-4 text-lg font-semibold" { (transaction_type.label()) "s by category" }

            @if totals.is_empty() {
                p class="py-6 text-center text-sm text-gray-500 dark:text-gray-400"
                {
                    "No data for the selected period"
                }
            }

            ul class="space-y-3"
            {
                @for total in totals {
                    @let share = percentage(total.amount, type_total);

                    li
                    {
                        div class="flex items-center justify-between text-sm"
                        {
                            span
                            {
                                span role="img" { (total.icon) }
                                " " (total.category)
                                span class="ml-2 text-xs text-gray-500 dark:text-gray-400"
                                {
                                    "(" (format!("{share:.0}")) "%)"
                                }
                            }

                            span { (currency.format(total.amount)) }
                        }

                        div class="mt-1 h-2 w-full rounded bg-gray-200 dark:bg-gray-700"
                        {
                            div class=(bar_style) style=(format!("width: {share:.1}%")) {}
                        }
                    }
                }
            }
        }
    }
}

/// The state needed for the dashboard overview.
#[derive(Debug, Clone)]
pub struct OverviewState {
    /// The longest date range, in days, that may be requested.
    pub max_date_range_days: i64,
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for OverviewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            max_date_range_days: state.max_date_range_days,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the overview section for the range in the query.
///
/// An incomplete range leaves the section unchanged (204 No Content), while an
/// invalid one is rejected with an alert.
pub async fn get_overview(
    State(state): State<OverviewState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DateRangeQuery>,
) -> Response {
    let range = match query.parse() {
        Ok((Some(from), Some(to))) => DateRange::new(from, to, state.max_date_range_days),
        Ok(_) => return StatusCode::NO_CONTENT.into_response(),
        Err(error) => Err(error),
    };

    let range = match range {
        Ok(range) => range,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match overview_section(user_id, range, &connection) {
        Ok(section) => section.into_response(),
        Err(error) => {
            tracing::error!("could not load overview for {range:?}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod overview_tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        User,
        date_range::{DateRange, DateRangeQuery},
        test_utils::{
            assert_status, assert_valid_html, create_test_category, create_test_user,
            get_test_connection, must_select_one, parse_html_fragment, shared_connection,
        },
        transaction::{NewTransaction, create_transaction},
        transaction_type::TransactionType,
    };

    use super::{
        CategoryTotal, OverviewState, Totals, get_category_totals, get_overview, get_totals,
        percentage,
    };

    const JANUARY: DateRange = DateRange {
        from: date!(2025 - 01 - 01),
        to: date!(2025 - 01 - 31),
    };

    fn add(
        user: &User,
        amount: f64,
        category: &str,
        transaction_type: TransactionType,
        date: time::Date,
        connection: &rusqlite::Connection,
    ) {
        create_transaction(
            user.id,
            NewTransaction {
                amount,
                description: String::new(),
                date,
                category: category.to_owned(),
                transaction_type,
            },
            connection,
        )
        .expect("Could not create transaction");
    }

    fn get_state() -> (OverviewState, User) {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        create_test_category(&user, "Salary", "💼", TransactionType::Income, &connection);
        create_test_category(&user, "Food", "🍕", TransactionType::Expense, &connection);
        create_test_category(&user, "Rent", "🏠", TransactionType::Expense, &connection);

        add(&user, 3000.0, "Salary", TransactionType::Income, date!(2025 - 01 - 01), &connection);
        add(&user, 250.0, "Food", TransactionType::Expense, date!(2025 - 01 - 10), &connection);
        add(&user, 750.0, "Rent", TransactionType::Expense, date!(2025 - 01 - 31), &connection);
        // Outside of January.
        add(&user, 99.0, "Food", TransactionType::Expense, date!(2025 - 02 - 01), &connection);

        (
            OverviewState {
                max_date_range_days: 90,
                db_connection: shared_connection(connection),
            },
            user,
        )
    }

    #[test]
    fn totals_for_range() {
        let (state, user) = get_state();
        let connection = state.db_connection.lock().unwrap();

        let got = get_totals(user.id, JANUARY, &connection).unwrap();

        assert_eq!(
            got,
            Totals {
                income: 3000.0,
                expense: 1000.0
            }
        );
        assert_eq!(got.balance(), 2000.0);
    }

    #[test]
    fn totals_are_zero_without_transactions() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);

        let got = get_totals(user.id, JANUARY, &connection).unwrap();

        assert_eq!(got, Totals::default());
    }

    #[test]
    fn category_totals_largest_first() {
        let (state, user) = get_state();
        let connection = state.db_connection.lock().unwrap();

        let got = get_category_totals(user.id, JANUARY, &connection).unwrap();

        assert_eq!(
            got,
            vec![
                CategoryTotal {
                    category: "Salary".to_owned(),
                    icon: "💼".to_owned(),
                    transaction_type: TransactionType::Income,
                    amount: 3000.0,
                },
                CategoryTotal {
                    category: "Rent".to_owned(),
                    icon: "🏠".to_owned(),
                    transaction_type: TransactionType::Expense,
                    amount: 750.0,
                },
                CategoryTotal {
                    category: "Food".to_owned(),
                    icon: "🍕".to_owned(),
                    transaction_type: TransactionType::Expense,
                    amount: 250.0,
                },
            ]
        );
    }

    #[test]
    fn percentage_of_zero_total_is_zero() {
        assert_eq!(percentage(10.0, 0.0), 0.0);
        assert_eq!(percentage(250.0, 1000.0), 25.0);
    }

    #[tokio::test]
    async fn overview_refreshes_with_accepted_range() {
        let (state, user) = get_state();

        let response = get_overview(
            State(state),
            Extension(user.id),
            Query(DateRangeQuery {
                from: Some("2025-01-01".to_owned()),
                to: Some("2025-01-31".to_owned()),
            }),
        )
        .await;

        assert_status(&response, StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let section = must_select_one(&html, "section#overview");
        assert_eq!(
            section.value().attr("hx-get"),
            Some("/api/overview?from=2025-01-01&to=2025-01-31")
        );
        assert_eq!(section.value().attr("hx-trigger"), Some("overview from:body"));
        let text = section.text().collect::<String>();
        assert!(text.contains("$3,000.00"), "want income total in {text}");
        assert!(text.contains("$2,000.00"), "want balance in {text}");
        assert!(text.contains("(75%)"), "want rent share in {text}");
    }

    #[tokio::test]
    async fn overview_rejects_large_range() {
        let (state, user) = get_state();

        let response = get_overview(
            State(state),
            Extension(user.id),
            Query(DateRangeQuery {
                from: Some("2025-01-01".to_owned()),
                to: Some("2025-12-31".to_owned()),
            }),
        )
        .await;

        assert_status(&response, StatusCode::BAD_REQUEST);
    }
}
