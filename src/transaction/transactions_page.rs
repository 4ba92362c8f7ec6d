//! The transactions page: a table of the user's transactions between two
//! dates, with a date range filter that is kept in the page URL.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HX_PUSH_URL;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    currency::Currency,
    date_range::{DateRange, DateRangeQuery, date_range_picker, select_range},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    settings::get_currency,
    timezone::local_today,
    transaction::{Transaction, get_transactions_in_range},
    transaction_type::TransactionType,
};

const TABLE_ID: &str = "transactions-table";

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The longest date range, in days, that may be requested.
    pub max_date_range_days: i64,
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            max_date_range_days: state.max_date_range_days,
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the transactions page.
///
/// Without a complete, valid range in the query the page shows the current
/// month so far. A rejected range is reported with an alert.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<DateRangeQuery>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)?;
    let default_range = DateRange::month_to_date(today);

    let (range, alert) = match query
        .parse()
        .and_then(|(from, to)| select_range(default_range, from, to, state.max_date_range_days))
    {
        Ok(range) => (range, None),
        Err(error) => {
            tracing::debug!("rejected date range {query:?}: {error}");
            (default_range, Some(range_error_alert(error)))
        }
    };

    let (transactions, currency) = {
        let connection = state
            .db_connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        (
            get_transactions_in_range(user_id, range, &connection)?,
            get_currency(user_id, &connection)?,
        )
    };

    let content = html! {
        (NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-6"
            {
                @if let Some(alert) = alert {
                    (alert.into_html())
                }

                div class="flex flex-wrap items-end justify-between gap-4"
                {
                    h1 class="text-3xl font-bold" { "Transactions history" }

                    (date_range_picker(range, endpoints::TRANSACTIONS_TABLE, &format!("#{TABLE_ID}")))
                }

                (transactions_table(&transactions, currency))
            }
        }
    };

    Ok(base("Transactions", &content).into_response())
}

/// Render the transactions table for the range in the query and update the
/// page URL to match.
///
/// An incomplete range leaves the page unchanged (204 No Content), while an
/// invalid one is rejected with an alert.
pub async fn get_transactions_table(
    State(state): State<TransactionsPageState>,
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

    let transactions = get_transactions_in_range(user_id, range, &connection)
        .and_then(|transactions| Ok((transactions, get_currency(user_id, &connection)?)));

    match transactions {
        Ok((transactions, currency)) => {
            let page_url = format!("{}?{}", endpoints::TRANSACTIONS_VIEW, range.to_query_string());

            (
                [(HX_PUSH_URL, page_url)],
                transactions_table(&transactions, currency),
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

fn range_error_alert(error: Error) -> Alert {
    match error {
        Error::DateRangeTooLarge(max_days) => Alert::Error {
            message: "The selected date range is too big".to_owned(),
            details: format!("The maximum allowed range is {max_days} days!"),
        },
        error => Alert::Error {
            message: "Invalid date range".to_owned(),
            details: error.to_string(),
        },
    }
}

fn transactions_table(transactions: &[Transaction], currency: Currency) -> Markup {
    html! {
        div id=(TABLE_ID) class="w-full overflow-x-auto rounded-lg shadow-md"
        {
            table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                        th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { span class="sr-only" { "Actions" } }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction, currency))
                    }

                    @if transactions.is_empty() {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td colspan="6" class={ (TABLE_CELL_STYLE) " text-center" }
                            {
                                "No transactions in this period"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn transaction_row(transaction: &Transaction, currency: Currency) -> Markup {
    let (type_style, amount_style) = match transaction.transaction_type {
        TransactionType::Income => (
            "rounded px-2 py-1 text-xs bg-emerald-400/10 text-emerald-500",
            "text-emerald-500",
        ),
        TransactionType::Expense => (
            "rounded px-2 py-1 text-xs bg-rose-400/10 text-rose-500",
            "text-rose-500",
        ),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE)
            {
                span role="img" { (transaction.category_icon) }
                " "
                (transaction.category)
            }
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE) { (transaction.date) }
            td class=(TABLE_CELL_STYLE)
            {
                span class=(type_style) { (transaction.transaction_type) }
            }
            td class={ (TABLE_CELL_STYLE) " text-right font-medium " (amount_style) }
            {
                (currency.format(transaction.amount))
            }
            td class=(TABLE_CELL_STYLE)
            {
                button
                    hx-delete=(format_endpoint(endpoints::TRANSACTION, transaction.id))
                    hx-confirm="Are you sure you want to delete this transaction?"
                    hx-target="closest tr"
                    hx-target-error="#alert-container"
                    hx-swap="delete"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}

#[cfg(test)]
mod transactions_page_tests {
    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use scraper::Selector;
    use time::{Duration, macros::date};

    use crate::{
        User,
        date_range::DateRangeQuery,
        endpoints,
        test_utils::{
            assert_status, assert_valid_html, create_test_category, create_test_user,
            get_header, get_test_connection, parse_html_document, parse_html_fragment,
            shared_connection,
        },
        timezone::local_today,
        transaction::{NewTransaction, create_transaction},
        transaction_type::TransactionType,
    };

    use super::{TransactionsPageState, get_transactions_page, get_transactions_table};

    fn get_state() -> (TransactionsPageState, User) {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        create_test_category(&user, "Food", "🍕", TransactionType::Expense, &connection);

        for (amount, date) in [
            (12.5, date!(2025 - 01 - 10)),
            (30.0, date!(2025 - 02 - 10)),
            (7.25, date!(2025 - 06 - 10)),
        ] {
            create_transaction(
                user.id,
                NewTransaction {
                    amount,
                    description: "Lunch".to_owned(),
                    date,
                    category: "Food".to_owned(),
                    transaction_type: TransactionType::Expense,
                },
                &connection,
            )
            .expect("Could not create transaction");
        }

        (
            TransactionsPageState {
                local_timezone: "Etc/UTC".to_owned(),
                max_date_range_days: 90,
                db_connection: shared_connection(connection),
            },
            user,
        )
    }

    fn query(from: &str, to: &str) -> Query<DateRangeQuery> {
        Query(DateRangeQuery {
            from: Some(from.to_owned()),
            to: Some(to.to_owned()),
        })
    }

    fn row_count(html: &scraper::Html) -> usize {
        html.select(&Selector::parse("tbody tr button[hx-delete]").unwrap())
            .count()
    }

    #[tokio::test]
    async fn page_shows_transactions_in_range() {
        let (state, user) = get_state();

        let response = get_transactions_page(
            State(state),
            Extension(user.id),
            query("2025-01-01", "2025-02-28"),
        )
        .await
        .expect("Could not render page");

        assert_status(&response, StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        assert_eq!(row_count(&html), 2);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("$30.00"), "want formatted amount in {text}");
    }

    #[tokio::test]
    async fn page_rejects_large_range_and_keeps_default() {
        let (state, user) = get_state();
        let today = local_today("Etc/UTC").unwrap();

        let response = get_transactions_page(
            State(state),
            Extension(user.id),
            query("2025-01-01", "2025-06-30"),
        )
        .await
        .expect("Could not render page");

        let html = parse_html_document(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("The maximum allowed range is 90 days!"));
        let to_input = html
            .select(&Selector::parse("input[name=to]").unwrap())
            .next()
            .unwrap();
        assert_eq!(to_input.value().attr("value"), Some(today.to_string().as_str()));
    }

    #[tokio::test]
    async fn table_pushes_url_for_valid_range() {
        let (state, user) = get_state();

        let response = get_transactions_table(
            State(state),
            Extension(user.id),
            query("2025-06-01", "2025-06-30"),
        )
        .await;

        assert_status(&response, StatusCode::OK);
        assert_eq!(
            get_header(&response, "hx-push-url"),
            format!("{}?from=2025-06-01&to=2025-06-30", endpoints::TRANSACTIONS_VIEW)
        );
        let html = parse_html_fragment(response).await;
        assert_eq!(row_count(&html), 1);
    }

    #[tokio::test]
    async fn table_rejects_range_over_max() {
        let (state, user) = get_state();
        let from = date!(2025 - 01 - 01);
        let to = from + Duration::days(91);

        let response = get_transactions_table(
            State(state),
            Extension(user.id),
            query(&from.to_string(), &to.to_string()),
        )
        .await;

        assert_status(&response, StatusCode::BAD_REQUEST);
        assert!(response.headers().get("hx-push-url").is_none());
    }

    #[tokio::test]
    async fn table_ignores_incomplete_range() {
        let (state, user) = get_state();

        let response = get_transactions_table(
            State(state),
            Extension(user.id),
            Query(DateRangeQuery {
                from: Some("2025-01-01".to_owned()),
                to: Some(String::new()),
            }),
        )
        .await;

        assert_status(&response, StatusCode::NO_CONTENT);
    }
}
