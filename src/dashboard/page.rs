//! The dashboard page: a greeting, the buttons for recording income and
//! expenses, the overview for the current month and the history.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    auth::get_user_by_id,
    category::get_categories,
    dashboard::{
        history::{Period, history_section},
        overview::overview_section,
    },
    date_range::DateRange,
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    timezone::local_today,
    transaction::create_transaction_dialog,
    transaction_type::TransactionType,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for reading transactions and categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page with an overview of the user's data.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let today = local_today(&state.local_timezone)
        .inspect_err(|error| tracing::error!("could not get today's date: {error}"))?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let income_categories = get_categories(user_id, Some(TransactionType::Income), &connection)?;
    let expense_categories = get_categories(user_id, Some(TransactionType::Expense), &connection)?;
    let overview = overview_section(user_id, DateRange::month_to_date(today), &connection)?;
    let history = history_section(user_id, Period::containing(today), today.year(), &connection)?;

    let content = html! {
        (NavBar::new(endpoints::DASHBOARD_VIEW).into_html())

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-xl space-y-8"
            {
                div class="flex flex-wrap items-center justify-between gap-4 border-b pb-6 dark:border-gray-700"
                {
                    p class="text-3xl font-bold" { "Hello, " (user.email) "! 👋" }

                    div class="flex items-center gap-3"
                    {
                        (create_transaction_dialog(TransactionType::Income, &income_categories, today))
                        (create_transaction_dialog(TransactionType::Expense, &expense_categories, today))
                    }
                }

                (overview)
                (history)
            }
        }
    };

    Ok(base("Dashboard", &content).into_response())
}

#[cfg(test)]
mod dashboard_page_tests {
    use axum::{Extension, extract::State, http::StatusCode};
    use scraper::Selector;

    use crate::{
        test_utils::{
            assert_status, assert_valid_html, create_test_category, create_test_user,
            get_test_connection, must_select_one, parse_html_document, shared_connection,
        },
        transaction_type::TransactionType,
    };

    use super::{DashboardState, get_dashboard_page};

    #[tokio::test]
    async fn dashboard_has_dialogs_overview_and_history() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        create_test_category(&user, "Salary", "💼", TransactionType::Income, &connection);
        create_test_category(&user, "Food", "🍕", TransactionType::Expense, &connection);
        let state = DashboardState {
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: shared_connection(connection),
        };

        let response = get_dashboard_page(State(state), Extension(user.id))
            .await
            .expect("Could not render dashboard");

        assert_status(&response, StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("Hello, test@example.com! 👋"));
        assert!(text.contains("New income 🤑"));
        assert!(text.contains("New expense 😤"));
        must_select_one(&html, "section#overview");
        must_select_one(&html, "section#history");

        let dialogs = html.select(&Selector::parse("dialog").unwrap()).count();
        assert_eq!(dialogs, 2);
        let income_options = html
            .select(&Selector::parse("#category-options-income input[type=radio]").unwrap())
            .map(|input| input.value().attr("value").unwrap_or_default().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(income_options, vec!["Salary"]);
    }
}
