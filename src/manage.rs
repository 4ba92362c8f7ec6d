//! The manage page, where users pick their display currency and look after
//! their income and expense categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    auth::get_user_by_id,
    category::{Category, get_categories},
    currency::{CURRENCIES, Currency},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, submit_button,
    },
    navigation::NavBar,
    settings::{get_currency, set_currency},
    transaction_type::TransactionType,
};

/// The state needed for the manage page and the settings it changes.
#[derive(Debug, Clone)]
pub struct ManageState {
    /// The database connection for categories and user settings.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ManageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the manage page.
pub async fn get_manage_page(
    State(state): State<ManageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let currency = get_currency(user_id, &connection)?;
    let income_categories = get_categories(user_id, Some(TransactionType::Income), &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;
    let expense_categories = get_categories(user_id, Some(TransactionType::Expense), &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve categories: {error}"))?;

    let content = html! {
        (NavBar::new(endpoints::MANAGE_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg space-y-8"
            {
                header class="border-b pb-6 dark:border-gray-700"
                {
                    h1 class="text-3xl font-bold" { "Manage" }
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "Signed in as " (user.email)
                    }
                }

                (currency_form(currency))

                div class="grid gap-4 md:grid-cols-2"
                {
                    (category_list(TransactionType::Income, &income_categories))
                    (category_list(TransactionType::Expense, &expense_categories))
                }
            }
        }
    };

    Ok(base("Manage", &content).into_response())
}

fn currency_form(selected: Currency) -> Markup {
    html! {
        section class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold mb-1" { "Currency" }
            p class="mb-4 text-sm text-gray-500 dark:text-gray-400"
            {
                "Set your default currency for transactions"
            }

            form
                hx-post=(endpoints::CURRENCY_SETTING)
                hx-target="#alert-container"
                hx-target-error="#alert-container"
                class="flex flex-col gap-4 sm:flex-row sm:items-end"
            {
                div class="grow"
                {
                    label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                    select id="currency" name="currency" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        @for currency in CURRENCIES {
                            option value=(currency.code()) selected[currency == selected]
                            {
                                (currency.label())
                            }
                        }
                    }
                }

                div class="sm:w-40" { (submit_button("Save")) }
            }
        }
    }
}

fn category_list(transaction_type: TransactionType, categories: &[Category]) -> Markup {
    let list_id = format!("{transaction_type}-categories");

    html! {
        section id=(list_id) class=(CARD_STYLE)
        {
            h2 class="text-xl font-semibold mb-4"
            {
                (transaction_type.label()) " categories"
            }

            ul class="divide-y divide-gray-200 dark:divide-gray-700"
            {
                @for category in categories {
                    @let confirm_message = format!(
                        "Are you sure you want to delete the category '{}'? \
                        Existing transactions will keep it.",
                        category.name
                    );

                    li class="flex items-center justify-between py-2"
                    {
                        span
                        {
                            span role="img" class="mr-2" { (category.icon) }
                            (category.name)
                        }

                        button
                            hx-delete=(format_endpoint(endpoints::CATEGORY, category.id))
                            hx-confirm=(confirm_message)
                            hx-target="closest li"
                            hx-target-error="#alert-container"
                            hx-swap="delete"
                            class=(BUTTON_DELETE_STYLE)
                        {
                            "Delete"
                        }
                    }
                }

                @if categories.is_empty() {
                    li class="py-2 text-sm text-gray-500 dark:text-gray-400"
                    {
                        "No " (transaction_type) " categories yet."
                    }
                }
            }

            (new_category_form(transaction_type))
        }
    }
}

fn new_category_form(transaction_type: TransactionType) -> Markup {
    let name_id = format!("manage-category-name-{transaction_type}");
    let icon_id = format!("manage-category-icon-{transaction_type}");

    html! {
        form
            hx-post=(endpoints::CATEGORIES_API)
            hx-target-error="#alert-container"
            class="mt-4 grid grid-cols-[4rem_1fr] gap-2"
        {
            input type="hidden" name="type" value=(transaction_type);

            div
            {
                label for=(icon_id) class=(FORM_LABEL_STYLE) { "Icon" }
                input
                    id=(icon_id)
                    type="text"
                    name="icon"
                    placeholder="🍕"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for=(name_id) class=(FORM_LABEL_STYLE) { "Name" }
                input
                    id=(name_id)
                    type="text"
                    name="name"
                    placeholder="Category name"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="col-span-2" { (submit_button("Create category")) }
        }
    }
}

/// The form data for changing the display currency.
#[derive(Debug, Deserialize)]
pub struct CurrencyForm {
    /// An ISO 4217 code, e.g. "EUR".
    pub currency: String,
}

/// Handle a change of the user's display currency.
pub async fn post_currency_setting(
    State(state): State<ManageState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CurrencyForm>,
) -> Response {
    let currency: Currency = match form.currency.parse() {
        Ok(currency) => currency,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_currency(user_id, currency, &connection) {
        Ok(()) => Alert::Success {
            message: "Currency updated".to_owned(),
            details: format!("Amounts are now shown in {}.", currency.label()),
        }
        .into_response(),
        Err(error) => {
            tracing::error!("Could not save currency for user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}


#[cfg(test)]
mod currency_setting_tests {
    use axum::{Extension, Form, extract::State, http::StatusCode};

    use crate::{
        currency::Currency,
        settings::get_currency,
        test_utils::{assert_status, create_test_user, get_test_connection, shared_connection},
    };

    use super::{CurrencyForm, ManageState, post_currency_setting};

    #[tokio::test]
    async fn saves_known_currency() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let state = ManageState {
            db_connection: shared_connection(connection),
        };

        let response = post_currency_setting(
            State(state.clone()),
            Extension(user.id),
            Form(CurrencyForm {
                currency: "JPY".to_owned(),
            }),
        )
        .await;

        assert_status(&response, StatusCode::OK);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_currency(user.id, &connection), Ok(Currency::Jpy));
    }

    #[tokio::test]
    async fn rejects_unknown_currency() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        let state = ManageState {
            db_connection: shared_connection(connection),
        };

        let response = post_currency_setting(
            State(state.clone()),
            Extension(user.id),
            Form(CurrencyForm {
                currency: "DOGE".to_owned(),
            }),
        )
        .await;

        assert_status(&response, StatusCode::BAD_REQUEST);
        let connection = state.db_connection.lock().unwrap();
        assert_eq!(get_currency(user.id, &connection), Ok(Currency::Usd));
    }
}
