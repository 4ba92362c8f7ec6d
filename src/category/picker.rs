//! The searchable category list used to pick a category in the transaction
//! form, and the JSON listing of a user's categories.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error, UserID,
    category::{Category, get_categories},
    endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    transaction_type::TransactionType,
};

/// The state needed to list categories.
#[derive(Debug, Clone)]
pub struct CategoryListState {
    /// The database connection for reading categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The ID of the element holding the category options for `transaction_type`.
pub fn options_id(transaction_type: TransactionType) -> String {
    format!("category-options-{transaction_type}")
}

/// The categories whose name contains `query`, ignoring case.
fn filter_categories<'a>(categories: &'a [Category], query: &str) -> Vec<&'a Category> {
    let query = query.trim().to_lowercase();

    categories
        .iter()
        .filter(|category| category.name.as_ref().to_lowercase().contains(&query))
        .collect()
}

/// Render the radio inputs for the categories matching `query`, with the
/// category named `selected` checked.
///
/// The selected category is always listed, even when it does not match
/// `query`, so searching never clears the form's `category` field.
pub fn category_options(
    transaction_type: TransactionType,
    categories: &[Category],
    query: &str,
    selected: &str,
) -> Markup {
    let mut matches = filter_categories(categories, query);
    let no_matches = matches.is_empty();

    let selected_category = categories
        .iter()
        .find(|category| category.name.as_ref() == selected);

    if let Some(selected_category) = selected_category {
        if !matches.contains(&selected_category) {
            matches.insert(0, selected_category);
        }
    }

    html! {
        div
            id=(options_id(transaction_type))
            role="radiogroup"
            class="flex flex-col gap-2 max-h-48 overflow-y-auto"
        {
            @if no_matches {
                div class="py-2 text-center text-sm text-gray-500 dark:text-gray-400"
                {
                    p { "Category not found" }
                    p class="text-xs" { "Tip: Create a new category" }
                }
            }

            @for category in matches {
                @let input_id = format!("category-{transaction_type}-{}", category.id);

                div
                {
                    input
                        type="radio"
                        name="category"
                        id=(input_id)
                        value=(category.name)
                        checked[category.name.as_ref() == selected]
                        class=(FORM_RADIO_INPUT_STYLE);

                    label for=(input_id) class=(FORM_RADIO_LABEL_STYLE)
                    {
                        span role="img" { (category.icon) }
                        span { (category.name) }
                    }
                }
            }
        }
    }
}

/// Render the whole picker: a search box, the category options and the
/// controls for creating a category without leaving the form.
///
/// The picker's inputs belong to the surrounding transaction form, so the
/// chosen category is submitted with it as the `category` field.
pub fn category_picker(
    transaction_type: TransactionType,
    categories: &[Category],
    selected: &str,
) -> Markup {
    let options_target = format!("#{}", options_id(transaction_type));
    let create_vals = json!({ "type": transaction_type, "picker": "true" }).to_string();
    let name_id = format!("new-category-name-{transaction_type}");
    let icon_id = format!("new-category-icon-{transaction_type}");

    html! {
        fieldset class="space-y-2"
        {
            legend class=(FORM_LABEL_STYLE) { "Category" }

            input
                type="search"
                name="q"
                placeholder="Search category..."
                autocomplete="off"
                aria-label="Search category"
                hx-get=(endpoints::CATEGORY_PICKER)
                hx-trigger="input changed delay:200ms, search"
                hx-include="closest form"
                hx-target=(options_target)
                hx-swap="outerHTML"
                class=(FORM_TEXT_INPUT_STYLE);

            (category_options(transaction_type, categories, "", selected))

            details class="text-sm"
            {
                summary class="cursor-pointer text-gray-500 dark:text-gray-400"
                {
                    "Create new category"
                }

                div class="mt-2 flex gap-2"
                {
                    input
                        type="text"
                        name="icon"
                        id=(icon_id)
                        placeholder="🍕"
                        aria-label="Icon"
                        class={ (FORM_TEXT_INPUT_STYLE) " w-16 text-center" };

                    input
                        type="text"
                        name="name"
                        id=(name_id)
                        placeholder="Name"
                        aria-label="Name"
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button
                    type="button"
                    hx-post=(endpoints::CATEGORIES_API)
                    hx-include="closest details"
                    hx-vals=(create_vals)
                    hx-target=(options_target)
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class={ (BUTTON_SECONDARY_STYLE) " mt-2" }
                {
                    "Create category"
                }
            }
        }
    }
}

/// The query parameters for the category picker, e.g. `?type=expense&q=fo&selected=Food`.
#[derive(Debug, Deserialize)]
pub struct PickerQuery {
    /// Only categories of this type are listed.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// The search text. Categories whose name contains it, ignoring case, are listed.
    #[serde(default)]
    pub q: String,
    /// The currently chosen category. The transaction form submits this as
    /// `category`.
    #[serde(default, alias = "category")]
    pub selected: String,
}

/// Render the category options matching the search in `query`.
pub async fn get_category_picker(
    State(state): State<CategoryListState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<PickerQuery>,
) -> Response {
    let categories = {
        let Ok(connection) = state.db_connection.lock() else {
            tracing::error!("could not acquire database lock");
            return Error::DatabaseLockError.into_alert_response();
        };

        get_categories(user_id, Some(query.transaction_type), &connection)
    };

    match categories {
        Ok(categories) => category_options(
            query.transaction_type,
            &categories,
            &query.q,
            &query.selected,
        )
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// The query parameters for the categories API, e.g. `?type=income`.
#[derive(Debug, Deserialize)]
pub struct CategoriesQuery {
    /// Either "income" or "expense", checked by the handler.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
}

/// List the user's categories of one type as JSON.
///
/// Responds with 400 Bad Request if `type` is missing or is not "income" or "expense".
pub async fn get_categories_json(
    State(state): State<CategoryListState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<CategoriesQuery>,
) -> Response {
    let transaction_type = match query
        .transaction_type
        .as_deref()
        .map(str::parse::<TransactionType>)
    {
        Some(Ok(transaction_type)) => transaction_type,
        Some(Err(error)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response();
        }
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "missing query parameter \"type\"" })),
            )
                .into_response();
        }
    };

    let Ok(connection) = state.db_connection.lock() else {
        tracing::error!("could not acquire database lock");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    match get_categories(user_id, Some(transaction_type), &connection) {
        Ok(categories) => Json(categories).into_response(),
        Err(error) => {
            tracing::error!("could not list categories: {error}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
