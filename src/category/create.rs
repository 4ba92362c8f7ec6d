//! Category creation endpoint, used by the manage page and by the category
//! picker in the transaction form.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::html;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    category::{
        CategoryIcon, CategoryName, NewCategory, create_category, get_categories,
        picker::category_options,
    },
    endpoints,
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for creating a category.
#[derive(Debug, Deserialize)]
pub struct CategoryFormData {
    /// The category name, e.g. "Food".
    pub name: String,
    /// A single emoji, e.g. "🍕".
    pub icon: String,
    /// Either "income" or "expense".
    #[serde(rename = "type")]
    pub transaction_type: String,
    /// Set to "true" when the request comes from the category picker.
    #[serde(default)]
    pub picker: Option<String>,
}

impl CategoryFormData {
    fn is_from_picker(&self) -> bool {
        self.picker.as_deref() == Some("true")
    }
}

fn parse_category(form: &CategoryFormData, user_id: UserID) -> Result<NewCategory, Error> {
    Ok(NewCategory {
        user_id,
        name: CategoryName::new(&form.name)?,
        icon: CategoryIcon::new(&form.icon)?,
        transaction_type: form.transaction_type.parse()?,
    })
}

/// Handle category creation.
///
/// Requests from the category picker get the picker's options back with the
/// new category selected. Other requests are redirected to the manage page.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    Extension(user_id): Extension<UserID>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let new_category = match parse_category(&form, user_id) {
        Ok(new_category) => new_category,
        Err(error) => return error.into_alert_response(),
    };
    let transaction_type = new_category.transaction_type;

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let category = match create_category(new_category, &connection) {
        Ok(category) => category,
        Err(error @ Error::DuplicateCategory(_)) => return error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");
            return error.into_alert_response();
        }
    };

    if !form.is_from_picker() {
        return (
            HxRedirect(endpoints::MANAGE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response();
    }

    match get_categories(user_id, Some(transaction_type), &connection) {
        Ok(categories) => html! {
            (category_options(transaction_type, &categories, "", category.name.as_ref()))
            (Alert::SuccessSimple {
                message: format!("Created the category {} {}", category.icon, category.name),
            }
            .into_oob_html())
        }
        .into_response(),
        Err(error) => error.into_alert_response(),
    }
}
