//! The endpoint for creating a transaction from the dashboard dialogs.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use maud::html;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    category::get_categories,
    timezone::local_today,
    transaction::{
        create_dialog::{TransactionFormValues, create_transaction_form},
        create_transaction,
        schema::{INVALID_TYPE_MSG, TransactionInput, validate},
    },
    transaction_type::TransactionType,
};

/// The events sent to the page after a transaction is created.
///
/// `overview` refreshes the dashboard overview and `transaction-created`
/// closes the dialog.
pub const TRANSACTION_CREATED_EVENTS: &str = "overview, transaction-created";

/// The state needed for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for saving transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Validate and save a new transaction.
///
/// Invalid fields re-render the form with the errors (422). On success the
/// form is reset, a success alert is shown and the page is told to refresh
/// anything that shows transaction totals.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Extension(user_id): Extension<UserID>,
    Form(input): Form<TransactionInput>,
) -> Response {
    let Ok(transaction_type) = input.transaction_type.parse::<TransactionType>() else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Alert::Error {
                message: "Invalid transaction".to_owned(),
                details: INVALID_TYPE_MSG.to_owned(),
            }
            .into_html(),
        )
            .into_response();
    };

    let today = match local_today(&state.local_timezone) {
        Ok(today) => today,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let validated = validate(&input);

    let created = match validated {
        Ok(transaction) => create_transaction(user_id, transaction, &connection),
        Err(errors) => {
            return match get_categories(user_id, Some(transaction_type), &connection) {
                Ok(categories) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    create_transaction_form(
                        transaction_type,
                        &categories,
                        &TransactionFormValues::from_input(&input),
                        &errors,
                    ),
                )
                    .into_response(),
                Err(error) => error.into_alert_response(),
            };
        }
    };

    match created {
        Ok(transaction) => {
            tracing::debug!("created transaction {} for user {user_id}", transaction.id);
        }
        Err(error @ Error::CategoryNotFound(_)) => return error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");
            return error.into_alert_response();
        }
    }

    let categories = match get_categories(user_id, Some(transaction_type), &connection) {
        Ok(categories) => categories,
        Err(error) => return error.into_alert_response(),
    };

    (
        [(HX_TRIGGER, TRANSACTION_CREATED_EVENTS)],
        html! {
            (create_transaction_form(
                transaction_type,
                &categories,
                &TransactionFormValues::defaults(today),
                &[],
            ))
            (Alert::SuccessSimple {
                message: "Transaction created successfully 🎉".to_owned(),
            }
            .into_oob_html())
        },
    )
        .into_response()
}
