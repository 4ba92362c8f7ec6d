//! The endpoint for deleting a transaction from the transactions table.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use rusqlite::Connection;

use crate::{
    AppState, Error, UserID,
    alert::Alert,
    transaction::{TransactionId, delete_transaction},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for deleting transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// The status code has to be 200 OK or HTMX will not delete the table row,
/// so the success alert is swapped out of band.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(user_id, transaction_id, &connection) {
        Ok(()) => (
            [(HX_TRIGGER, "overview")],
            Alert::SuccessSimple {
                message: "Transaction deleted".to_owned(),
            }
            .into_oob_html(),
        )
            .into_response(),
        Err(Error::DeleteMissingTransaction) => Error::DeleteMissingTransaction.into_alert_response(),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod delete_transaction_endpoint_tests {
    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::date;

    use crate::{
        test_utils::{
            assert_status, create_test_category, create_test_user, get_header,
            get_test_connection, shared_connection,
        },
        transaction::{NewTransaction, create_transaction},
        transaction_type::TransactionType,
    };

    use super::{DeleteTransactionState, delete_transaction_endpoint};

    #[tokio::test]
    async fn deletes_transaction_and_triggers_overview() {
        let connection = get_test_connection();
        let user = create_test_user(&connection);
        create_test_category(&user, "Salary", "💼", TransactionType::Income, &connection);
        let transaction = create_transaction(
            user.id,
            NewTransaction {
                amount: 1000.0,
                description: String::new(),
                date: date!(2025 - 05 - 01),
                category: "Salary".to_owned(),
                transaction_type: TransactionType::Income,
            },
            &connection,
        )
        .unwrap();
        let state = DeleteTransactionState {
            db_connection: shared_connection(connection),
        };

        let response = delete_transaction_endpoint(
            State(state.clone()),
            Extension(user.id),
            Path(transaction.id),
        )
        .await;

        assert_status(&response, StatusCode::OK);
        assert_eq!(get_header(&response, "hx-trigger"), "overview");

        let response =
            delete_transaction_endpoint(State(state), Extension(user.id), Path(transaction.id))
                .await;

        assert_status(&response, StatusCode::NOT_FOUND);
        assert!(response.headers().get("hx-trigger").is_none());
    }
}
