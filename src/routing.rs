//! Application router configuration.

use axum::{
    Router, middleware,
    response::Redirect,
    routing::{delete, get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth::{
        get_sign_in_page, get_sign_out, get_sign_up_page, post_sign_in, post_sign_up, route_guard,
    },
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_json,
        get_category_picker,
    },
    dashboard::{get_dashboard_page, get_history_section, get_overview},
    endpoints,
    internal_server_error::get_internal_server_error_page,
    manage::{get_manage_page, post_currency_setting},
    not_found::get_404_not_found,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_transactions_page,
        get_transactions_table,
    },
};

/// Return a router with all the app's routes.
///
/// Every request passes through [route_guard], which only lets requests to
/// protected routes through when they carry a valid session.
pub fn build_router(state: AppState) -> Router {
    let account_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::SIGN_IN_VIEW, get(get_sign_in_page))
        .route(endpoints::SIGN_IN_API, post(post_sign_in))
        .route(endpoints::SIGN_UP_VIEW, get(get_sign_up_page))
        .route(endpoints::USERS, post(post_sign_up))
        .route(endpoints::SIGN_OUT, get(get_sign_out))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let page_routes = Router::new()
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::MANAGE_VIEW, get(get_manage_page));

    let api_routes = Router::new()
        .route(
            endpoints::TRANSACTIONS_API,
            post(create_transaction_endpoint),
        )
        .route(endpoints::TRANSACTIONS_TABLE, get(get_transactions_table))
        .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
        .route(
            endpoints::CATEGORIES_API,
            get(get_categories_json).post(create_category_endpoint),
        )
        .route(endpoints::CATEGORY_PICKER, get(get_category_picker))
        .route(endpoints::CATEGORY, delete(delete_category_endpoint))
        .route(endpoints::OVERVIEW, get(get_overview))
        .route(endpoints::HISTORY, get(get_history_section))
        .route(endpoints::CURRENCY_SETTING, post(post_currency_setting));

    account_routes
        .merge(page_routes)
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
