//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/transactions/{transaction_id}', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page for signed in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for managing the currency setting and categories.
pub const MANAGE_VIEW: &str = "/manage";
/// The route for getting the sign in page.
pub const SIGN_IN_VIEW: &str = "/sign-in";
/// The route for getting the sign up page.
pub const SIGN_UP_VIEW: &str = "/sign-up";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route for signing in a user.
pub const SIGN_IN_API: &str = "/api/sign-in";
/// The route for the client to sign out the current user.
pub const SIGN_OUT: &str = "/api/sign-out";
/// The route to create users.
pub const USERS: &str = "/api/users";
/// The route to list and create categories.
pub const CATEGORIES_API: &str = "/api/categories";
/// The route to delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route for the searchable category list in the transaction form.
pub const CATEGORY_PICKER: &str = "/api/categories/picker";
/// The route to create transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to delete a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route for the transactions table filtered by a date range.
pub const TRANSACTIONS_TABLE: &str = "/api/transactions/table";
/// The route for income, expense and category totals over a date range.
pub const OVERVIEW: &str = "/api/overview";
/// The route for per-day or per-month totals.
pub const HISTORY: &str = "/api/history";
/// The route to change the user's display currency.
pub const CURRENCY_SETTING: &str = "/api/settings/currency";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/categories/{category_id}', '{category_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
