//! Accounts, sessions and the middleware that guards protected routes.

mod cookie;
mod middleware;
mod password;
mod redirect;
mod route_matcher;
mod sign_in;
mod sign_out;
mod sign_up;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use middleware::route_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use redirect::normalize_redirect_url;
pub use sign_in::{get_sign_in_page, post_sign_in};
pub use sign_out::get_sign_out;
pub use sign_up::{get_sign_up_page, post_sign_up};
pub use user::{User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
