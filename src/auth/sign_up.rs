//! The sign up page and the handler that creates new users.
use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use email_address::EmailAddress;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error, PasswordHash, ValidatedPassword,
    auth::{create_user, set_auth_cookie},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, auth_card, base, password_input,
        submit_button,
    },
    internal_server_error::get_internal_server_error_redirect,
};

/// The minimum number of characters the password should have to be considered valid on the client side (server-side validation is done on top of this validation).
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

#[derive(Default)]
struct SignUpErrors<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
    confirm_password: Option<&'a str>,
}

fn confirm_password_input(min_length: u8, error_message: Option<&str>) -> Markup {
    html! {
        div
        {
            label
                for="confirm-password"
                class=(FORM_LABEL_STYLE)
            {
                "Confirm Password"
            }

            input
                type="password"
                name="confirm_password"
                id="confirm-password"
                placeholder="••••••••"
                class=(FORM_TEXT_INPUT_STYLE)
                required
                minlength=(min_length)
                autofocus[error_message.is_some()];

            @if let Some(error_message) = error_message
            {
                p class="text-red-500 text-base" { (error_message) }
            }
        }
    }
}

fn sign_up_form(email: &str, password: &str, errors: SignUpErrors<'_>) -> Markup {
    html! {
        form
            hx-post=(endpoints::USERS)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            class="space-y-4 md:space-y-6"
        {
            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    type="email"
                    name="email"
                    id="email"
                    placeholder="name@example.com"
                    class=(FORM_TEXT_INPUT_STYLE)
                    required
                    autofocus[errors.email.is_some()]
                    value=(email);

                @if let Some(error_message) = errors.email
                {
                    p class="text-red-500 text-base" { (error_message) }
                }
            }

            (password_input(password, PASSWORD_INPUT_MIN_LENGTH, errors.password))
            (confirm_password_input(PASSWORD_INPUT_MIN_LENGTH, errors.confirm_password))

            (submit_button("Create Account"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Already have an account? "
                a href=(endpoints::SIGN_IN_VIEW) class=(LINK_STYLE) { "Sign in here" }
            }
        }
    }
}

/// Display the sign up page.
pub async fn get_sign_up_page() -> Response {
    let form = sign_up_form("", "", SignUpErrors::default());
    let content = auth_card("Create an account", &form);

    base("Sign Up", &content).into_response()
}

/// The state needed for creating a new user.
#[derive(Debug, Clone)]
pub struct SignUpState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for creating users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignUpState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignUpState> for Key {
    fn from_ref(state: &SignUpState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data entered by the user in the sign up form.
#[derive(Deserialize)]
pub struct SignUpForm {
    /// The email to sign in with.
    pub email: String,
    /// The new password.
    pub password: String,
    /// The new password again, which must match `password`.
    pub confirm_password: String,
}

/// Create a user, sign them in and send them to the dashboard.
///
/// Invalid or duplicate emails, weak passwords and mismatched confirmations
/// are reported inline on the returned form.
pub async fn post_sign_up(
    State(state): State<SignUpState>,
    jar: PrivateCookieJar,
    Form(data): Form<SignUpForm>,
) -> Response {
    let email = match EmailAddress::from_str(data.email.trim()) {
        Ok(email) => email,
        Err(_) => {
            let message = Error::InvalidEmail(data.email.clone()).to_string();
            return sign_up_form(
                &data.email,
                &data.password,
                SignUpErrors {
                    email: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    let validated_password = match ValidatedPassword::new(&data.password, &[email.as_str()]) {
        Ok(password) => password,
        Err(error) => {
            let message = error.to_string();
            return sign_up_form(
                &data.email,
                &data.password,
                SignUpErrors {
                    password: Some(&message),
                    ..Default::default()
                },
            )
            .into_response();
        }
    };

    if data.password != data.confirm_password {
        return sign_up_form(
            &data.email,
            &data.password,
            SignUpErrors {
                confirm_password: Some("Passwords do not match"),
                ..Default::default()
            },
        )
        .into_response();
    }

    let password_hash = match PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("an error occurred while hashing a password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let user = {
        let Ok(connection) = state.db_connection.lock() else {
            tracing::error!("could not acquire database lock");
            return get_internal_server_error_redirect();
        };

        create_user(email, password_hash, &connection)
    };

    match user {
        Ok(user) => match set_auth_cookie(jar, user.id, state.cookie_duration) {
            Ok(jar) => (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
                jar,
            )
                .into_response(),
            Err(error) => {
                tracing::error!("An error occurred while setting the auth cookie: {error}");
                get_internal_server_error_redirect()
            }
        },
        Err(Error::DuplicateEmail) => sign_up_form(
            &data.email,
            &data.password,
            SignUpErrors {
                email: Some("An account with this email already exists, sign in instead."),
                ..Default::default()
            },
        )
        .into_response(),
        Err(error) => {
            tracing::error!("An unhandled error occurred while inserting a new user: {error}");
            get_internal_server_error_redirect()
        }
    }
}
