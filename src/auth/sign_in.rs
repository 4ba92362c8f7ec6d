//! The sign in page and the handler for sign in requests.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{get_user_by_email, invalidate_auth_cookie, normalize_redirect_url, set_auth_cookie},
    endpoints,
    html::{
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE, auth_card, base, password_input,
        submit_button,
    },
};

/// How long the auth cookie should last if the user selects "remember me" at sign in.
pub(super) const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Shown when the email is unknown or the password is wrong.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";
const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

fn sign_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::SIGN_IN_API)
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

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
                    autofocus
                    value=(email);
            }

            (password_input("", 0, error_message))

            div class="flex items-center gap-x-3"
            {
                input
                    type="checkbox"
                    name="remember_me"
                    id="remember_me"
                    class="rounded-xs";

                label
                    for="remember_me"
                    class="block text-sm font-medium text-gray-900 dark:text-white"
                {
                    "Keep me signed in for one week"
                }
            }

            (submit_button("Sign in"))

            p class="text-sm font-light text-gray-500 dark:text-gray-400"
            {
                "Don't have an account? "
                a href=(endpoints::SIGN_UP_VIEW) class=(LINK_STYLE) { "Sign up here" }
            }
        }
    }
}

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    let redirect_url = raw_url.and_then(normalize_redirect_url);

    if let (None, Some(raw_url)) = (&redirect_url, raw_url) {
        tracing::warn!("Invalid redirect URL from {source}: {raw_url}");
    }

    redirect_url
}

/// The query parameters for the sign in page.
#[derive(Deserialize)]
pub struct RedirectQuery {
    /// Where to send the user after they sign in.
    pub redirect_url: Option<String>,
}

/// Display the sign in page.
pub async fn get_sign_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "sign in query");
    let form = sign_in_form("", None, redirect_url.as_deref());
    let content = auth_card("Sign in to your account", &form);

    base("Sign In", &content).into_response()
}

/// The state needed to sign in a user.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The data entered by the user in the sign in form.
#[derive(Clone, Deserialize)]
pub struct SignInData {
    /// Email entered during sign in.
    pub email: String,
    /// Password entered during sign in.
    pub password: String,

    /// Whether to extend the initial auth cookie duration.
    ///
    /// This value comes from a checkbox, so it is either set to some string or
    /// missing. `Some` means `true` regardless of the string value.
    pub remember_me: Option<String>,

    /// Where to send the user after signing in.
    pub redirect_url: Option<String>,
}

/// Handler for sign in requests via the POST method.
///
/// On success the auth cookie is set and the client is redirected to the
/// requested page, or the dashboard. Otherwise the form is returned with an
/// error message explaining the problem.
pub async fn post_sign_in(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    Form(data): Form<SignInData>,
) -> Response {
    let redirect_url = parse_redirect_url(data.redirect_url.as_deref(), "sign in form");
    let redirect_url = redirect_url.as_deref();
    let render_error = |message: &str| sign_in_form(&data.email, Some(message), redirect_url);

    let user = {
        let connection = match state.db_connection.lock() {
            Ok(connection) => connection,
            Err(error) => {
                tracing::error!("could not acquire database lock: {error}");
                return render_error(INTERNAL_ERROR_MSG).into_response();
            }
        };

        match get_user_by_email(data.email.trim(), &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => {
                return render_error(INVALID_CREDENTIALS_ERROR_MSG).into_response();
            }
            Err(error) => {
                tracing::error!("Unhandled error while verifying credentials: {error}");
                return render_error(INTERNAL_ERROR_MSG).into_response();
            }
        }
    };

    match user.password_hash.verify(&data.password) {
        Ok(true) => {}
        Ok(false) => return render_error(INVALID_CREDENTIALS_ERROR_MSG).into_response(),
        Err(error) => {
            tracing::error!("Unhandled error while verifying credentials: {error}");
            return render_error(INTERNAL_ERROR_MSG).into_response();
        }
    }

    let cookie_duration = if data.remember_me.is_some() {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let redirect_url = redirect_url.unwrap_or(endpoints::DASHBOARD_VIEW);

    match set_auth_cookie(jar.clone(), user.id, cookie_duration) {
        Ok(updated_jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(redirect_url.to_owned()),
            updated_jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}


#[cfg(test)]
mod sign_in_tests {
    use axum::{Form, extract::State, http::StatusCode, response::Response};
    use axum_extra::extract::PrivateCookieJar;
    use time::{Duration, OffsetDateTime};

    use crate::{
        app_state::create_cookie_key,
        auth::{COOKIE_TOKEN, DEFAULT_COOKIE_DURATION},
        endpoints,
        test_utils::{
            TEST_PASSWORD, assert_form_error_message, assert_hx_redirect, create_test_user,
            get_test_connection, must_get_form, parse_html_fragment, shared_connection,
        },
    };

    use super::{
        INVALID_CREDENTIALS_ERROR_MSG, REMEMBER_ME_COOKIE_DURATION, SignInData, SignInState,
        post_sign_in,
    };

    fn get_state() -> SignInState {
        let connection = get_test_connection();
        create_test_user(&connection);

        SignInState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            db_connection: shared_connection(connection),
        }
    }

    async fn sign_in(data: SignInData) -> Response {
        let state = get_state();
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        post_sign_in(State(state), jar, Form(data)).await
    }

    fn sign_in_data(password: &str) -> SignInData {
        SignInData {
            email: "test@example.com".to_owned(),
            password: password.to_owned(),
            remember_me: None,
            redirect_url: None,
        }
    }

    fn get_token_cookie_expiry(response: &Response) -> OffsetDateTime {
        response
            .headers()
            .get_all("set-cookie")
            .iter()
            .filter_map(|header| header.to_str().ok())
            .filter_map(|header| axum_extra::extract::cookie::Cookie::parse(header).ok())
            .find(|cookie| cookie.name() == COOKIE_TOKEN)
            .and_then(|cookie| cookie.expires_datetime())
            .expect("token cookie with expiry missing")
    }

    #[tokio::test]
    async fn sign_in_succeeds_with_valid_credentials() {
        let response = sign_in(sign_in_data(TEST_PASSWORD)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::DASHBOARD_VIEW);
        let expiry = get_token_cookie_expiry(&response);
        assert!((expiry - (OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION)).abs() < Duration::seconds(2));
    }

    #[tokio::test]
    async fn remember_me_extends_cookie() {
        let response = sign_in(SignInData {
            remember_me: Some("on".to_owned()),
            ..sign_in_data(TEST_PASSWORD)
        })
        .await;

        let expiry = get_token_cookie_expiry(&response);
        assert!(
            (expiry - (OffsetDateTime::now_utc() + REMEMBER_ME_COOKIE_DURATION)).abs()
                < Duration::seconds(2)
        );
    }

    #[tokio::test]
    async fn sign_in_redirects_to_requested_url() {
        let redirect_url = "/transactions?from=2025-01-01&to=2025-01-31";

        let response = sign_in(SignInData {
            redirect_url: Some(redirect_url.to_owned()),
            ..sign_in_data(TEST_PASSWORD)
        })
        .await;

        assert_hx_redirect(&response, redirect_url);
    }

    #[tokio::test]
    async fn wrong_password_shows_error() {
        let response = sign_in(sign_in_data("thewrongpassword")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, INVALID_CREDENTIALS_ERROR_MSG);
    }

    #[tokio::test]
    async fn unknown_email_shows_same_error() {
        let response = sign_in(SignInData {
            email: "nobody@example.com".to_owned(),
            ..sign_in_data(TEST_PASSWORD)
        })
        .await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, INVALID_CREDENTIALS_ERROR_MSG);
    }
}
