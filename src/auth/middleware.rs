//! Authentication middleware that guards protected routes, extends sessions,
//! and sends signed out users to the sign in page.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::Duration;

use crate::{
    AppState,
    auth::{
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{
            build_sign_in_redirect_url, build_sign_in_redirect_url_from_target, is_hx_request,
        },
        route_matcher::RouteMatcher,
    },
    endpoints,
};

/// How far each authenticated request pushes back the session expiry.
const SESSION_EXTENSION: Duration = Duration::minutes(5);

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The routes that need a signed in user.
    pub protected_routes: RouteMatcher,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            protected_routes: RouteMatcher::default(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// The response for a request to a protected route without a valid session.
///
/// Pages get a `303 See Other` to the sign in page. HTMX requests to the
/// API get an `HX-Redirect` so the whole page navigates. Other API requests
/// get a plain `401 Unauthorized`.
fn signed_out_response(request: &Request) -> Response {
    let is_api = request.uri().path().starts_with("/api");

    if is_api && !is_hx_request(request) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let sign_in_url = build_sign_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!("Invalid redirect URL for {}. Falling back to dashboard.", request.uri());

        build_sign_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::SIGN_IN_VIEW.to_owned())
    });

    if is_api {
        (HxRedirect(sign_in_url), StatusCode::OK).into_response()
    } else {
        Redirect::to(&sign_in_url).into_response()
    }
}

/// Middleware function that checks for a valid auth cookie on protected routes.
///
/// Requests to routes that are not protected pass straight through. For
/// protected routes the user ID is placed into the request extensions and the
/// request is run as normal if the cookie is valid, otherwise the client is
/// sent to the sign in page (see [signed_out_response]).
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserID>` to receive the user ID.
pub async fn route_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    if !state.protected_routes.is_match(request.uri().path()) {
        return next.run(request).await;
    }

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Error getting cookie jar: {error:?}. Redirecting to sign in page.");
            return signed_out_response(&Request::from_parts(parts, body));
        }
    };
    let user_id = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(_) => return signed_out_response(&Request::from_parts(parts, body)),
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    let (mut parts, body) = response.into_parts();
    let jar = match extend_auth_cookie_duration_if_needed(jar.clone(), SESSION_EXTENSION) {
        Ok(updated_jar) => updated_jar,
        Err(error) => {
            tracing::error!("Error extending cookie duration: {error}. Rolling back cookie jar.");
            jar
        }
    };

    // Handlers such as sign out set their own auth cookie, which must win.
    if !parts.headers.contains_key(SET_COOKIE) {
        for (key, value) in jar.into_response().headers().iter() {
            if key == SET_COOKIE {
                parts.headers.append(key, value.to_owned());
            }
        }
    }

    Response::from_parts(parts, body)
}
