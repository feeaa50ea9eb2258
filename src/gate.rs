//! Route access gate.
//!
//! Every page request (anything that is not API, docs or static assets) passes
//! through [`evaluate`] before reaching the console shell. The decision is a
//! pure function of the path, the query string, the session cookie and the
//! current time; [`gate_middleware`] only reads those inputs off the request
//! and turns the decision into a response.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use url::form_urlencoded;

use crate::{
    AppState,
    auth::{TokenDecoder, now_millis},
    cookies,
};

/// Prefixes that bypass the gate entirely.
pub const SKIPPED_PREFIXES: &[&str] = &[
    "/api",
    "/swagger-ui",
    "/api-docs",
    "/static",
    "/_next/static",
    "/_next/image",
    "/favicon.ico",
];

/// Exact paths open to anonymous visitors. Signed-in users are bounced to the landing page.
pub const PUBLIC_ROUTES: &[&str] = &["/login", "/register", "/forgot-password", "/"];

/// Prefixes that require a `super_admin` session.
pub const PROTECTED_PREFIXES: &[&str] = &[
    "/dashboard",
    "/profile",
    "/category",
    "/content",
    "/creators",
    "/settings",
];

pub const LOGIN_PATH: &str = "/login";
pub const LANDING_PATH: &str = "/dashboard";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const RECOVERY_PATH: &str = "/forget";

/// A step of an emailed flow that is only reachable with its link parameters.
pub struct QueryGatedRoute {
    pub path: &'static str,
    pub required: &'static [&'static str],
    pub error: &'static str,
}

pub const QUERY_GATED_ROUTES: &[QueryGatedRoute] = &[
    QueryGatedRoute {
        path: "/verification",
        required: &["email"],
        error: "no-email",
    },
    QueryGatedRoute {
        path: "/reset",
        required: &["token", "email"],
        error: "missing-params",
    },
];

/// The inputs the gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub token: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Redirect {
        location: String,
        /// Also expire the `accessToken` cookie.
        clear_session: bool,
    },
}

impl GateDecision {
    fn redirect(location: impl Into<String>) -> Self {
        GateDecision::Redirect {
            location: location.into(),
            clear_session: false,
        }
    }

    fn reauthenticate(path: &str, error: &str) -> Self {
        GateDecision::Redirect {
            location: login_location(path, Some(error)),
            clear_session: true,
        }
    }
}

pub fn is_skipped(path: &str) -> bool {
    SKIPPED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub fn is_protected(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// `/login?redirect=<path>[&error=<code>]`
pub fn login_location(path: &str, error: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("redirect", path);
    if let Some(error) = error {
        query.append_pair("error", error);
    }
    format!("{LOGIN_PATH}?{}", query.finish())
}

/// First value of `key` in the query string; empty values count as missing.
fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// evaluate
///
/// Decides what happens to a page request. Checks run in a fixed order and the
/// first one that applies wins:
///
/// 1. skipped prefixes pass untouched;
/// 2. an undecodable or expired cookie is cleared and the visitor sent to login;
/// 3. emailed-flow routes need their query parameters;
/// 4. public routes bounce signed-in users to the landing page;
/// 5. protected prefixes need a `super_admin` session;
/// 6. anything else passes.
pub fn evaluate(request: GateRequest<'_>, decoder: &TokenDecoder, now_millis: i64) -> GateDecision {
    let path = request.path;

    if is_skipped(path) {
        return GateDecision::Pass;
    }

    let claims = match request.token {
        Some(token) => match decoder.decode(token) {
            Ok(claims) if claims.is_expired_at(now_millis) => {
                tracing::info!(path, "session expired, clearing credential");
                return GateDecision::reauthenticate(path, "session-expired");
            }
            Ok(claims) => Some(claims),
            Err(err) => {
                tracing::warn!(path, error = %err, "undecodable credential, clearing it");
                return GateDecision::reauthenticate(path, "invalid-token");
            }
        },
        None => None,
    };

    if let Some(route) = QUERY_GATED_ROUTES.iter().find(|route| route.path == path) {
        let complete = route
            .required
            .iter()
            .all(|key| query_param(request.query, key).is_some());
        return if complete {
            GateDecision::Pass
        } else {
            GateDecision::redirect(format!("{RECOVERY_PATH}?error={}", route.error))
        };
    }

    if PUBLIC_ROUTES.contains(&path) {
        return match claims {
            Some(_) => GateDecision::redirect(LANDING_PATH),
            None => GateDecision::Pass,
        };
    }

    if is_protected(path) {
        return match claims {
            None => GateDecision::redirect(login_location(path, None)),
            Some(claims) if !claims.is_super_admin() => {
                tracing::warn!(
                    path,
                    user = claims.id.as_deref().unwrap_or("unknown"),
                    "non-admin session on protected route"
                );
                GateDecision::redirect(UNAUTHORIZED_PATH)
            }
            Some(_) => GateDecision::Pass,
        };
    }

    GateDecision::Pass
}

/// gate_middleware
///
/// Applies [`evaluate`] to every request routed through the console shell.
/// Redirects are `307 Temporary Redirect`; a cleared session appends the
/// expiring `Set-Cookie` header.
pub async fn gate_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let decision = evaluate(
        GateRequest {
            path: request.uri().path(),
            query: request.uri().query(),
            token: cookies::access_token(request.headers()),
        },
        &state.tokens,
        now_millis(),
    );

    match decision {
        GateDecision::Pass => next.run(request).await,
        GateDecision::Redirect {
            location,
            clear_session,
        } => {
            tracing::debug!(from = request.uri().path(), to = %location, "gate redirect");
            let mut response = Redirect::temporary(&location).into_response();
            if clear_session {
                response.headers_mut().append(
                    header::SET_COOKIE,
                    cookies::clear_session_cookie(state.config.secure_cookies()),
                );
            }
            response
        }
    }
}
