use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde_json::Value;
use thiserror::Error;

use crate::{cookies, error::ApiError, models::AccessClaims};

/// TokenError
///
/// Why a credential could not be turned into claims. The gate treats every
/// variant the same way (forced re-authentication); the distinction only
/// matters for logs.
#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("token is not a well-formed JWT: {0}")]
    Malformed(String),
    #[error("token signature does not match the configured secret")]
    BadSignature,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// TokenDecoder
///
/// Turns the raw `accessToken` cookie into `AccessClaims`.
///
/// With a secret configured the HS256 signature is checked; without one the
/// payload is only decoded, which trusts the issuing backend entirely and is
/// refused in production by `AppConfig::load`. Expiry is never validated here:
/// callers compare `exp` against their own clock so that a missing `exp`
/// stays acceptable.
#[derive(Clone)]
pub struct TokenDecoder {
    /// `None` decodes without checking the signature.
    verifier: Option<(DecodingKey, Validation)>,
}

impl TokenDecoder {
    pub fn verifying(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        Self {
            verifier: Some((DecodingKey::from_secret(secret.as_bytes()), validation)),
        }
    }

    pub fn unverified() -> Self {
        Self { verifier: None }
    }

    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::verifying(secret),
            None => Self::unverified(),
        }
    }

    pub fn verifies_signature(&self) -> bool {
        self.verifier.is_some()
    }

    pub fn decode(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let data = match &self.verifier {
            Some((key, validation)) => decode::<AccessClaims>(token, key, validation)?,
            None => jsonwebtoken::dangerous::insecure_decode::<AccessClaims>(token)?,
        };
        Ok(data.claims)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// SessionToken
///
/// The raw credential from the `accessToken` cookie, forwarded as the bearer
/// token on backend calls. Console API routes are not gated, so every
/// data-backed handler takes this extractor to require a session.
///
/// Rejection: `401` with `{ success: false, message: "No access token found" }`.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        cookies::access_token(&parts.headers)
            .map(|token| SessionToken(token.to_string()))
            .ok_or_else(|| ApiError::unauthorized("No access token found"))
    }
}

/// CurrentUser
///
/// The decoded, unexpired claims of the session cookie.
///
/// Rejection: `401` with a JSON `null` body, which the console shell reads as
/// "signed out".
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AccessClaims);

pub struct SignedOut;

impl IntoResponse for SignedOut {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(Value::Null)).into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    TokenDecoder: FromRef<S>,
{
    type Rejection = SignedOut;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = cookies::access_token(&parts.headers).ok_or(SignedOut)?;
        let decoder = TokenDecoder::from_ref(state);

        let claims = decoder.decode(token).map_err(|err| {
            tracing::debug!(error = %err, "rejecting session cookie");
            SignedOut
        })?;

        if claims.is_expired_at(now_millis()) {
            return Err(SignedOut);
        }

        Ok(CurrentUser(claims))
    }
}
