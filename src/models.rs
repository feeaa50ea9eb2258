use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};

// --- Identity ---

/// Role
///
/// The only role the console recognises. Any other value found in a token
/// (or a missing role) is treated as unprivileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    SuperAdmin,
}

impl Role {
    pub const SUPER_ADMIN: &'static str = "super_admin";

    /// Exact match on the wire value; no case folding.
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            Self::SUPER_ADMIN => Some(Role::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => Self::SUPER_ADMIN,
        }
    }
}

/// AccessClaims
///
/// The payload of the `accessToken` credential issued by the platform API.
/// Every field is optional on the wire; the console only relies on `role` and `exp`.
///
/// Decoding is lenient: a field of an unexpected JSON type reads as absent
/// instead of failing the whole token. Numeric ids are kept as strings and
/// fractional timestamps are truncated to whole seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AccessClaims {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Issued-at, seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_seconds", skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub iat: Option<i64>,
    /// Expiry, seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_seconds", skip_serializing_if = "Option::is_none")]
    #[ts(type = "number | null")]
    pub exp: Option<i64>,
}

/// Strings pass through, numbers and booleans are rendered, anything else is absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    })
}

/// Integer, float or numeric-string seconds; anything else is absent.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let seconds = match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse::<f64>().ok().map(|float| float as i64),
        _ => None,
    };
    Ok(seconds)
}

impl AccessClaims {
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role() == Some(Role::SuperAdmin)
    }

    /// A token without `exp` never expires locally.
    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        match self.exp {
            Some(exp) => exp.saturating_mul(1000) < now_millis,
            None => false,
        }
    }
}

// --- Envelope ---

/// ApiResponse
///
/// The `{ success, message, data }` envelope used by the platform API and by
/// every body this service produces itself (errors, logout).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<Value>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Reads `data.accessToken` out of a successful login / OTP body.
pub fn issued_access_token(body: &Value) -> Option<&str> {
    if body.get("success").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    body.pointer("/data/accessToken")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
}

// --- Request Payloads ---

/// PageQuery
///
/// Pagination parameters for the category and creator listings. Only present,
/// non-zero values are forwarded upstream.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, IntoParams, ToSchema, TS)]
#[into_params(parameter_in = Query)]
#[ts(export)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page.filter(|p| *p > 0) {
            pairs.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }
}

/// LoginRequest
///
/// Administrator credentials, forwarded unchanged to the platform login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// ForgotPasswordRequest
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// TokenForm
///
/// A form belonging to a multi-step flow (password reset or signup OTP). The
/// flow token travels in a header upstream; the remaining fields are sent as the
/// JSON body.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenForm {
    #[serde(alias = "signupToken")]
    pub token: String,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub fields: Map<String, Value>,
}

/// A file part of a category upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// CategoryForm
///
/// Multipart category payload. Files are optional on update.
#[derive(Debug, Clone, Default)]
pub struct CategoryForm {
    pub name: String,
    pub image: Option<UploadFile>,
    pub cover_photo: Option<UploadFile>,
}

/// PolicyKind
///
/// The two legal documents administrators maintain under settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    PrivacyPolicy,
    TermsAndConditions,
}

impl PolicyKind {
    pub fn slug(&self) -> &'static str {
        match self {
            PolicyKind::PrivacyPolicy => "privacy-policy",
            PolicyKind::TermsAndConditions => "terms-and-conditions",
        }
    }
}
