use crate::{
    AppState,
    auth::{CurrentUser, SessionToken},
    cookies,
    error::ApiError,
    models::{
        AccessClaims, ApiResponse, CategoryForm, ForgotPasswordRequest, LoginRequest, PageQuery,
        PolicyKind, TokenForm, UploadFile, issued_access_token,
    },
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::Value;

// --- Helpers ---

/// Answers with the platform body and, when the body carries a freshly issued
/// `data.accessToken`, stores it in the session cookie.
fn with_session(body: Value, secure: bool) -> Response {
    let cookie = issued_access_token(&body).and_then(|token| {
        let cookie = cookies::session_cookie(token, secure);
        if cookie.is_none() {
            tracing::error!("issued access token is not a valid cookie value, not storing it");
        }
        cookie
    });

    match cookie {
        Some(cookie) => ([(header::SET_COOKIE, cookie)], Json(body)).into_response(),
        None => Json(body).into_response(),
    }
}

fn to_body<T: serde::Serialize>(payload: &T) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// Collects the `name`, `image` and `coverPhoto` parts of a category upload.
async fn read_category_form(mut multipart: Multipart) -> Result<CategoryForm, ApiError> {
    let mut name = None;
    let mut form = CategoryForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?,
                );
            }
            "image" | "coverPhoto" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                // Browsers send an empty part for an untouched file input.
                if bytes.is_empty() {
                    continue;
                }
                let file = UploadFile {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                };
                if field_name == "image" {
                    form.image = Some(file);
                } else {
                    form.cover_photo = Some(file);
                }
            }
            other => tracing::debug!(field = other, "ignoring unexpected category field"),
        }
    }

    form.name = name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Category name is required"))?;
    Ok(form)
}

// --- Session ---

/// get_me
///
/// [Public Route] Returns the claims of the current session cookie, or `401`
/// with a `null` body when there is no usable session.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Signed-in administrator", body = AccessClaims),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_me(CurrentUser(claims): CurrentUser) -> Json<AccessClaims> {
    Json(claims)
}

/// login
///
/// [Public Route] Forwards credentials to the platform and stores the issued
/// token in the `accessToken` cookie.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login result; sets the session cookie on success", body = ApiResponse),
        (status = 401, description = "Rejected credentials", body = ApiResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let body = state.backend.login(&to_body(&payload)?).await?;
    Ok(with_session(body, state.config.secure_cookies()))
}

/// logout
///
/// [Public Route] Expires the session cookie. Always succeeds.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Session cleared", body = ApiResponse))
)]
pub async fn logout(State(state): State<AppState>) -> Response {
    let cookie = cookies::clear_session_cookie(state.config.secure_cookies());
    ([(header::SET_COOKIE, cookie)], Json(ApiResponse::ok())).into_response()
}

/// forgot_password
///
/// [Public Route] Asks the platform to mail a reset code.
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses((status = 200, description = "Reset mail sent", body = ApiResponse))
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let body = state.backend.forgot_password(&to_body(&payload)?).await?;
    Ok(Json(body))
}

/// verify_reset_otp
///
/// [Public Route] Confirms the mailed reset code. The platform answers with a
/// session token, which is stored like a login.
#[utoipa::path(
    post,
    path = "/api/auth/verify-otp",
    responses((status = 200, description = "Code accepted; sets the session cookie", body = ApiResponse))
)]
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    Json(form): Json<TokenForm>,
) -> Result<Response, ApiError> {
    let body = state
        .backend
        .verify_reset_otp(&form.token, &Value::Object(form.fields))
        .await?;
    Ok(with_session(body, state.config.secure_cookies()))
}

/// reset_password
///
/// [Public Route] Sets a new password using the reset flow token.
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    responses((status = 200, description = "Password changed", body = ApiResponse))
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(form): Json<TokenForm>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .reset_password(&form.token, &Value::Object(form.fields))
        .await?;
    Ok(Json(body))
}

/// verify_signup_otp
///
/// [Public Route] Confirms a signup code and stores the issued session token.
#[utoipa::path(
    post,
    path = "/api/auth/signup/verify-otp",
    responses((status = 200, description = "Code accepted; sets the session cookie", body = ApiResponse))
)]
pub async fn verify_signup_otp(
    State(state): State<AppState>,
    Json(form): Json<TokenForm>,
) -> Result<Response, ApiError> {
    let body = state
        .backend
        .verify_signup_otp(&form.token, &Value::Object(form.fields))
        .await?;
    Ok(with_session(body, state.config.secure_cookies()))
}

/// resend_signup_otp
#[utoipa::path(
    post,
    path = "/api/auth/signup/resend-otp",
    responses((status = 200, description = "Code re-sent", body = ApiResponse))
)]
pub async fn resend_signup_otp(
    State(state): State<AppState>,
    Json(form): Json<TokenForm>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .backend
        .resend_signup_otp(&form.token, &Value::Object(form.fields))
        .await?;
    Ok(Json(body))
}

// --- Categories ---

/// list_categories
///
/// [Authenticated Route] One page of stream categories.
#[utoipa::path(
    get,
    path = "/api/categories",
    params(PageQuery),
    responses((status = 200, description = "Category page", body = ApiResponse))
)]
pub async fn list_categories(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.backend.list_categories(&token, page).await?))
}

/// create_category
///
/// [Authenticated Route] Multipart upload: `name`, optional `image` and `coverPhoto`.
#[utoipa::path(
    post,
    path = "/api/categories",
    responses(
        (status = 200, description = "Category created", body = ApiResponse),
        (status = 400, description = "Missing name or unreadable upload", body = ApiResponse)
    )
)]
pub async fn create_category(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = read_category_form(multipart).await?;
    Ok(Json(state.backend.create_category(&token, form).await?))
}

/// update_category
///
/// [Authenticated Route] Same payload as create; files are only replaced when sent.
#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category ID")),
    responses((status = 200, description = "Category updated", body = ApiResponse))
)]
pub async fn update_category(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = read_category_form(multipart).await?;
    Ok(Json(state.backend.update_category(&token, &id, form).await?))
}

// --- Creators ---

/// list_creators
///
/// [Admin Route] One page of registered creators.
#[utoipa::path(
    get,
    path = "/api/creators",
    params(PageQuery),
    responses((status = 200, description = "Creator page", body = ApiResponse))
)]
pub async fn list_creators(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.backend.list_creators(&token, page).await?))
}

/// delete_creator
///
/// [Admin Route] Removes a creator account. The platform body is wrapped in a
/// success envelope for the console's toast.
#[utoipa::path(
    delete,
    path = "/api/creators/{id}",
    params(("id" = String, Path, description = "Creator ID")),
    responses((status = 200, description = "Creator deleted", body = ApiResponse))
)]
pub async fn delete_creator(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, ApiError> {
    let data = state.backend.delete_creator(&token, &id).await?;
    tracing::info!(creator = %id, "creator deleted");
    Ok(Json(ApiResponse {
        success: true,
        message: Some("User deleted successfully".to_string()),
        data: Some(data),
    }))
}

// --- Dashboard ---

/// dashboard_stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses((status = 200, description = "Headline platform counters", body = ApiResponse))
)]
pub async fn dashboard_stats(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.backend.dashboard_stats(&token).await?))
}

/// growth_overview
#[utoipa::path(
    get,
    path = "/api/dashboard/growth",
    responses((status = 200, description = "Growth series for the dashboard chart", body = ApiResponse))
)]
pub async fn growth_overview(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.backend.growth_overview(&token).await?))
}

// --- Settings ---

/// get_policy
///
/// [Public Route] Current privacy policy or terms and conditions.
#[utoipa::path(
    get,
    path = "/api/settings/{kind}",
    params(("kind" = PolicyKind, Path, description = "privacy-policy or terms-and-conditions")),
    responses((status = 200, description = "Policy document", body = ApiResponse))
)]
pub async fn get_policy(
    State(state): State<AppState>,
    Path(kind): Path<PolicyKind>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.backend.get_policy(kind).await?))
}

/// save_policy
///
/// [Authenticated Route] Publishes a new version of a policy document.
#[utoipa::path(
    post,
    path = "/api/settings/{kind}",
    params(("kind" = PolicyKind, Path, description = "privacy-policy or terms-and-conditions")),
    responses((status = 200, description = "Policy saved", body = ApiResponse))
)]
pub async fn save_policy(
    SessionToken(token): SessionToken,
    State(state): State<AppState>,
    Path(kind): Path<PolicyKind>,
    Json(document): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.backend.save_policy(&token, kind, &document).await?))
}
