use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, multipart};
use serde::Serialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use url::Url;

use crate::models::{CategoryForm, PageQuery, PolicyKind, UploadFile};

/// BackendError
///
/// Failure of a single platform API call. There is no retry: the console API
/// reports the failure and the operator re-submits.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The platform answered with a non-2xx status.
    #[error("platform API returned {status}: {message}")]
    Status { status: u16, message: String },
    /// The request never completed (DNS, connect, timeout, TLS).
    #[error("platform API request failed: {0}")]
    Network(#[source] reqwest::Error),
    /// An uploaded file declared a content type reqwest cannot parse.
    #[error("upload has an invalid content type: {0}")]
    Upload(#[source] reqwest::Error),
    /// A 2xx answer whose body was not JSON.
    #[error("platform API body could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
    /// A caller-supplied id that cannot name a single resource.
    #[error("invalid resource id: {0:?}")]
    InvalidId(String),
    /// The client could not be built from its configuration.
    #[error("platform API client misconfigured: {0}")]
    Setup(String),
}

/// BackendApi
///
/// Contract for every call the console makes against the platform REST API.
/// Successful bodies are returned as raw JSON: their shape belongs to the
/// platform, and the console API forwards them untouched.
///
/// `bearer` is the administrator's `accessToken`, sent as
/// `Authorization: Bearer <token>`. Flow tokens (`reset_token`,
/// `signup_token`) travel in their dedicated headers instead.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // --- Authentication ---
    async fn login(&self, credentials: &Value) -> Result<Value, BackendError>;
    async fn forgot_password(&self, body: &Value) -> Result<Value, BackendError>;
    async fn verify_reset_otp(&self, reset_token: &str, body: &Value) -> Result<Value, BackendError>;
    async fn reset_password(&self, reset_token: &str, body: &Value) -> Result<Value, BackendError>;
    async fn verify_signup_otp(&self, signup_token: &str, body: &Value) -> Result<Value, BackendError>;
    async fn resend_signup_otp(&self, signup_token: &str, body: &Value) -> Result<Value, BackendError>;

    // --- Categories ---
    async fn list_categories(&self, bearer: &str, page: PageQuery) -> Result<Value, BackendError>;
    async fn create_category(&self, bearer: &str, form: CategoryForm) -> Result<Value, BackendError>;
    async fn update_category(
        &self,
        bearer: &str,
        id: &str,
        form: CategoryForm,
    ) -> Result<Value, BackendError>;

    // --- Creators ---
    async fn list_creators(&self, bearer: &str, page: PageQuery) -> Result<Value, BackendError>;
    async fn delete_creator(&self, bearer: &str, id: &str) -> Result<Value, BackendError>;

    // --- Dashboard ---
    async fn dashboard_stats(&self, bearer: &str) -> Result<Value, BackendError>;
    async fn growth_overview(&self, bearer: &str) -> Result<Value, BackendError>;

    // --- Settings ---
    /// Policy documents are readable without a session.
    async fn get_policy(&self, kind: PolicyKind) -> Result<Value, BackendError>;
    async fn save_policy(
        &self,
        bearer: &str,
        kind: PolicyKind,
        body: &Value,
    ) -> Result<Value, BackendError>;
}

/// BackendState
///
/// The concrete type used to share the platform client across the application state.
pub type BackendState = Arc<dyn BackendApi>;

const RESET_TOKEN_HEADER: &str = "x-reset-token";
const SIGNUP_TOKEN_HEADER: &str = "x-signup-token";

/// HttpBackend
///
/// `BackendApi` over reqwest. One pooled client is shared by all requests.
#[derive(Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| BackendError::Setup(format!("API base URL {base_url:?}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Setup(format!(
                "API base URL {base_url} cannot carry a path"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Setup(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    /// `{base}/api/v1/{segments..}`. Each segment is percent-encoded on its
    /// own, so `/` or `?` inside an id never changes the upstream route.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base can always carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.endpoint(segments))
    }

    fn authed(&self, method: Method, segments: &[&str], bearer: &str) -> RequestBuilder {
        self.request(method, segments).bearer_auth(bearer)
    }

    fn json_post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> RequestBuilder {
        self.request(Method::POST, segments).json(body)
    }

    /// Sends the request and maps the outcome. On a non-2xx answer the
    /// platform's own `message` is kept when it sent one.
    async fn send(&self, request: RequestBuilder) -> Result<Value, BackendError> {
        let response = request.send().await.map_err(BackendError::Network)?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), %message, "platform API rejected request");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response.json::<Value>().await.map_err(BackendError::Decode)
    }
}

/// Dot segments would be dropped or resolved by URL normalisation, so they
/// cannot stand for a resource id.
fn resource_id(id: &str) -> Result<&str, BackendError> {
    match id {
        "" | "." | ".." => Err(BackendError::InvalidId(id.to_string())),
        id => Ok(id),
    }
}

fn file_part(file: UploadFile) -> Result<multipart::Part, BackendError> {
    let mut part = multipart::Part::bytes(file.bytes);
    if let Some(name) = file.file_name {
        part = part.file_name(name);
    }
    if let Some(mime) = file.content_type {
        part = part.mime_str(&mime).map_err(BackendError::Upload)?;
    }
    Ok(part)
}

/// Category payload as the platform expects it: `name` plus optional
/// `image` / `coverPhoto` files.
fn category_multipart(form: CategoryForm) -> Result<multipart::Form, BackendError> {
    let mut multipart = multipart::Form::new().text("name", form.name);
    if let Some(image) = form.image {
        multipart = multipart.part("image", file_part(image)?);
    }
    if let Some(cover) = form.cover_photo {
        multipart = multipart.part("coverPhoto", file_part(cover)?);
    }
    Ok(multipart)
}

#[async_trait]
impl BackendApi for HttpBackend {
    async fn login(&self, credentials: &Value) -> Result<Value, BackendError> {
        self.send(self.json_post(&["admin", "login"], credentials)).await
    }

    async fn forgot_password(&self, body: &Value) -> Result<Value, BackendError> {
        self.send(self.json_post(&["admin", "forgot-password"], body)).await
    }

    async fn verify_reset_otp(&self, reset_token: &str, body: &Value) -> Result<Value, BackendError> {
        let request = self
            .json_post(&["admin", "verify-otp"], body)
            .header(RESET_TOKEN_HEADER, reset_token);
        self.send(request).await
    }

    async fn reset_password(&self, reset_token: &str, body: &Value) -> Result<Value, BackendError> {
        let request = self
            .json_post(&["admin", "reset-password"], body)
            .header(RESET_TOKEN_HEADER, reset_token);
        self.send(request).await
    }

    async fn verify_signup_otp(&self, signup_token: &str, body: &Value) -> Result<Value, BackendError> {
        let request = self
            .json_post(&["auth", "verify-otp"], body)
            .header(SIGNUP_TOKEN_HEADER, signup_token);
        self.send(request).await
    }

    async fn resend_signup_otp(&self, signup_token: &str, body: &Value) -> Result<Value, BackendError> {
        let request = self
            .json_post(&["auth", "resend-otp"], body)
            .header(SIGNUP_TOKEN_HEADER, signup_token);
        self.send(request).await
    }

    async fn list_categories(&self, bearer: &str, page: PageQuery) -> Result<Value, BackendError> {
        let request = self
            .authed(Method::GET, &["categories"], bearer)
            .query(&page.to_pairs());
        self.send(request).await
    }

    async fn create_category(&self, bearer: &str, form: CategoryForm) -> Result<Value, BackendError> {
        let request = self
            .authed(Method::POST, &["categories", "create-category"], bearer)
            .multipart(category_multipart(form)?);
        self.send(request).await
    }

    async fn update_category(
        &self,
        bearer: &str,
        id: &str,
        form: CategoryForm,
    ) -> Result<Value, BackendError> {
        let request = self
            .authed(Method::PATCH, &["categories", "update", resource_id(id)?], bearer)
            .multipart(category_multipart(form)?);
        self.send(request).await
    }

    async fn list_creators(&self, bearer: &str, page: PageQuery) -> Result<Value, BackendError> {
        let request = self
            .authed(Method::GET, &["admin", "creators"], bearer)
            .query(&page.to_pairs());
        self.send(request).await
    }

    async fn delete_creator(&self, bearer: &str, id: &str) -> Result<Value, BackendError> {
        let request = self.authed(Method::DELETE, &["admin", "creators", resource_id(id)?], bearer);
        self.send(request).await
    }

    async fn dashboard_stats(&self, bearer: &str) -> Result<Value, BackendError> {
        self.send(self.authed(Method::GET, &["admin", "stats"], bearer)).await
    }

    async fn growth_overview(&self, bearer: &str) -> Result<Value, BackendError> {
        self.send(self.authed(Method::GET, &["admin", "growth-overview"], bearer))
            .await
    }

    async fn get_policy(&self, kind: PolicyKind) -> Result<Value, BackendError> {
        let request = self.request(Method::GET, &["admin", "settings", kind.slug()]);
        self.send(request).await
    }

    async fn save_policy(
        &self,
        bearer: &str,
        kind: PolicyKind,
        body: &Value,
    ) -> Result<Value, BackendError> {
        let request = self
            .authed(Method::POST, &["admin", "settings", kind.slug()], bearer)
            .json(body);
        self.send(request).await
    }
}
