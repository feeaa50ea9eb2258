#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::{
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};
use streamdesk_console::{
    AppConfig, AppState, BackendState, create_router,
    backend::{BackendApi, BackendError},
    models::{CategoryForm, PageQuery, PolicyKind},
};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const SHELL_HTML: &str = "<html><body>streamdesk console</body></html>";

// --- Stub Backend ---

/// One call the console made against the platform.
#[derive(Debug, Clone, Default)]
pub struct RecordedCall {
    pub op: &'static str,
    pub bearer: Option<String>,
    pub flow_token: Option<String>,
    pub body: Option<Value>,
    pub detail: Option<String>,
}

/// Records every call and answers with a canned reply.
#[derive(Default)]
pub struct StubBackend {
    pub calls: Mutex<Vec<RecordedCall>>,
    /// `Err((status, message))` simulates a platform rejection.
    pub reply: Mutex<Option<Result<Value, (u16, String)>>>,
}

impl StubBackend {
    pub fn replying(reply: Value) -> Self {
        let stub = Self::default();
        *stub.reply.lock().unwrap() = Some(Ok(reply));
        stub
    }

    pub fn rejecting(status: u16, message: &str) -> Self {
        let stub = Self::default();
        *stub.reply.lock().unwrap() = Some(Err((status, message.to_string())));
        stub
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, call: RecordedCall) -> Result<Value, BackendError> {
        self.calls.lock().unwrap().push(call);
        match self.reply.lock().unwrap().clone() {
            Some(Ok(value)) => Ok(value),
            Some(Err((status, message))) => Err(BackendError::Status { status, message }),
            None => Ok(json!({ "success": true, "data": [] })),
        }
    }
}

#[async_trait]
impl BackendApi for StubBackend {
    async fn login(&self, credentials: &Value) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "login",
            body: Some(credentials.clone()),
            ..Default::default()
        })
    }

    async fn forgot_password(&self, body: &Value) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "forgot_password",
            body: Some(body.clone()),
            ..Default::default()
        })
    }

    async fn verify_reset_otp(&self, reset_token: &str, body: &Value) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "verify_reset_otp",
            flow_token: Some(reset_token.to_string()),
            body: Some(body.clone()),
            ..Default::default()
        })
    }

    async fn reset_password(&self, reset_token: &str, body: &Value) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "reset_password",
            flow_token: Some(reset_token.to_string()),
            body: Some(body.clone()),
            ..Default::default()
        })
    }

    async fn verify_signup_otp(&self, signup_token: &str, body: &Value) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "verify_signup_otp",
            flow_token: Some(signup_token.to_string()),
            body: Some(body.clone()),
            ..Default::default()
        })
    }

    async fn resend_signup_otp(&self, signup_token: &str, body: &Value) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "resend_signup_otp",
            flow_token: Some(signup_token.to_string()),
            body: Some(body.clone()),
            ..Default::default()
        })
    }

    async fn list_categories(&self, bearer: &str, page: PageQuery) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "list_categories",
            bearer: Some(bearer.to_string()),
            detail: Some(format!("{:?}", page.to_pairs())),
            ..Default::default()
        })
    }

    async fn create_category(&self, bearer: &str, form: CategoryForm) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "create_category",
            bearer: Some(bearer.to_string()),
            detail: Some(describe_form(&form)),
            ..Default::default()
        })
    }

    async fn update_category(
        &self,
        bearer: &str,
        id: &str,
        form: CategoryForm,
    ) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "update_category",
            bearer: Some(bearer.to_string()),
            detail: Some(format!("{id}:{}", describe_form(&form))),
            ..Default::default()
        })
    }

    async fn list_creators(&self, bearer: &str, page: PageQuery) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "list_creators",
            bearer: Some(bearer.to_string()),
            detail: Some(format!("{:?}", page.to_pairs())),
            ..Default::default()
        })
    }

    async fn delete_creator(&self, bearer: &str, id: &str) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "delete_creator",
            bearer: Some(bearer.to_string()),
            detail: Some(id.to_string()),
            ..Default::default()
        })
    }

    async fn dashboard_stats(&self, bearer: &str) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "dashboard_stats",
            bearer: Some(bearer.to_string()),
            ..Default::default()
        })
    }

    async fn growth_overview(&self, bearer: &str) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "growth_overview",
            bearer: Some(bearer.to_string()),
            ..Default::default()
        })
    }

    async fn get_policy(&self, kind: PolicyKind) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "get_policy",
            detail: Some(kind.slug().to_string()),
            ..Default::default()
        })
    }

    async fn save_policy(
        &self,
        bearer: &str,
        kind: PolicyKind,
        body: &Value,
    ) -> Result<Value, BackendError> {
        self.answer(RecordedCall {
            op: "save_policy",
            bearer: Some(bearer.to_string()),
            body: Some(body.clone()),
            detail: Some(kind.slug().to_string()),
            ..Default::default()
        })
    }
}

/// `name|image=<file>|cover=<file>` for assertions.
fn describe_form(form: &CategoryForm) -> String {
    let file = |f: &Option<streamdesk_console::models::UploadFile>| {
        f.as_ref()
            .map(|f| format!("{}({}b)", f.file_name.clone().unwrap_or_default(), f.bytes.len()))
            .unwrap_or_else(|| "-".to_string())
    };
    format!("{}|image={}|cover={}", form.name, file(&form.image), file(&form.cover_photo))
}

// --- App Harness ---

/// A router over a stub backend and a temporary console shell directory.
pub struct TestConsole {
    pub router: Router,
    pub backend: Arc<StubBackend>,
    _assets: TempDir,
}

impl TestConsole {
    pub fn new(backend: StubBackend) -> Self {
        Self::with_config(backend, AppConfig::default())
    }

    pub fn with_config(backend: StubBackend, mut config: AppConfig) -> Self {
        let assets = tempfile::tempdir().unwrap();
        std::fs::write(assets.path().join("index.html"), SHELL_HTML).unwrap();
        config.asset_dir = assets.path().to_string_lossy().into_owned();

        let backend = Arc::new(backend);
        let state = AppState::new(backend.clone() as BackendState, config);

        Self {
            router: create_router(state),
            backend,
            _assets: assets,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = cookie {
            builder = builder.header("cookie", format!("accessToken={token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }
}

// --- Tokens ---

pub fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Signs `payload` with an arbitrary key; the default config decodes without verifying.
pub fn token(payload: Value) -> String {
    encode(
        &Header::default(),
        &payload,
        &EncodingKey::from_secret(b"platform-issuer-secret"),
    )
    .unwrap()
}

pub fn admin_token() -> String {
    token(json!({
        "id": "665f1c",
        "role": "super_admin",
        "email": "ops@streamdesk.tv",
        "fullName": "Ops Lead",
        "iat": now_secs(),
        "exp": now_secs() + 3600,
    }))
}

pub fn expired_admin_token() -> String {
    token(json!({ "id": "665f1c", "role": "super_admin", "exp": now_secs() - 60 }))
}

pub fn creator_token() -> String {
    token(json!({ "id": "777aaa", "role": "creator", "exp": now_secs() + 3600 }))
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

pub fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
