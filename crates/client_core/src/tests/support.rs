//! In-process backend double shared by the HTTP-level tests.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Router,
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{api::ApiClient, notify::Notification};

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
}

type Routes = HashMap<(String, String), (StatusCode, String)>;

#[derive(Clone)]
struct MockState {
    routes: Arc<Routes>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub(crate) struct MockServer {
    pub url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub fn builder() -> MockServerBuilder {
        MockServerBuilder {
            routes: HashMap::new(),
        }
    }

    pub fn client(&self) -> Arc<ApiClient> {
        Arc::new(ApiClient::new(self.url.clone()))
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

pub(crate) struct MockServerBuilder {
    routes: Routes,
}

impl MockServerBuilder {
    pub fn respond(mut self, method: &str, path: &str, status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.routes
            .insert((method.to_string(), path.to_string()), (status, body.into()));
        self
    }

    pub async fn spawn(self) -> MockServer {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            routes: Arc::new(self.routes),
            requests: Arc::clone(&requests),
        };
        let app = Router::new().fallback(record).with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        MockServer {
            url: format!("http://{addr}"),
            requests,
        }
    }
}

async fn record(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().await.push(RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body,
        content_type: header_value(header::CONTENT_TYPE),
        authorization: header_value(header::AUTHORIZATION),
    });

    let (status, body) = state
        .routes
        .get(&(method.to_string(), uri.path().to_string()))
        .cloned()
        .unwrap_or((StatusCode::NOT_FOUND, String::new()));
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

pub(crate) fn drain(rx: &mut tokio::sync::broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = rx.try_recv() {
        out.push(notification);
    }
    out
}
