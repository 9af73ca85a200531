//! An in-process ingest endpoint for tests. Decodes every upload it receives
//! and answers with a configurable status and body.

use axum::{
    body::Bytes,
    extract::State,
    http::{
        header::CONTENT_TYPE,
        HeaderMap,
        StatusCode,
    },
    routing::post,
    Router,
};
use prost::Message as _;
use signalfx_sink_core::proto::DataPointUploadMessage;
use std::{
    net::SocketAddr,
    sync::{
        Arc,
        Mutex,
    },
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
enum Behavior {
    Respond,
    Block,
    CancelAndBlock(CancellationToken),
}

/// How the test endpoint answers.
#[derive(Debug, Clone)]
pub struct Upstream {
    status: u16,
    body: String,
    behavior: Behavior,
}

impl Upstream {
    /// Status 200 with body `"OK"`.
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: r#""OK""#.to_string(),
            behavior: Behavior::Respond,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn body(mut self, body: impl ToString) -> Self {
        self.body = body.to_string();
        self
    }

    /// Never answer.
    pub fn block(mut self) -> Self {
        self.behavior = Behavior::Block;
        self
    }

    /// Cancel `token` once the upload arrived, then never answer.
    pub fn cancel_and_block(mut self, token: CancellationToken) -> Self {
        self.behavior = Behavior::CancelAndBlock(token);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub token: Option<String>,
    pub content_type: Option<String>,
    pub message: DataPointUploadMessage,
}

struct ServerState {
    upstream: Upstream,
    received: Mutex<Vec<ReceivedRequest>>,
}

pub struct TestServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(upstream: Upstream) -> Self {
        let state = Arc::new(ServerState {
            upstream,
            received: Mutex::new(Vec::new()),
        });
        let app = Router::new().route("/", post(receive)).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test server");
        let addr = listener.local_addr().expect("test server address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        Self { addr, state, handle }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ReceivedRequest> {
        self.state.received.lock().unwrap().last().cloned()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn receive(State(state): State<Arc<ServerState>>, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
    let message = DataPointUploadMessage::decode(body).expect("body is an upload message");
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let request = ReceivedRequest {
        token: header("x-sf-token"),
        content_type: header(CONTENT_TYPE.as_str()),
        message,
    };
    state.received.lock().unwrap().push(request);

    match &state.upstream.behavior {
        Behavior::Respond => {}
        Behavior::Block => std::future::pending::<()>().await,
        Behavior::CancelAndBlock(token) => {
            token.cancel();
            std::future::pending::<()>().await
        }
    }

    let status = StatusCode::from_u16(state.upstream.status).expect("valid status code");
    (status, state.upstream.body.clone())
}
