use crate::{
    context::Context,
    error::{
        BoxError,
        Error,
        Result,
        TransportFailure,
    },
};
use bytes::{
    Bytes,
    BytesMut,
};
use futures::{
    Stream,
    StreamExt as _,
};
use reqwest::{
    header::{
        CONTENT_TYPE,
        USER_AGENT,
    },
    StatusCode,
};
use std::{
    future::Future,
    time::Duration,
};
use tokio::time::Instant;

/// The public SignalFx datapoint ingest endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://ingest.signalfx.com/v2/datapoint";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const TOKEN_HEADER: &str = "X-SF-Token";
const PROTOBUF_CONTENT_TYPE: &str = "application/x-protobuf";
const USER_AGENT_VALUE: &str = concat!("signalfx-sink/", env!("CARGO_PKG_VERSION"));

/// Delivers one encoded upload message. Implementations make a single attempt
/// and report the outcome, retrying is up to the caller.
pub trait Transport {
    fn send(&self, ctx: &Context, body: Bytes) -> impl Future<Output = Result<()>> + Send;
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// POSTs upload messages to an ingest endpoint.
///
/// The underlying [`reqwest::Client`] pools connections and is shared by
/// clones, so one transport can serve any number of concurrent submissions.
#[derive(Debug, Clone)]
pub struct HttpPostTransport {
    client: reqwest::Client,
    endpoint: String,
    auth_token: String,
    timeout: Duration,
    self_metrics: bool,
}

impl HttpPostTransport {
    /// Create a new transport for the default endpoint.
    pub fn new(auth_token: impl ToString) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            auth_token: auth_token.to_string(),
            timeout: DEFAULT_TIMEOUT,
            self_metrics: false,
        }
    }

    /// Set the endpoint upload messages are posted to.
    pub fn endpoint(mut self, endpoint: impl ToString) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    /// How long to wait for a complete response before giving up.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set whether to emit internal metrics.
    pub fn self_metrics(mut self, self_metrics: bool) -> Self {
        self.self_metrics = self_metrics;
        self
    }

    /// Use a preconfigured client, e.g. one with a proxy or custom TLS roots.
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn build_request(&self, body: Bytes) -> Result<reqwest::Request> {
        self.client
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, PROTOBUF_CONTENT_TYPE)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(TOKEN_HEADER, self.auth_token.as_str())
            .body(body)
            .build()
            .map_err(|source| Error::RequestBuild {
                endpoint: self.endpoint.clone(),
                source,
            })
    }
}

impl Transport for HttpPostTransport {
    fn send(&self, ctx: &Context, body: Bytes) -> impl Future<Output = Result<()>> + Send {
        let body_size = body.len();
        let request = self.build_request(body);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        let self_metrics = self.self_metrics;
        let ctx = ctx.clone();

        async move {
            if let Some(done) = ctx.err() {
                return Err(Error::Context(done));
            }
            let request = request?;
            let started = Instant::now();
            defer! {
                trace!(%endpoint, elapsed = ?started.elapsed(), "datapoint upload finished");
            }

            let exchange = async {
                let response = client
                    .execute(request)
                    .await
                    .map_err(|err| Error::Transport(TransportFailure::Http(err)))?;
                let status = response.status();
                let body = read_body(response.bytes_stream()).await?;
                check_response(status, &body)
            };

            let res = tokio::select! {
                biased;
                done = ctx.done() => Err(Error::Transport(done.into())),
                _ = tokio::time::sleep(timeout) => Err(Error::Transport(TransportFailure::Timeout(timeout))),
                res = exchange => res,
            };

            if self_metrics {
                metrics::histogram!("signalfx_sink_payload_size").record(body_size as f64);
                let outcome = match &res {
                    Ok(()) => "ok",
                    Err(err) if err.is_timeout_or_canceled() => "timeout",
                    Err(_) => "error",
                };
                metrics::counter!("signalfx_sink_requests", "outcome" => outcome).increment(1);
            }

            res
        }
    }
}

/// Collect a response body. A failing chunk aborts the read and its error is
/// handed back unchanged.
pub(crate) async fn read_body<S, E>(stream: S) -> Result<Bytes>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let mut stream = std::pin::pin!(stream);
    let mut body = BytesMut::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| Error::ResponseRead(err.into()))?;
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// The ingest service answers a successful upload with status 200 and the
/// JSON string `"OK"`. Anything else is an error.
pub(crate) fn check_response(status: StatusCode, body: &[u8]) -> Result<()> {
    if !status.is_success() {
        return Err(Error::InvalidStatus {
            status: status.as_u16(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
    }

    let decoded: String = serde_json::from_slice(body).map_err(|source| Error::Unmarshal {
        body: String::from_utf8_lossy(body).into_owned(),
        source,
    })?;

    if decoded != "OK" {
        return Err(Error::InvalidBody { body: decoded });
    }

    Ok(())
}
