use crate::context::Done;
use signalfx_sink_core::EncodeError;
use std::{
    fmt,
    time::Duration,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why the HTTP exchange itself did not complete.
#[derive(Debug)]
pub enum TransportFailure {
    /// The caller's context was cancelled mid-flight.
    Canceled,
    /// The caller's context deadline passed mid-flight.
    DeadlineExceeded,
    /// The client's own request timeout elapsed.
    Timeout(Duration),
    /// Connection or protocol level failure.
    Http(reqwest::Error),
}

impl From<Done> for TransportFailure {
    fn from(done: Done) -> Self {
        match done {
            Done::Canceled => TransportFailure::Canceled,
            Done::DeadlineExceeded => TransportFailure::DeadlineExceeded,
        }
    }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure::Canceled => write!(f, "request canceled: {}", Done::Canceled),
            TransportFailure::DeadlineExceeded => write!(f, "request timeout: {}", Done::DeadlineExceeded),
            TransportFailure::Timeout(timeout) => {
                write!(f, "request timeout: no response within {}ms", timeout.as_millis())
            }
            TransportFailure::Http(err) if err.is_timeout() => write!(f, "request timeout: {err}"),
            TransportFailure::Http(err) => write!(f, "cannot send HTTP request: {err}"),
        }
    }
}

impl std::error::Error for TransportFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportFailure::Http(err) => Some(err),
            _ => None,
        }
    }
}

/// Everything that can go wrong submitting datapoints.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required configuration value is missing.
    #[error("missing required config value `{0}`")]
    Config(&'static str),

    /// The context was already done before the submission started.
    #[error("context already closed: {0}")]
    Context(Done),

    #[error("cannot encode datapoints: {0}")]
    Encode(#[from] EncodeError),

    #[error("cannot parse new HTTP request to {endpoint}: {source}")]
    RequestBuild {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Transport(TransportFailure),

    /// Reading the response body failed. The underlying error is passed
    /// through as is.
    #[error(transparent)]
    ResponseRead(BoxError),

    #[error("invalid status code {status}: {body}")]
    InvalidStatus { status: u16, body: String },

    #[error("cannot unmarshal response body {body:?}: {source}")]
    Unmarshal {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid response body {body:?}")]
    InvalidBody { body: String },
}

impl Error {
    /// True when the transport gave up because of cancellation, a deadline or
    /// a timeout.
    pub fn is_timeout_or_canceled(&self) -> bool {
        matches!(
            self,
            Error::Context(_)
                | Error::Transport(
                    TransportFailure::Canceled | TransportFailure::DeadlineExceeded | TransportFailure::Timeout(_)
                )
        ) || matches!(self, Error::Transport(TransportFailure::Http(err)) if err.is_timeout())
    }
}
