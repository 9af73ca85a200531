use crate::{
    config::SinkConfig,
    context::Context,
    error::{
        Error,
        Result,
    },
    http_transport::{
        HttpPostTransport,
        Transport,
    },
};
use signalfx_sink_core::{
    Datapoint,
    Encode,
    ProtobufEncoder,
};

/// Sends batches of datapoints to an ingest endpoint.
///
/// Every call to [`HttpDatapointSink::add_datapoints`] is self contained: the
/// batch is encoded into a fresh buffer and delivered with exactly one
/// request. Nothing is buffered, retried or remembered between calls, so the
/// sink can be shared freely between tasks.
#[derive(Debug, Clone)]
pub struct HttpDatapointSink<T = HttpPostTransport, E = ProtobufEncoder> {
    transport: T,
    encoder: E,
}

impl HttpDatapointSink {
    /// A sink posting to the default endpoint with the given auth token.
    pub fn new(auth_token: impl ToString) -> Self {
        Self::with_transport(HttpPostTransport::new(auth_token))
    }

    pub fn from_config(config: &SinkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_transport(
            HttpPostTransport::new(&config.auth_token)
                .endpoint(&config.endpoint)
                .timeout(config.timeout)
                .self_metrics(config.self_metrics),
        ))
    }
}

impl<T: Transport> HttpDatapointSink<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            encoder: ProtobufEncoder,
        }
    }
}

impl<T: Transport, E: Encode> HttpDatapointSink<T, E> {
    /// Replace the wire encoder.
    pub fn with_encoder<E2: Encode>(self, encoder: E2) -> HttpDatapointSink<T, E2> {
        HttpDatapointSink {
            transport: self.transport,
            encoder,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Encode `points` and deliver them in a single request.
    ///
    /// An empty batch succeeds without touching the network, even when `ctx`
    /// is already done.
    #[tracing::instrument(level = "debug", skip_all, fields(points = points.len()))]
    pub async fn add_datapoints(&self, ctx: &Context, points: &[Datapoint]) -> Result<()> {
        if points.is_empty() {
            return Ok(());
        }

        if let Some(done) = ctx.err() {
            return Err(Error::Context(done));
        }

        let body = self.encoder.encode(points)?;
        trace!(bytes = body.len(), "encoded upload message");

        self.transport.send(ctx, body).await.inspect_err(|err| {
            debug!(%err, "failed to send datapoints");
        })
    }
}
