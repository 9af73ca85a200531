/*!

# signalfx-sink

A datapoint sink that publishes metrics to a [SignalFx](https://www.splunk.com/en_us/products/infrastructure-monitoring.html)
compatible ingest endpoint.

Datapoints are sanitized, encoded into a protobuf `DataPointUploadMessage` and
sent with one HTTP POST per call. The call reports exactly what went wrong:
encoding, request construction, transport (with cancellation and timeouts
told apart), status code or response body. Nothing is buffered or retried,
deciding whether to try again on the next interval is up to the caller.

Example:

```rust,no_run
use signalfx_sink::{Context, Datapoint, Dimensions, HttpDatapointSink};

# async fn run() -> signalfx_sink::Result<()> {
let sink = HttpDatapointSink::new("ABCDEFG");
let ctx = Context::background();

sink.add_datapoints(&ctx, &[
    // Sending a gauge with the value 1.2
    Datapoint::gauge_f("a.gauge", Dimensions::new(), 1.2),
    // Sending a cumulative counter with dimensions
    Datapoint::cumulative("a.counter", Dimensions::from([("type".into(), "dev".into())]), 100),
])
.await?;
# Ok(())
# }
```

Hosts that collect metrics in their own representation can use the
[`Publisher`], which only needs the host metric type to implement
[`MetricRecord`].

*/

mod config;
mod context;
mod error;
mod http_transport;
mod publisher;
mod sink;
#[cfg(test)]
mod test_server;

pub use config::{
    ConfigSource,
    PublisherConfig,
    SinkConfig,
};
pub use context::{
    Context,
    Done,
};
pub use error::{
    BoxError,
    Error,
    Result,
    TransportFailure,
};
pub use http_transport::{
    HttpPostTransport,
    Transport,
    DEFAULT_ENDPOINT,
    DEFAULT_TIMEOUT,
};
pub use publisher::{
    metric_name,
    MetricData,
    MetricRecord,
    Publisher,
};
pub use signalfx_sink_core::{
    proto,
    sanitize,
    Datapoint,
    Dimensions,
    Encode,
    EncodeError,
    MetricKind,
    Properties,
    PropertyValue,
    ProtobufEncoder,
    Value,
};
pub use sink::HttpDatapointSink;

#[macro_use]
extern crate tracing;

#[macro_use]
extern crate scopeguard;
