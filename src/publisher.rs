//! Adapter between a host's metric records and the datapoint sink.
//!
//! Hosts implement [`MetricRecord`] for their own metric type. The publisher
//! turns each record into a gauge named `snap.<namespace>` tagged with the
//! configured hostname and submits the whole set in one request.

use crate::{
    config::PublisherConfig,
    context::Context,
    error::Result,
    http_transport::{
        HttpPostTransport,
        Transport,
    },
    sink::HttpDatapointSink,
};
use signalfx_sink_core::{
    Datapoint,
    Dimensions,
    MetricKind,
    Value,
};

const METRIC_PREFIX: &str = "snap";
const HOST_DIMENSION: &str = "host";

/// A value as the host hands it over.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricData {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(String),
    Bytes(Vec<u8>),
}

impl MetricData {
    /// Integers and floats become datapoint values, everything else is not
    /// publishable.
    pub fn to_value(&self) -> Option<Value> {
        let value: Value = match *self {
            MetricData::U8(v) => v.into(),
            MetricData::U16(v) => v.into(),
            MetricData::U32(v) => v.into(),
            MetricData::U64(v) => v.into(),
            MetricData::Usize(v) => v.into(),
            MetricData::I8(v) => v.into(),
            MetricData::I16(v) => v.into(),
            MetricData::I32(v) => v.into(),
            MetricData::I64(v) => v.into(),
            MetricData::Isize(v) => v.into(),
            MetricData::F32(v) => v.into(),
            MetricData::F64(v) => v.into(),
            MetricData::Bool(_) | MetricData::Str(_) | MetricData::Bytes(_) => return None,
        };
        Some(value)
    }
}

/// The capabilities the publisher needs from a host metric.
pub trait MetricRecord {
    /// Hierarchical namespace segments, outermost first.
    fn namespace(&self) -> Vec<String>;

    fn data(&self) -> MetricData;
}

/// `snap.` followed by the dot-joined namespace.
pub fn metric_name(namespace: &[String]) -> String {
    let mut name = String::from(METRIC_PREFIX);
    for segment in namespace {
        name.push('.');
        name.push_str(segment);
    }
    name
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

pub struct Publisher<T = HttpPostTransport> {
    sink: HttpDatapointSink<T>,
    hostname: String,
}

impl Publisher {
    pub fn from_config(config: &PublisherConfig) -> Result<Self> {
        let sink = HttpDatapointSink::from_config(&config.sink_config())?;
        Ok(Self::new(sink, &config.hostname))
    }
}

impl<T: Transport> Publisher<T> {
    pub fn new(sink: HttpDatapointSink<T>, hostname: impl ToString) -> Self {
        Self {
            sink,
            hostname: hostname.to_string(),
        }
    }

    /// Convert `records` to datapoints. Records with a value type that cannot
    /// be published are reported and left out.
    pub fn datapoints<'a, R>(&self, records: impl IntoIterator<Item = &'a R>) -> Vec<Datapoint>
    where
        R: MetricRecord + 'a,
    {
        records
            .into_iter()
            .filter_map(|record| {
                let name = metric_name(&record.namespace());
                let data = record.data();
                let Some(value) = data.to_value() else {
                    warn!(metric = %name, ?data, "skipping metric with unsupported value type");
                    return None;
                };
                let dimensions = Dimensions::from([(HOST_DIMENSION.to_string(), self.hostname.clone())]);
                Some(Datapoint::new(name, dimensions, value, MetricKind::Gauge))
            })
            .collect()
    }

    /// Publish `records` with a single submission.
    pub async fn publish<'a, R>(&self, ctx: &Context, records: impl IntoIterator<Item = &'a R>) -> Result<()>
    where
        R: MetricRecord + 'a,
    {
        let points = self.datapoints(records);
        debug!(points = points.len(), hostname = %self.hostname, "publishing metrics");
        self.sink.add_datapoints(ctx, &points).await
    }
}
