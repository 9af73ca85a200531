//! The SignalFx `DataPointUploadMessage` protobuf schema.
//!
//! These messages are written out by hand instead of being generated from the
//! `.proto` file at build time, which keeps `protoc` out of the build. Field
//! tags and types follow `signalfx_metrics.proto` exactly.

mod datapoint;
mod metric_type;

/// The wire enum for the metric type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum MetricType {
    Gauge = 0,
    Counter = 1,
    Enum = 2,
    CumulativeCounter = 3,
}

/// Exactly one of the fields is set.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Datum {
    #[prost(string, optional, tag = "1")]
    pub str_value: Option<String>,
    #[prost(double, optional, tag = "2")]
    pub double_value: Option<f64>,
    #[prost(int64, optional, tag = "3")]
    pub int_value: Option<i64>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Dimension {
    #[prost(string, optional, tag = "1")]
    pub key: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub value: Option<String>,
}

/// Exactly one of the fields is set.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PropertyValue {
    #[prost(string, optional, tag = "1")]
    pub str_value: Option<String>,
    #[prost(double, optional, tag = "2")]
    pub double_value: Option<f64>,
    #[prost(int64, optional, tag = "3")]
    pub int_value: Option<i64>,
    #[prost(bool, optional, tag = "4")]
    pub bool_value: Option<bool>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Property {
    #[prost(string, optional, tag = "1")]
    pub key: Option<String>,
    #[prost(message, optional, tag = "2")]
    pub value: Option<PropertyValue>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DataPoint {
    #[prost(string, optional, tag = "1")]
    pub source: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub metric: Option<String>,
    /// Milliseconds since the unix epoch.
    #[prost(int64, optional, tag = "3")]
    pub timestamp: Option<i64>,
    #[prost(message, optional, tag = "4")]
    pub value: Option<Datum>,
    #[prost(enumeration = "MetricType", optional, tag = "5")]
    pub metric_type: Option<i32>,
    #[prost(message, repeated, tag = "6")]
    pub dimensions: Vec<Dimension>,
    #[prost(message, repeated, tag = "7")]
    pub properties: Vec<Property>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct DataPointUploadMessage {
    #[prost(message, repeated, tag = "1")]
    pub datapoints: Vec<DataPoint>,
}
