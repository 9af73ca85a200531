use crate::EncodeError;
use chrono::{
    DateTime,
    Utc,
};
use std::{
    collections::BTreeMap,
    fmt,
};

// These types are the "public" interface. The protobuf types in `proto` mirror
// the wire schema field by field and are full of `Option`-wrapped proto2
// fields. To simplify, we provide these representations and convert on encode.

/// Dimension tags attached to a datapoint.
pub type Dimensions = BTreeMap<String, String>;

/// Properties attached to a datapoint. Values keep their runtime JSON type so
/// that unsupported ones can be skipped at encode time.
pub type Properties = BTreeMap<String, serde_json::Value>;

/// The metric kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MetricKind {
    /// An instantaneous measurement that can go up and down, like memory
    /// usage or the number of open connections.
    Gauge,
    /// A count of occurrences since the last report. The ingest service sums
    /// reported values.
    Counter,
    /// A value drawn from a fixed set of states.
    Enum,
    /// A monotonically increasing total that is only reset on restart.
    CumulativeCounter,
    /// A pre-computed rate. Sent as a gauge, the wire schema has no rate type.
    Rate,
}

impl TryFrom<i32> for MetricKind {
    type Error = EncodeError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MetricKind::Gauge),
            1 => Ok(MetricKind::Counter),
            2 => Ok(MetricKind::Enum),
            3 => Ok(MetricKind::CumulativeCounter),
            4 => Ok(MetricKind::Rate),
            other => Err(EncodeError::UnknownMetricKind(other)),
        }
    }
}

/// The value of a datapoint.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_value_from_lossless {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_value_from_lossless!(Int: i8, i16, i32, i64, u8, u16, u32);
impl_value_from_lossless!(Float: f32, f64);

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::Int(value as i64)
    }
}

/// Values above `i64::MAX` do not fit the integer slot. They are sent as a
/// double instead of wrapping around to a negative number.
impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Float(value as f64),
        }
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

/// A property value as it goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

impl PropertyValue {
    /// Map a JSON value onto a wire property. Returns `None` for null, arrays
    /// and objects, which have no wire representation.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value as Json;
        match value {
            Json::String(s) => Some(PropertyValue::Str(s.clone())),
            Json::Bool(b) => Some(PropertyValue::Bool(*b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Some(PropertyValue::Int(i)),
                None => n.as_f64().map(PropertyValue::Float),
            },
            Json::Null | Json::Array(_) | Json::Object(_) => None,
        }
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// A single metric observation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Datapoint {
    pub metric: String,
    pub dimensions: Dimensions,
    pub value: Value,
    pub kind: MetricKind,
    /// When unset the ingest service assigns the time of arrival.
    pub timestamp: Option<DateTime<Utc>>,
    pub properties: Properties,
}

impl Datapoint {
    pub fn new(
        metric: impl Into<String>,
        dimensions: Dimensions,
        value: impl Into<Value>,
        kind: MetricKind,
    ) -> Self {
        Self {
            metric: metric.into(),
            dimensions,
            value: value.into(),
            kind,
            timestamp: None,
            properties: Properties::new(),
        }
    }

    /// An integer gauge.
    pub fn gauge(metric: impl Into<String>, dimensions: Dimensions, value: i64) -> Self {
        Self::new(metric, dimensions, value, MetricKind::Gauge)
    }

    /// A floating point gauge.
    pub fn gauge_f(metric: impl Into<String>, dimensions: Dimensions, value: f64) -> Self {
        Self::new(metric, dimensions, value, MetricKind::Gauge)
    }

    /// A delta counter.
    pub fn counter(metric: impl Into<String>, dimensions: Dimensions, value: i64) -> Self {
        Self::new(metric, dimensions, value, MetricKind::Counter)
    }

    /// An integer cumulative counter.
    pub fn cumulative(metric: impl Into<String>, dimensions: Dimensions, value: i64) -> Self {
        Self::new(metric, dimensions, value, MetricKind::CumulativeCounter)
    }

    /// A floating point cumulative counter.
    pub fn cumulative_f(metric: impl Into<String>, dimensions: Dimensions, value: f64) -> Self {
        Self::new(metric, dimensions, value, MetricKind::CumulativeCounter)
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.set_property(key, value);
        self
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.properties.insert(key.into(), value.into());
    }
}
