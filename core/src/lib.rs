//! Datapoint model and protobuf wire encoding for the SignalFx datapoint sink.

mod datapoint;
mod encode;
pub mod proto;
pub mod sanitize;
pub mod util_time;

pub use datapoint::{
    Datapoint,
    Dimensions,
    MetricKind,
    Properties,
    PropertyValue,
    Value,
};
pub use encode::{
    Encode,
    EncodeError,
    ProtobufEncoder,
};

#[macro_use]
extern crate tracing;
