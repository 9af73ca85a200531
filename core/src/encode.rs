use crate::{
    proto::{
        DataPoint,
        DataPointUploadMessage,
    },
    Datapoint,
};
use bytes::Bytes;
use prost::Message as _;

/// A hard encoding failure. Aborts the whole submission.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("datapoint has an empty metric name")]
    EmptyMetricName,

    #[error("unknown metric type {0}")]
    UnknownMetricKind(i32),

    #[error("cannot encode upload message: {0}")]
    Marshal(#[from] prost::EncodeError),

    /// Raised by custom [`Encode`] implementations.
    #[error("{0}")]
    Custom(String),
}

/// Turns a batch of datapoints into a request body.
pub trait Encode {
    fn encode(&self, points: &[Datapoint]) -> Result<Bytes, EncodeError>;
}

/// Encodes datapoints as a protobuf `DataPointUploadMessage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufEncoder;

impl ProtobufEncoder {
    pub fn upload_message(points: &[Datapoint]) -> Result<DataPointUploadMessage, EncodeError> {
        let datapoints = points.iter().map(DataPoint::try_from).collect::<Result<_, _>>()?;
        Ok(DataPointUploadMessage { datapoints })
    }
}

impl Encode for ProtobufEncoder {
    fn encode(&self, points: &[Datapoint]) -> Result<Bytes, EncodeError> {
        let message = Self::upload_message(points)?;
        let mut buf = Vec::with_capacity(message.encoded_len());
        message.encode(&mut buf)?;
        Ok(Bytes::from(buf))
    }
}

impl<F> Encode for F
where
    F: Fn(&[Datapoint]) -> Result<Bytes, EncodeError>,
{
    fn encode(&self, points: &[Datapoint]) -> Result<Bytes, EncodeError> {
        self(points)
    }
}
