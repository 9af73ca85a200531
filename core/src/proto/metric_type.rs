use super::MetricType;
use crate::MetricKind;

impl From<MetricKind> for MetricType {
    fn from(value: MetricKind) -> Self {
        match value {
            MetricKind::Gauge | MetricKind::Rate => MetricType::Gauge,
            MetricKind::Counter => MetricType::Counter,
            MetricKind::Enum => MetricType::Enum,
            MetricKind::CumulativeCounter => MetricType::CumulativeCounter,
        }
    }
}

impl From<MetricType> for MetricKind {
    fn from(value: MetricType) -> Self {
        match value {
            MetricType::Gauge => MetricKind::Gauge,
            MetricType::Counter => MetricKind::Counter,
            MetricType::Enum => MetricKind::Enum,
            MetricType::CumulativeCounter => MetricKind::CumulativeCounter,
        }
    }
}
