use super::{
    DataPoint,
    Datum,
    Dimension,
    MetricType,
    Property,
};
use crate::{
    sanitize::{
        sanitize_dimensions,
        sanitize_key,
    },
    util_time,
    Datapoint,
    EncodeError,
    Properties,
    PropertyValue,
    Value,
};

impl From<&Value> for Datum {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(v) => Datum {
                int_value: Some(*v),
                ..Default::default()
            },
            Value::Float(v) => Datum {
                double_value: Some(*v),
                ..Default::default()
            },
            Value::Str(v) => Datum {
                str_value: Some(v.clone()),
                ..Default::default()
            },
        }
    }
}

impl From<PropertyValue> for super::PropertyValue {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Str(v) => super::PropertyValue {
                str_value: Some(v),
                ..Default::default()
            },
            PropertyValue::Int(v) => super::PropertyValue {
                int_value: Some(v),
                ..Default::default()
            },
            PropertyValue::Bool(v) => super::PropertyValue {
                bool_value: Some(v),
                ..Default::default()
            },
            PropertyValue::Float(v) => super::PropertyValue {
                double_value: Some(v),
                ..Default::default()
            },
        }
    }
}

fn encode_properties(properties: &Properties) -> Vec<Property> {
    let mut encoded = Vec::with_capacity(properties.len());
    for (key, value) in properties {
        if key.is_empty() {
            continue;
        }
        let Some(value) = PropertyValue::from_json(value) else {
            trace!(%key, ?value, "skipping property with unsupported value type");
            continue;
        };
        let key = sanitize_key(key).into_owned();
        // Keys that collide after sanitizing: the later one replaces the earlier.
        encoded.retain(|p: &Property| p.key.as_deref() != Some(key.as_str()));
        encoded.push(Property {
            key: Some(key),
            value: Some(value.into()),
        });
    }
    encoded
}

impl TryFrom<&Datapoint> for DataPoint {
    type Error = EncodeError;

    fn try_from(point: &Datapoint) -> Result<Self, Self::Error> {
        if point.metric.is_empty() {
            return Err(EncodeError::EmptyMetricName);
        }

        Ok(DataPoint {
            source: None,
            metric: Some(point.metric.clone()),
            timestamp: point.timestamp.as_ref().map(util_time::unix_millis),
            value: Some(Datum::from(&point.value)),
            metric_type: Some(MetricType::from(point.kind) as i32),
            dimensions: sanitize_dimensions(&point.dimensions)
                .into_iter()
                .map(|(key, value)| Dimension {
                    key: Some(key),
                    value: Some(value),
                })
                .collect(),
            properties: encode_properties(&point.properties),
        })
    }
}
