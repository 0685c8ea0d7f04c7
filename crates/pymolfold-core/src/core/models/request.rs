use serde::Serialize;
use serde_json::Value;

/// JSON payload for one prediction call.
///
/// The client treats the payload as opaque; backend builders in
/// [`crate::predictors`] decide its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest(Value);

impl PredictionRequest {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn from_serializable<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(payload).map(Self)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for PredictionRequest {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
