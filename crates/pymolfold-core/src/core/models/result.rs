use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One entry of a result's `structures` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    #[serde(default)]
    pub structure: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// The body a prediction service answered with.
///
/// Accessors only read; the wrapped JSON is handed back exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult(Value);

impl PredictionResult {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    /// Wraps raw structure text the way the JSON backends shape their answers.
    pub fn from_structure(structure: impl Into<String>, source: &str) -> Self {
        Self(json!({
            "structures": [{ "structure": structure.into(), "source": source }],
            "confidence_scores": [Value::Null],
        }))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }

    /// Records whose `structure` field is a string; malformed entries are skipped.
    pub fn structures(&self) -> Vec<StructureRecord> {
        self.0
            .get("structures")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter(|item| item.get("structure").is_some_and(Value::is_string))
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn confidence_scores(&self) -> Vec<f64> {
        self.number_array("confidence_scores")
    }

    pub fn complex_plddt(&self, index: usize) -> Option<f64> {
        self.0
            .get("complex_plddt_scores")?
            .as_array()?
            .get(index)?
            .as_f64()
    }

    /// First `affinity_pic50` value reported for the given chain.
    pub fn affinity_pic50(&self, chain_id: &str) -> Option<f64> {
        self.0
            .get("affinities")?
            .get(chain_id)?
            .get("affinity_pic50")?
            .as_array()?
            .first()?
            .as_f64()
    }

    fn number_array(&self, key: &str) -> Vec<f64> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default()
    }
}

impl From<Value> for PredictionResult {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structures_skips_entries_without_text() {
        let result = PredictionResult::new(json!({
            "structures": [
                {"structure": "ATOM", "source": "model.pdb"},
                {"source": "missing.pdb"},
                {"structure": 12},
                {"structure": "data_x", "format": "mmcif"}
            ]
        }));
        let records = result.structures();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source.as_deref(), Some("model.pdb"));
        assert_eq!(records[1].format.as_deref(), Some("mmcif"));
        assert!(records[1].source.is_none());
    }

    #[test]
    fn structures_is_empty_when_field_absent() {
        let result = PredictionResult::new(json!({"other": 1}));
        assert!(result.structures().is_empty());
    }

    #[test]
    fn from_structure_builds_single_record() {
        let result = PredictionResult::from_structure("ATOM 1", "esmfold");
        let records = result.structures();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].structure, "ATOM 1");
        assert_eq!(records[0].source.as_deref(), Some("esmfold"));
        assert!(result.confidence_scores().is_empty());
    }

    #[test]
    fn boltz_extras_are_readable() {
        let result = PredictionResult::new(json!({
            "confidence_scores": [0.9, 0.8],
            "complex_plddt_scores": [0.71, 0.65],
            "affinities": {"B": {"affinity_pic50": [6.2, 5.9]}}
        }));
        assert_eq!(result.confidence_scores(), vec![0.9, 0.8]);
        assert_eq!(result.complex_plddt(1), Some(0.65));
        assert_eq!(result.complex_plddt(2), None);
        assert_eq!(result.affinity_pic50("B"), Some(6.2));
        assert_eq!(result.affinity_pic50("C"), None);
    }

    #[test]
    fn into_json_returns_body_unchanged() {
        let body = json!({"structures": [{"structure": "x", "nested": {"k": [1, 2]}}]});
        let result = PredictionResult::new(body.clone());
        let _ = result.structures();
        assert_eq!(result.into_json(), body);
    }
}
