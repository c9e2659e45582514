use std::sync::Arc;

use indexmap::IndexMap;

use crate::locale::{BasicNumberFormat, NumberFormatProvider};
use crate::value::Value;

/// Runtime state threaded through `Expression::evaluate`.
///
/// Holds the feature being styled and the formatter provider. Cheap to clone;
/// the provider is shared.
#[derive(Clone)]
pub struct EvaluationContext {
    properties: IndexMap<String, Value>,
    formatter: Arc<dyn NumberFormatProvider>,
}

impl EvaluationContext {
    pub fn new(formatter: Arc<dyn NumberFormatProvider>) -> Self {
        Self { properties: IndexMap::new(), formatter }
    }

    pub fn with_properties(mut self, properties: IndexMap<String, Value>) -> Self {
        self.properties = properties;
        self
    }

    /// Non-object JSON yields an empty property set.
    pub fn with_json_properties(self, json: &serde_json::Value) -> Self {
        match Value::from_json(json) {
            Value::Object(properties) => self.with_properties(properties),
            _ => self.with_properties(IndexMap::new()),
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn formatter(&self) -> &dyn NumberFormatProvider {
        self.formatter.as_ref()
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new(Arc::new(BasicNumberFormat::default()))
    }
}

impl std::fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluationContext")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
