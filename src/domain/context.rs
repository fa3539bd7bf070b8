use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Ambient information attached to a single survey request
///
/// Opaque to the tools: it is carried alongside them and recorded in
/// tracing spans, never interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyContext {
    pub session_id: Uuid,
    pub user_id: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl SurveyContext {
    /// Creates a context for a fresh session
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

impl Default for SurveyContext {
    fn default() -> Self {
        Self::new(None)
    }
}
