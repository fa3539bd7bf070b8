use std::sync::Arc;

use crate::agents::runtime::AgentRuntime;
use crate::agents::tools::SurveyTools;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub tools: SurveyTools,
    pub runtime: Arc<dyn AgentRuntime>,
}

impl AppState {
    pub fn new(tools: SurveyTools, runtime: Arc<dyn AgentRuntime>) -> Self {
        Self { tools, runtime }
    }
}
