// Test utilities for the agent runtime, including a scripted language model.
// Used to drive the runner without calling a real LLM API.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::errors::{AgentError, AgentResult};
use super::messages::ToolCall;
use super::runtime::{LanguageModel, ModelRequest, ModelResponse};

type Step = Box<dyn FnOnce(&ModelRequest) -> AgentResult<ModelResponse> + Send>;

/// A language model that replays queued responses in order
///
/// Every request is recorded so tests can inspect what the runner sent.
/// Once the queue is empty, further calls fail with `LlmError`.
#[derive(Default)]
pub struct ScriptedModel {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<ModelRequest>>,
    next_call_id: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response computed from the request it answers
    pub fn push_with<F>(&self, step: F)
    where
        F: FnOnce(&ModelRequest) -> AgentResult<ModelResponse> + Send + 'static,
    {
        self.lock_steps().push_back(Box::new(step));
    }

    pub fn push_response(&self, response: ModelResponse) {
        self.push_with(move |_| Ok(response));
    }

    /// Queue a final answer
    pub fn push_message(&self, text: impl Into<String>) {
        self.push_response(ModelResponse::Message(text.into()));
    }

    /// Queue a single tool or hand-off call
    pub fn push_tool_call(&self, name: &str, arguments: Value) {
        let id = format!("call_{}", self.next_call_id.fetch_add(1, Ordering::Relaxed));
        self.push_response(ModelResponse::ToolCalls(vec![ToolCall::new(
            id, name, arguments,
        )]));
    }

    /// Queue a provider failure
    pub fn push_error(&self, message: &str) {
        let message = message.to_string();
        self.push_with(move |_| Err(AgentError::LlmError(message)));
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn lock_steps(&self) -> std::sync::MutexGuard<'_, VecDeque<Step>> {
        self.steps.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &ModelRequest) -> AgentResult<ModelResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let step = self.lock_steps().pop_front();
        match step {
            Some(step) => step(request),
            None => Err(AgentError::LlmError(
                "scripted model has no responses left".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::graph::AgentRole;
    use serde_json::json;

    fn request() -> ModelRequest {
        ModelRequest {
            agent: AgentRole::Triage,
            instructions: String::new(),
            messages: Vec::new(),
            functions: Vec::new(),
            output_schema: None,
        }
    }

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let model = ScriptedModel::new();
        model.push_tool_call("list_surveys", json!({}));
        model.push_message("done");

        assert!(matches!(
            model.complete(&request()).await.unwrap(),
            ModelResponse::ToolCalls(calls) if calls[0].name == "list_surveys"
        ));
        assert_eq!(
            model.complete(&request()).await.unwrap(),
            ModelResponse::Message("done".to_string())
        );
        assert!(matches!(
            model.complete(&request()).await,
            Err(AgentError::LlmError(_))
        ));
        assert_eq!(model.requests().len(), 3);
    }

    #[tokio::test]
    async fn tool_call_ids_are_unique() {
        let model = ScriptedModel::new();
        model.push_tool_call("a", json!({}));
        model.push_tool_call("b", json!({}));

        let ids: Vec<String> = [
            model.complete(&request()).await.unwrap(),
            model.complete(&request()).await.unwrap(),
        ]
        .into_iter()
        .map(|r| match r {
            ModelResponse::ToolCalls(calls) => calls[0].id.clone(),
            ModelResponse::Message(_) => String::new(),
        })
        .collect();

        assert_ne!(ids[0], ids[1]);
    }
}
