use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::errors::{AgentError, AgentResult};
use super::events::AgentEvent;
use super::graph::{AgentDefinition, AgentGraph, AgentRole, HandoffMode};
use super::messages::{Message, ToolCall};
use super::tools::{SurveyTools, ToolName};
use super::types::OutputSchema;
use crate::domain::SurveyContext;

pub const DEFAULT_MAX_TURNS: usize = 16;

/// A function the model may call, in provider-agnostic form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Everything the model sees for one completion
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub agent: AgentRole,
    pub instructions: String,
    pub messages: Vec<Message>,
    pub functions: Vec<FunctionSpec>,
    pub output_schema: Option<OutputSchema>,
}

/// What the model produced
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    /// A final answer
    Message(String),
    /// One or more tool or hand-off calls
    ToolCalls(Vec<ToolCall>),
}

/// The language model capability the runner drives
///
/// Implementations live in the infrastructure layer; tests use a
/// scripted model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, request: &ModelRequest) -> AgentResult<ModelResponse>;
}

/// Request-scoped dependencies threaded into every tool invocation
#[derive(Clone)]
pub struct RunContext {
    pub tools: SurveyTools,
    pub survey: SurveyContext,
}

impl RunContext {
    pub fn new(tools: SurveyTools, survey: SurveyContext) -> Self {
        Self { tools, survey }
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutput {
    /// Agent that produced the final answer
    pub agent: AgentRole,
    /// Final answer; structured outputs are rendered as compact JSON
    pub final_output: String,
    pub structured: Option<Value>,
    pub events: Vec<AgentEvent>,
}

/// Runs a user request through the agents
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn run(&self, input: &str, ctx: &RunContext) -> AgentResult<RunOutput>;
}

/// Final answer of one agent invocation
struct AgentAnswer {
    agent: AgentRole,
    text: String,
    structured: Option<Value>,
}

type AnswerFuture<'a> = Pin<Box<dyn Future<Output = AgentResult<AgentAnswer>> + Send + 'a>>;

/// Agent loop over a language model
///
/// Starting at the graph's entry agent, the model is asked for a
/// completion until it returns a final answer. Tool calls are executed
/// through the request's `SurveyTools`; failures and calls the agent is not
/// allowed to make are reported back to the model as `{"error": ...}`
/// results. A transfer hand-off switches the active agent and keeps the
/// history; a delegate hand-off runs the target on a fresh history and
/// returns its answer as the call's result.
pub struct Runner {
    model: Arc<dyn LanguageModel>,
    graph: Arc<AgentGraph>,
    max_turns: usize,
}

impl Runner {
    pub fn new(model: Arc<dyn LanguageModel>, graph: Arc<AgentGraph>) -> Self {
        Self {
            model,
            graph,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Limits the number of model calls each agent may make
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    fn functions_for(&self, definition: &AgentDefinition) -> Vec<FunctionSpec> {
        let tools = definition.tools.iter().map(|tool| {
            let def = tool.definition();
            FunctionSpec {
                name: tool.as_str().to_string(),
                description: def["description"].as_str().unwrap_or_default().to_string(),
                parameters: def["parameters"].clone(),
            }
        });

        let handoffs = definition.handoffs.iter().map(|handoff| {
            let parameters = match handoff.mode {
                HandoffMode::Transfer => json!({
                    "type": "object",
                    "properties": {},
                    "required": []
                }),
                HandoffMode::Delegate => json!({
                    "type": "object",
                    "properties": {
                        "input": {
                            "type": "string",
                            "description": "The text the agent should work on."
                        }
                    },
                    "required": ["input"]
                }),
            };
            FunctionSpec {
                name: handoff.target.handoff_tool_name(),
                description: format!("Hand off to the {} agent.", handoff.target),
                parameters,
            }
        });

        tools.chain(handoffs).collect()
    }

    fn run_agent<'a>(
        &'a self,
        role: AgentRole,
        mut messages: Vec<Message>,
        ctx: &'a RunContext,
        events: &'a mut Vec<AgentEvent>,
    ) -> AnswerFuture<'a> {
        Box::pin(async move {
            let mut definition = self.graph.agent(role)?;
            events.push(AgentEvent::AgentStarted { agent: role });
            let mut turns = 0;

            loop {
                if turns >= self.max_turns {
                    return Err(AgentError::MaxTurnsExceeded {
                        agent: definition.role.to_string(),
                        max_turns: self.max_turns,
                    });
                }
                turns += 1;

                let request = ModelRequest {
                    agent: definition.role,
                    instructions: definition.instructions.clone(),
                    messages: messages.clone(),
                    functions: self.functions_for(definition),
                    output_schema: definition.output.schema(),
                };

                let calls = match self.model.complete(&request).await? {
                    ModelResponse::Message(text) => {
                        let structured = definition.output.validate(&text)?;
                        events.push(AgentEvent::Completed {
                            agent: definition.role,
                        });
                        return Ok(AgentAnswer {
                            agent: definition.role,
                            text,
                            structured,
                        });
                    }
                    ModelResponse::ToolCalls(calls) => calls,
                };

                messages.push(Message::Assistant {
                    content: None,
                    tool_calls: calls.clone(),
                });

                let mut transferred_to = None;
                for call in &calls {
                    if transferred_to.is_some() {
                        let result = json!({ "error": "skipped: control was handed off" });
                        messages.push(Message::tool_result(call, &result));
                        continue;
                    }

                    let result = match definition.handoff_for(&call.name) {
                        Some(handoff) if handoff.mode == HandoffMode::Transfer => {
                            info!(from = %definition.role, to = %handoff.target, "Handing off");
                            events.push(AgentEvent::HandedOff {
                                from: definition.role,
                                to: handoff.target,
                            });
                            transferred_to = Some(handoff.target);
                            json!({ "assistant": handoff.target.display_name() })
                        }
                        Some(handoff) => {
                            self.delegate(definition.role, handoff.target, call, ctx, events)
                                .await?
                        }
                        None => self.call_tool(definition, call, ctx, events).await,
                    };

                    messages.push(Message::tool_result(call, &result));
                }

                if let Some(target) = transferred_to {
                    definition = self.graph.agent(target)?;
                    events.push(AgentEvent::AgentStarted { agent: target });
                    turns = 0;
                }
            }
        })
    }

    async fn delegate(
        &self,
        from: AgentRole,
        to: AgentRole,
        call: &ToolCall,
        ctx: &RunContext,
        events: &mut Vec<AgentEvent>,
    ) -> AgentResult<Value> {
        let Some(input) = call.arguments.get("input").and_then(Value::as_str) else {
            return Ok(json!({ "error": format!("{} requires an input string", call.name) }));
        };

        debug!(from = %from, to = %to, "Delegating");
        events.push(AgentEvent::Delegated { from, to });
        let answer = self
            .run_agent(to, vec![Message::user(input)], ctx, events)
            .await?;

        Ok(answer
            .structured
            .unwrap_or_else(|| json!({ "output": answer.text })))
    }

    async fn call_tool(
        &self,
        definition: &AgentDefinition,
        call: &ToolCall,
        ctx: &RunContext,
        events: &mut Vec<AgentEvent>,
    ) -> Value {
        let permitted = call
            .name
            .parse::<ToolName>()
            .map(|tool| definition.can_use(tool))
            .unwrap_or(false);

        let result = if permitted {
            ctx.tools
                .dispatch(&call.name, call.arguments.clone(), &ctx.survey)
                .await
                .map_err(|e| e.to_result())
        } else {
            Err(json!({
                "error": format!("{} is not available to {}", call.name, definition.role)
            }))
        };

        events.push(AgentEvent::ToolCalled {
            agent: definition.role,
            tool: call.name.clone(),
            ok: result.is_ok(),
        });

        match result {
            Ok(value) => {
                debug!(agent = %definition.role, tool = %call.name, "Tool call succeeded");
                value
            }
            Err(error) => {
                warn!(agent = %definition.role, tool = %call.name, error = %error, "Tool call failed");
                error
            }
        }
    }
}

#[async_trait]
impl AgentRuntime for Runner {
    async fn run(&self, input: &str, ctx: &RunContext) -> AgentResult<RunOutput> {
        let mut events = Vec::new();
        let answer = self
            .run_agent(
                self.graph.entry(),
                vec![Message::user(input)],
                ctx,
                &mut events,
            )
            .await?;

        let final_output = match &answer.structured {
            Some(value) => serde_json::to_string(value)?,
            None => answer.text,
        };

        Ok(RunOutput {
            agent: answer.agent,
            final_output,
            structured: answer.structured,
            events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedModel;
    use crate::infrastructure::repositories::InMemorySurveyRepository;

    fn setup(model: &Arc<ScriptedModel>) -> (Runner, RunContext) {
        let graph = Arc::new(AgentGraph::survey_default().unwrap());
        let runner = Runner::new(model.clone(), graph);
        let tools = SurveyTools::new(Arc::new(InMemorySurveyRepository::new()));
        (runner, RunContext::new(tools, SurveyContext::default()))
    }

    #[tokio::test]
    async fn triage_answers_directly() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_call("list_surveys", json!({}));
        model.push_message("There are no surveys yet.");
        let (runner, ctx) = setup(&model);

        let output = runner.run("What surveys do I have?", &ctx).await.unwrap();

        assert_eq!(output.agent, AgentRole::Triage);
        assert_eq!(output.final_output, "There are no surveys yet.");
        assert!(output.events.contains(&AgentEvent::ToolCalled {
            agent: AgentRole::Triage,
            tool: "list_surveys".to_string(),
            ok: true,
        }));

        let requests = model.requests();
        assert_eq!(requests.len(), 2);
        assert!(matches!(
            requests[1].messages.last(),
            Some(Message::Tool { name, .. }) if name == "list_surveys"
        ));
    }

    #[tokio::test]
    async fn transfer_switches_agent_and_keeps_history() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_call("transfer_to_generator", json!({}));
        model.push_tool_call(
            "create_survey",
            json!({"name": "Onboarding", "description": "New hire feedback"}),
        );
        model.push_message("Created the Onboarding survey.");
        let (runner, ctx) = setup(&model);

        let output = runner.run("Make an onboarding survey", &ctx).await.unwrap();

        assert_eq!(output.agent, AgentRole::Generator);
        assert!(output.events.contains(&AgentEvent::HandedOff {
            from: AgentRole::Triage,
            to: AgentRole::Generator,
        }));
        let surveys = ctx.tools.list_surveys(&ctx.survey).await.unwrap();
        assert_eq!(surveys[0].name, "Onboarding");

        let requests = model.requests();
        assert_eq!(requests[1].agent, AgentRole::Generator);
        assert_eq!(requests[1].messages[0], Message::user("Make an onboarding survey"));
        assert!(requests[1]
            .functions
            .iter()
            .any(|f| f.name == "create_survey"));
    }

    #[tokio::test]
    async fn forbidden_tool_is_reported_back() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_call("delete_question", json!({}));
        model.push_message("I can't do that from here.");
        let (runner, ctx) = setup(&model);

        let output = runner.run("delete everything", &ctx).await.unwrap();

        assert!(output.events.contains(&AgentEvent::ToolCalled {
            agent: AgentRole::Triage,
            tool: "delete_question".to_string(),
            ok: false,
        }));
        let requests = model.requests();
        match requests[1].messages.last() {
            Some(Message::Tool { content, .. }) => assert!(content.contains("not available")),
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn handoff_outside_the_graph_is_reported_back() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_call("transfer_to_generator", json!({}));
        model.push_tool_call("transfer_to_editor", json!({}));
        model.push_message("I can only create surveys.");
        let (runner, ctx) = setup(&model);

        let output = runner.run("make a survey, then edit it", &ctx).await.unwrap();

        assert_eq!(output.agent, AgentRole::Generator);
        assert!(!output.events.iter().any(|e| matches!(
            e,
            AgentEvent::HandedOff {
                to: AgentRole::Editor,
                ..
            }
        )));
        assert!(output.events.contains(&AgentEvent::ToolCalled {
            agent: AgentRole::Generator,
            tool: "transfer_to_editor".to_string(),
            ok: false,
        }));

        let requests = model.requests();
        assert_eq!(requests[2].agent, AgentRole::Generator);
        match requests[2].messages.last() {
            Some(Message::Tool { content, .. }) => assert_eq!(
                content,
                &json!({"error": "transfer_to_editor is not available to Survey Generator"})
                    .to_string()
            ),
            other => panic!("expected tool result, got {:?}", other),
        }
    }

    /// Reads the survey id returned by the last create_survey call
    fn created_survey_id(request: &ModelRequest) -> String {
        request
            .messages
            .iter()
            .rev()
            .find_map(|m| match m {
                Message::Tool { name, content, .. } if name == "create_survey" => {
                    serde_json::from_str::<Value>(content).ok()
                }
                _ => None,
            })
            .and_then(|v| v["survey_id"].as_str().map(str::to_string))
            .expect("create_survey result in history")
    }

    #[tokio::test]
    async fn parser_delegates_to_question_parser() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_call("transfer_to_survey_parser", json!({}));
        model.push_tool_call(
            "create_survey",
            json!({"name": "Customer Satisfaction", "description": "Q3 feedback"}),
        );
        model.push_tool_call(
            "transfer_to_question_parser",
            json!({"input": "Did you find our website easy to navigate? (Yes / No)"}),
        );
        model.push_message(
            r#"{"text": "Did you find our website easy to navigate?", "question_type": "RADIO", "options": ["Yes", "No"], "question_options": {"required": true}}"#,
        );
        model.push_with(|request| {
            let parsed = match request.messages.last() {
                Some(Message::Tool { content, .. }) => {
                    serde_json::from_str::<Value>(content).unwrap_or_default()
                }
                _ => Value::Null,
            };
            Ok(ModelResponse::ToolCalls(vec![ToolCall::new(
                "call_add",
                "add_question",
                json!({
                    "survey_id": created_survey_id(request),
                    "text": parsed["text"],
                    "question_type": parsed["question_type"],
                    "options": parsed["options"],
                    "question_options": parsed["question_options"]
                }),
            )]))
        });
        model.push_with(|request| {
            Ok(ModelResponse::Message(
                json!({
                    "survey_id": created_survey_id(request),
                    "name": "Customer Satisfaction",
                    "description": "Q3 feedback",
                    "question_count": 1
                })
                .to_string(),
            ))
        });
        let (runner, ctx) = setup(&model);

        let output = runner
            .run(
                "Customer Satisfaction\n1. Did you find our website easy to navigate? (Yes / No)",
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(output.agent, AgentRole::SurveyParser);
        assert_eq!(output.structured.unwrap()["question_count"], 1);
        assert!(output.events.contains(&AgentEvent::Delegated {
            from: AgentRole::SurveyParser,
            to: AgentRole::QuestionParser,
        }));

        let requests = model.requests();
        let delegated = requests
            .iter()
            .find(|r| r.agent == AgentRole::QuestionParser)
            .unwrap();
        assert_eq!(delegated.messages.len(), 1);
        assert!(delegated.output_schema.is_some());

        let surveys = ctx.tools.list_surveys(&ctx.survey).await.unwrap();
        assert_eq!(surveys[0].question_count, 1);
        let survey = ctx.tools.survey(surveys[0].id).await.unwrap();
        assert_eq!(survey.questions()[0].options().unwrap(), ["Yes", "No"]);
    }

    #[tokio::test]
    async fn invalid_structured_output_fails_the_run() {
        let model = Arc::new(ScriptedModel::new());
        model.push_tool_call("transfer_to_survey_parser", json!({}));
        model.push_message("Done, I parsed it.");
        let (runner, ctx) = setup(&model);

        let err = runner.run("parse this", &ctx).await.unwrap_err();

        assert!(matches!(err, AgentError::InvalidOutput { .. }));
    }

    #[tokio::test]
    async fn turn_limit_is_enforced() {
        let model = Arc::new(ScriptedModel::new());
        for _ in 0..3 {
            model.push_tool_call("list_surveys", json!({}));
        }
        let (runner, ctx) = setup(&model);
        let runner = runner.with_max_turns(2);

        let err = runner.run("loop", &ctx).await.unwrap_err();

        assert!(matches!(err, AgentError::MaxTurnsExceeded { max_turns: 2, .. }));
    }

    #[tokio::test]
    async fn calls_after_a_transfer_are_skipped() {
        let model = Arc::new(ScriptedModel::new());
        model.push_response(ModelResponse::ToolCalls(vec![
            ToolCall::new("call_1", "transfer_to_editor", json!({})),
            ToolCall::new("call_2", "list_surveys", json!({})),
        ]));
        model.push_message("Which survey should I edit?");
        let (runner, ctx) = setup(&model);

        let output = runner.run("edit my survey", &ctx).await.unwrap();

        assert_eq!(output.agent, AgentRole::Editor);
        let requests = model.requests();
        match requests[1].messages.last() {
            Some(Message::Tool { call_id, content, .. }) => {
                assert_eq!(call_id, "call_2");
                assert!(content.contains("skipped"));
            }
            other => panic!("expected skipped tool result, got {:?}", other),
        }
    }
}
