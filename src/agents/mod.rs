// Agent system modules
//
// This module contains the agents that turn natural-language survey
// requests into survey and question operations.

pub mod errors;
pub mod events;
pub mod graph;
pub mod handler;
pub mod messages;
pub mod prompts;
pub mod runtime;
pub mod testing;
pub mod tools;
pub mod types;

// Re-export main types
pub use errors::{AgentError, AgentResult};
pub use graph::{AgentGraph, AgentRole};
pub use handler::{handle_survey_request, ERROR_MARKER};
pub use runtime::{AgentRuntime, LanguageModel, RunContext, Runner};
pub use tools::{SurveyTools, ToolName};
pub use types::{QuestionParserOutput, SurveyParserOutput};
