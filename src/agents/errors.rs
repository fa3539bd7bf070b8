use thiserror::Error;

/// Errors that can occur in the agent system
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM API error: {0}")]
    LlmError(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Structured output does not match {schema}: {reason}")]
    InvalidOutput { schema: String, reason: String },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Invalid agent graph: {0}")]
    InvalidGraph(String),

    #[error("Agent {agent} exceeded {max_turns} turns without a final answer")]
    MaxTurnsExceeded { agent: String, max_turns: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type AgentResult<T> = Result<T, AgentError>;
