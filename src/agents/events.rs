// Agent run events
//
// Recorded by the runner in the order they happen and returned with the
// run output, so callers can see which agents and tools were involved.

use serde::Serialize;

use super::graph::AgentRole;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AgentEvent {
    AgentStarted {
        agent: AgentRole,
    },
    ToolCalled {
        agent: AgentRole,
        tool: String,
        ok: bool,
    },
    HandedOff {
        from: AgentRole,
        to: AgentRole,
    },
    Delegated {
        from: AgentRole,
        to: AgentRole,
    },
    Completed {
        agent: AgentRole,
    },
}
