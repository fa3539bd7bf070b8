use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::errors::{AgentError, AgentResult};
use super::prompts::{library, PromptTemplate};
use super::tools::ToolName;
use super::types::OutputType;
use crate::domain::survey::question_types_info;

/// The agent roles taking part in a survey request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Triage,
    Generator,
    Editor,
    SurveyParser,
    QuestionParser,
}

impl AgentRole {
    /// Human-readable name shown to the model
    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::Triage => "Survey Triage",
            AgentRole::Generator => "Survey Generator",
            AgentRole::Editor => "Survey Editor",
            AgentRole::SurveyParser => "Survey Parser",
            AgentRole::QuestionParser => "Question Parser",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Triage => "triage",
            AgentRole::Generator => "generator",
            AgentRole::Editor => "editor",
            AgentRole::SurveyParser => "survey_parser",
            AgentRole::QuestionParser => "question_parser",
        }
    }

    /// Name of the function the model calls to hand off to this role
    pub fn handoff_tool_name(&self) -> String {
        format!("transfer_to_{}", self.as_str())
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How control moves along a hand-off edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffMode {
    /// Control moves to the target for the rest of the run
    Transfer,
    /// The target runs on a given input and its answer comes back as a
    /// tool result; control then returns to the caller
    Delegate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handoff {
    pub target: AgentRole,
    pub mode: HandoffMode,
}

impl Handoff {
    pub fn transfer(target: AgentRole) -> Self {
        Self {
            target,
            mode: HandoffMode::Transfer,
        }
    }

    pub fn delegate(target: AgentRole) -> Self {
        Self {
            target,
            mode: HandoffMode::Delegate,
        }
    }
}

/// A role bound to its instructions, tools, hand-offs and output shape
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub role: AgentRole,
    pub instructions: String,
    pub tools: Vec<ToolName>,
    pub handoffs: Vec<Handoff>,
    pub output: OutputType,
}

impl AgentDefinition {
    pub fn new(role: AgentRole, instructions: impl Into<String>) -> Self {
        Self {
            role,
            instructions: instructions.into(),
            tools: Vec::new(),
            handoffs: Vec::new(),
            output: OutputType::Text,
        }
    }

    pub fn with_tools(mut self, tools: &[ToolName]) -> Self {
        self.tools.extend_from_slice(tools);
        self
    }

    pub fn with_handoff(mut self, handoff: Handoff) -> Self {
        self.handoffs.push(handoff);
        self
    }

    pub fn with_output(mut self, output: OutputType) -> Self {
        self.output = output;
        self
    }

    pub fn can_use(&self, tool: ToolName) -> bool {
        self.tools.contains(&tool)
    }

    /// Finds the hand-off matching a `transfer_to_*` function name
    pub fn handoff_for(&self, function_name: &str) -> Option<Handoff> {
        self.handoffs
            .iter()
            .copied()
            .find(|h| h.target.handoff_tool_name() == function_name)
    }
}

/// Directed graph of agents and their permitted hand-offs
///
/// # Invariants
/// - Every role appears at most once and the entry role is defined
/// - Hand-off targets are defined, never the agent itself, and acyclic
/// - Every agent is reachable from the entry
/// - No agent lists the same tool twice
#[derive(Debug, Clone)]
pub struct AgentGraph {
    entry: AgentRole,
    agents: HashMap<AgentRole, AgentDefinition>,
}

impl AgentGraph {
    /// Builds and validates a graph
    pub fn new(entry: AgentRole, definitions: Vec<AgentDefinition>) -> AgentResult<Self> {
        let mut agents = HashMap::new();
        for definition in definitions {
            let role = definition.role;
            if agents.insert(role, definition).is_some() {
                return Err(AgentError::InvalidGraph(format!(
                    "{} is defined more than once",
                    role
                )));
            }
        }

        let graph = Self { entry, agents };
        graph.validate()?;
        Ok(graph)
    }

    /// The triage → {generator, editor, parser} → question parser graph
    pub fn survey_default() -> AgentResult<Self> {
        let mut variables = HashMap::new();
        variables.insert("question_types".to_string(), question_types_info());
        let render = |template: PromptTemplate| template.render(&variables);

        Self::new(
            AgentRole::Triage,
            vec![
                AgentDefinition::new(AgentRole::Triage, render(library::survey_triage()))
                    .with_tools(&[ToolName::ListSurveys])
                    .with_handoff(Handoff::transfer(AgentRole::Generator))
                    .with_handoff(Handoff::transfer(AgentRole::Editor))
                    .with_handoff(Handoff::transfer(AgentRole::SurveyParser)),
                AgentDefinition::new(AgentRole::Generator, render(library::survey_generator()))
                    .with_tools(&[ToolName::CreateSurvey, ToolName::AddQuestion]),
                AgentDefinition::new(AgentRole::Editor, render(library::survey_editor()))
                    .with_tools(&[
                        ToolName::ListSurveys,
                        ToolName::EditQuestion,
                        ToolName::DeleteQuestion,
                    ]),
                AgentDefinition::new(AgentRole::SurveyParser, render(library::survey_parser()))
                    .with_tools(&[ToolName::CreateSurvey, ToolName::AddQuestion])
                    .with_handoff(Handoff::delegate(AgentRole::QuestionParser))
                    .with_output(OutputType::SurveyParser),
                AgentDefinition::new(
                    AgentRole::QuestionParser,
                    render(library::question_parser()),
                )
                .with_output(OutputType::QuestionParser),
            ],
        )
    }

    pub fn validate(&self) -> AgentResult<()> {
        if !self.agents.contains_key(&self.entry) {
            return Err(AgentError::InvalidGraph(format!(
                "entry agent {} is not defined",
                self.entry
            )));
        }

        for definition in self.agents.values() {
            let mut seen = HashSet::new();
            if let Some(dup) = definition.tools.iter().find(|t| !seen.insert(**t)) {
                return Err(AgentError::InvalidGraph(format!(
                    "{} lists tool {} twice",
                    definition.role, dup
                )));
            }

            let mut targets = HashSet::new();
            for handoff in &definition.handoffs {
                if handoff.target == definition.role {
                    return Err(AgentError::InvalidGraph(format!(
                        "{} hands off to itself",
                        definition.role
                    )));
                }
                if !self.agents.contains_key(&handoff.target) {
                    return Err(AgentError::InvalidGraph(format!(
                        "{} hands off to undefined agent {}",
                        definition.role, handoff.target
                    )));
                }
                if !targets.insert(handoff.target) {
                    return Err(AgentError::InvalidGraph(format!(
                        "{} lists hand-off to {} twice",
                        definition.role, handoff.target
                    )));
                }
            }
        }

        self.check_acyclic()?;
        self.check_reachable()
    }

    fn check_acyclic(&self) -> AgentResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            graph: &AgentGraph,
            role: AgentRole,
            marks: &mut HashMap<AgentRole, Mark>,
        ) -> AgentResult<()> {
            match marks.get(&role) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    return Err(AgentError::InvalidGraph(format!(
                        "hand-off cycle through {}",
                        role
                    )))
                }
                None => {}
            }

            marks.insert(role, Mark::Visiting);
            if let Some(definition) = graph.agents.get(&role) {
                for handoff in &definition.handoffs {
                    visit(graph, handoff.target, marks)?;
                }
            }
            marks.insert(role, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        for role in self.agents.keys() {
            visit(self, *role, &mut marks)?;
        }
        Ok(())
    }

    fn check_reachable(&self) -> AgentResult<()> {
        let mut reached = HashSet::from([self.entry]);
        let mut stack = vec![self.entry];
        while let Some(role) = stack.pop() {
            if let Some(definition) = self.agents.get(&role) {
                for handoff in &definition.handoffs {
                    if reached.insert(handoff.target) {
                        stack.push(handoff.target);
                    }
                }
            }
        }

        match self.agents.keys().find(|role| !reached.contains(*role)) {
            Some(role) => Err(AgentError::InvalidGraph(format!(
                "{} is not reachable from {}",
                role, self.entry
            ))),
            None => Ok(()),
        }
    }

    pub fn entry(&self) -> AgentRole {
        self.entry
    }

    pub fn agent(&self, role: AgentRole) -> AgentResult<&AgentDefinition> {
        self.agents
            .get(&role)
            .ok_or_else(|| AgentError::AgentNotFound(role.to_string()))
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
