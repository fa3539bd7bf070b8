use tracing::{error, info, info_span, Instrument};

use super::runtime::{AgentRuntime, RunContext};
use super::tools::SurveyTools;
use crate::domain::SurveyContext;

/// Prefix of the text returned when a request could not be handled
pub const ERROR_MARKER: &str = "Error handling request";

/// Handle a user's survey-related request
///
/// Binds the tools and context to this request only, runs the agents
/// starting from triage, and returns the final answer. Failures are turned
/// into a `"Error handling request: ..."` string instead of being returned
/// as errors.
pub async fn handle_survey_request(
    runtime: &dyn AgentRuntime,
    user_input: &str,
    tools: SurveyTools,
    context: SurveyContext,
) -> String {
    let span = info_span!(
        "survey_management_workflow",
        session_id = %context.session_id,
        user_id = context.user_id.as_deref().unwrap_or("anonymous"),
    );
    let ctx = RunContext::new(tools, context);

    async {
        match runtime.run(user_input, &ctx).await {
            Ok(output) => {
                info!(
                    agent = %output.agent,
                    events = output.events.len(),
                    "Survey request handled"
                );
                output.final_output
            }
            Err(e) => {
                error!(error = %e, "Survey request failed");
                format!("{}: {}", ERROR_MARKER, e)
            }
        }
    }
    .instrument(span)
    .await
}
