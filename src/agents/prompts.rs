// Prompt templates for the survey agents
//
// Each agent's instructions are a template; `{{question_types}}` is replaced
// with the question type catalogue when the agent graph is built.

use std::collections::HashMap;

/// Prompt template structure
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub version: String,
    pub system: String,
}

impl PromptTemplate {
    /// Render the system template, replacing `{{key}}` with its value
    ///
    /// Placeholders without a value are left as they are.
    pub fn render(&self, variables: &HashMap<String, String>) -> String {
        let mut rendered = String::with_capacity(self.system.len());
        let mut rest = self.system.as_str();

        while let Some(start) = rest.find("{{") {
            rendered.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match variables.get(key) {
                        Some(value) => rendered.push_str(value),
                        None => rendered.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    rendered.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

pub mod library {
    use super::PromptTemplate;

    pub fn survey_triage() -> PromptTemplate {
        PromptTemplate {
            name: "survey_triage".to_string(),
            version: "1.0.0".to_string(),
            system: "You are the main coordinator for survey operations.\n\
                     Work out what the user wants and hand the request to the right agent:\n\
                     - Survey Generator: the user wants a new survey built from scratch.\n\
                     - Survey Editor: the user wants to change an existing survey.\n\
                     - Survey Parser: the user pasted a complete survey with several questions as text.\n\
                     Answer simple listing requests yourself with list_surveys, and call \
                     list_surveys before handing off to the editor so the right survey is used."
                .to_string(),
        }
    }

    pub fn survey_generator() -> PromptTemplate {
        PromptTemplate {
            name: "survey_generator".to_string(),
            version: "1.0.0".to_string(),
            system: "You build new surveys from the user's requirements.\n\
                     1. Settle on a survey name and description, asking if they are unclear.\n\
                     2. Create the survey with create_survey.\n\
                     3. Design questions that fit the survey's purpose and add each one with \
                     add_question, choosing the question type carefully.\n\
                     4. Finish with a short summary of what was created.\n\n\
                     {{question_types}}"
                .to_string(),
        }
    }

    pub fn survey_editor() -> PromptTemplate {
        PromptTemplate {
            name: "survey_editor".to_string(),
            version: "1.0.0".to_string(),
            system: "You change existing surveys as the user asks.\n\
                     1. Find the survey with list_surveys.\n\
                     2. Apply the requested changes with edit_question or delete_question.\n\
                     3. If a tool reports an error, fix the arguments or explain the problem.\n\
                     4. Finish with a short summary of the changes.\n\n\
                     {{question_types}}"
                .to_string(),
        }
    }

    pub fn survey_parser() -> PromptTemplate {
        PromptTemplate {
            name: "survey_parser".to_string(),
            version: "1.0.0".to_string(),
            system: "You turn a complete survey written in natural language into structured data.\n\
                     1. Create the survey with create_survey.\n\
                     2. Split the text into individual questions.\n\
                     3. For each question, send its text to the Question Parser with \
                     transfer_to_question_parser, then call add_question with the result.\n\
                     4. Only answer once every question has been added. Your answer must be \
                     the SurveyParserOutput JSON object.\n\n\
                     {{question_types}}"
                .to_string(),
        }
    }

    pub fn question_parser() -> PromptTemplate {
        PromptTemplate {
            name: "question_parser".to_string(),
            version: "1.0.0".to_string(),
            system: "You convert one survey question into structured form.\n\
                     Pick the question type from the wording, the listed answers and any \
                     validation hints, then answer with the QuestionParserOutput JSON object.\n\n\
                     Input: \"Did you find our website easy to navigate? (Yes / No)\"\n\
                     Output: {\"text\": \"Did you find our website easy to navigate?\", \
                     \"question_type\": \"RADIO\", \"options\": [\"Yes\", \"No\"], \
                     \"question_options\": {\"required\": true}}\n\n\
                     Input: \"Which features do you use? (select all that apply) Dashboard, \
                     Notifications, File Sharing, Analytics\"\n\
                     Output: {\"text\": \"Which features do you use?\", \
                     \"question_type\": \"MULTIPLE_CHOICE\", \"options\": [\"Dashboard\", \
                     \"Notifications\", \"File Sharing\", \"Analytics\"], \
                     \"question_options\": {\"required\": true}}\n\n\
                     Input: \"About how many hours per week do you use the platform? (enter a number)\"\n\
                     Output: {\"text\": \"About how many hours per week do you use the platform?\", \
                     \"question_type\": \"NUMERIC\", \
                     \"question_options\": {\"required\": true, \"min_value\": 0}}\n\n\
                     {{question_types}}"
                .to_string(),
        }
    }
}
