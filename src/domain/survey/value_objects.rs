use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use super::errors::SurveyError;

/// Closed set of question types a survey question can take
///
/// Each type carries an info string that is shown to the language model
/// so it can classify free-text questions. The type is a capability tag,
/// not a subtype with behavior.
///
/// # Example
/// ```
/// use survey_agents::domain::survey::value_objects::QuestionType;
///
/// let ty: QuestionType = "multiple_choice".parse().expect("known type");
/// assert_eq!(ty, QuestionType::MultipleChoice);
/// assert!(ty.is_choice());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    /// Single selection from a list of options
    Radio,
    /// Any number of selections from a list of options
    MultipleChoice,
    /// Single selection rendered as a dropdown
    Dropdown,
    /// Short free-text answer
    Text,
    /// Long free-text answer
    Paragraph,
    /// Numeric answer
    Numeric,
    /// Rating on a numeric scale
    Rating,
    /// Calendar date
    Date,
}

impl QuestionType {
    pub const ALL: [QuestionType; 8] = [
        QuestionType::Radio,
        QuestionType::MultipleChoice,
        QuestionType::Dropdown,
        QuestionType::Text,
        QuestionType::Paragraph,
        QuestionType::Numeric,
        QuestionType::Rating,
        QuestionType::Date,
    ];

    /// Wire label used in tool arguments and structured output
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Radio => "RADIO",
            QuestionType::MultipleChoice => "MULTIPLE_CHOICE",
            QuestionType::Dropdown => "DROPDOWN",
            QuestionType::Text => "TEXT",
            QuestionType::Paragraph => "PARAGRAPH",
            QuestionType::Numeric => "NUMERIC",
            QuestionType::Rating => "RATING",
            QuestionType::Date => "DATE",
        }
    }

    /// Returns true when the type requires a non-empty option list
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            QuestionType::Radio | QuestionType::MultipleChoice | QuestionType::Dropdown
        )
    }

    /// Guidance shown to the model when it has to pick a type
    pub fn info(&self) -> &'static str {
        match self {
            QuestionType::Radio => {
                "Single choice from a short list (e.g. Yes / No). Requires options."
            }
            QuestionType::MultipleChoice => {
                "Several answers may be selected from a list. Requires options."
            }
            QuestionType::Dropdown => {
                "Single choice from a long list shown as a dropdown. Requires options."
            }
            QuestionType::Text => "Short free-text answer such as a name or a single line.",
            QuestionType::Paragraph => "Long free-text answer such as comments or feedback.",
            QuestionType::Numeric => {
                "A number. Supports min_value and max_value in question_options."
            }
            QuestionType::Rating => {
                "A rating on a scale (e.g. 1 to 5). Supports min_value and max_value."
            }
            QuestionType::Date => "A calendar date.",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = SurveyError;

    /// Case-insensitive; `-` and spaces are read as `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        QuestionType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == normalized)
            .ok_or_else(|| SurveyError::UnknownQuestionType(s.to_string()))
    }
}

/// Renders the question type catalogue embedded in agent instructions
pub fn question_types_info() -> String {
    let mut info = String::from("Available question types:\n");
    for ty in QuestionType::ALL {
        info.push_str(&format!("- {}: {}\n", ty.as_str(), ty.info()));
    }
    info
}

/// Question-level configuration such as `required` or `min_value`
///
/// Well-known keys are shape-checked; anything else is kept verbatim.
///
/// # Invariants
/// - `required` is a boolean
/// - `min_value` and `max_value` are numbers
/// - `min_value <= max_value` when both are present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct QuestionOptions(Map<String, Value>);

impl TryFrom<Map<String, Value>> for QuestionOptions {
    type Error = SurveyError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::new(map)
    }
}

impl From<QuestionOptions> for Map<String, Value> {
    fn from(options: QuestionOptions) -> Self {
        options.0
    }
}

impl QuestionOptions {
    /// Validates and wraps a JSON object
    pub fn new(map: Map<String, Value>) -> Result<Self, SurveyError> {
        if let Some(required) = map.get("required") {
            if !required.is_boolean() {
                return Err(SurveyError::InvalidFieldValue(format!(
                    "required must be a boolean, got {}",
                    required
                )));
            }
        }

        let min = Self::number(&map, "min_value")?;
        let max = Self::number(&map, "max_value")?;
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(SurveyError::InvalidFieldValue(format!(
                    "min_value {} is greater than max_value {}",
                    min, max
                )));
            }
        }

        Ok(Self(map))
    }

    /// Validates an arbitrary JSON value; `null` is treated as empty
    pub fn from_value(value: Value) -> Result<Self, SurveyError> {
        match value {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Self::new(map),
            other => Err(SurveyError::InvalidFieldValue(format!(
                "question_options must be an object, got {}",
                other
            ))),
        }
    }

    fn number(map: &Map<String, Value>, key: &str) -> Result<Option<f64>, SurveyError> {
        match map.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| {
                SurveyError::InvalidFieldValue(format!("{} must be a number, got {}", key, value))
            }),
        }
    }

    pub fn is_required(&self) -> bool {
        self.0
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_known_labels() {
        assert_eq!("RADIO".parse::<QuestionType>().unwrap(), QuestionType::Radio);
        assert_eq!(
            "multiple-choice".parse::<QuestionType>().unwrap(),
            QuestionType::MultipleChoice
        );
        assert_eq!(" numeric ".parse::<QuestionType>().unwrap(), QuestionType::Numeric);
    }

    #[test]
    fn parse_unknown_label_is_distinguishable() {
        let err = "SLIDER".parse::<QuestionType>().unwrap_err();
        assert!(matches!(err, SurveyError::UnknownQuestionType(ref label) if label == "SLIDER"));
    }

    #[test]
    fn choice_types() {
        assert!(QuestionType::Radio.is_choice());
        assert!(QuestionType::MultipleChoice.is_choice());
        assert!(QuestionType::Dropdown.is_choice());
        assert!(!QuestionType::Numeric.is_choice());
        assert!(!QuestionType::Text.is_choice());
    }

    #[test]
    fn display_matches_wire_label() {
        for ty in QuestionType::ALL {
            assert_eq!(ty.to_string(), ty.as_str());
            assert_eq!(ty.as_str().parse::<QuestionType>().unwrap(), ty);
        }
    }

    #[test]
    fn serde_uses_wire_label() {
        let json = serde_json::to_string(&QuestionType::MultipleChoice).unwrap();
        assert_eq!(json, "\"MULTIPLE_CHOICE\"");
    }

    #[test]
    fn catalogue_lists_every_type() {
        let info = question_types_info();
        for ty in QuestionType::ALL {
            assert!(info.contains(ty.as_str()));
        }
    }

    #[test]
    fn options_accept_known_shapes() {
        let opts = QuestionOptions::from_value(json!({"required": true, "min_value": 0})).unwrap();
        assert!(opts.is_required());
        assert_eq!(opts.get("min_value"), Some(&json!(0)));
    }

    #[test]
    fn options_keep_unknown_keys() {
        let opts = QuestionOptions::from_value(json!({"placeholder": "Your name"})).unwrap();
        assert_eq!(opts.get("placeholder"), Some(&json!("Your name")));
        assert!(!opts.is_required());
    }

    #[test]
    fn options_reject_non_boolean_required() {
        let err = QuestionOptions::from_value(json!({"required": "yes"})).unwrap_err();
        assert!(matches!(err, SurveyError::InvalidFieldValue(_)));
    }

    #[test]
    fn options_reject_inverted_range() {
        let err = QuestionOptions::from_value(json!({"min_value": 10, "max_value": 1})).unwrap_err();
        assert!(matches!(err, SurveyError::InvalidFieldValue(_)));
    }

    #[test]
    fn options_reject_non_object() {
        assert!(QuestionOptions::from_value(json!([1, 2])).is_err());
        assert!(QuestionOptions::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn options_deserialize_through_validation() {
        let opts: QuestionOptions =
            serde_json::from_value(json!({"required": false, "max_value": 5})).unwrap();
        assert_eq!(serde_json::to_value(&opts).unwrap(), opts.to_value());

        let err = serde_json::from_value::<QuestionOptions>(json!({"min_value": "low"}))
            .unwrap_err();
        assert!(err.to_string().contains("min_value must be a number"));
        assert!(serde_json::from_value::<QuestionOptions>(json!({"required": 1})).is_err());
    }
}
