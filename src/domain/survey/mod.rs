// Survey domain module
// Contains the survey aggregate root, question entity, value objects, and domain events

#![allow(clippy::module_inception)]

pub mod errors;
pub mod events;
pub mod question;
pub mod survey;
pub mod value_objects;

// Re-export main types for convenience
pub use errors::{SurveyError, SurveyResult};
pub use events::SurveyEvent;
pub use question::{Question, QuestionUpdate};
pub use survey::Survey;
pub use value_objects::{question_types_info, QuestionOptions, QuestionType};
