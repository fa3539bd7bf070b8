// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory_survey_repository;
pub mod postgres_survey_repository;

pub use in_memory_survey_repository::InMemorySurveyRepository;
pub use postgres_survey_repository::PostgresSurveyRepository;
