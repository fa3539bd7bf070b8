// Repository interfaces (ports)
// Implementations live in the infrastructure layer

pub mod survey_repository;

pub use survey_repository::SurveyRepository;
