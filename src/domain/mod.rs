// Domain layer module exports
// Following Hexagonal Architecture and DDD principles
// Domain is independent of infrastructure concerns

pub mod context;
pub mod repositories;
pub mod survey;

pub use context::SurveyContext;
