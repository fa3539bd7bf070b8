use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::survey::{Survey, SurveyResult};

/// Repository trait for the Survey aggregate
///
/// Defines the contract for persisting and retrieving surveys.
/// Implementations map storage failures to `SurveyError::Repository`.
#[async_trait]
pub trait SurveyRepository: Send + Sync {
    /// Save a survey with all its questions (insert or replace)
    async fn save(&self, survey: &Survey) -> SurveyResult<()>;

    /// Find a survey by its ID
    async fn find_by_id(&self, id: Uuid) -> SurveyResult<Option<Survey>>;

    /// List all surveys in creation order
    async fn list(&self) -> SurveyResult<Vec<Survey>>;

    /// Delete a survey by ID
    ///
    /// Returns `SurveyError::SurveyNotFound` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> SurveyResult<()>;
}
