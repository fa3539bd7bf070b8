use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::repositories::SurveyRepository;
use crate::domain::survey::{Survey, SurveyError, SurveyResult};

/// In-process implementation of SurveyRepository
///
/// Used when no database is configured and throughout the tests. Surveys
/// are kept in insertion order so `list` matches creation order.
#[derive(Debug, Default)]
pub struct InMemorySurveyRepository {
    surveys: RwLock<Vec<Survey>>,
}

impl InMemorySurveyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SurveyRepository for InMemorySurveyRepository {
    async fn save(&self, survey: &Survey) -> SurveyResult<()> {
        let mut surveys = self.surveys.write().await;
        match surveys.iter_mut().find(|s| s.id() == survey.id()) {
            Some(existing) => *existing = survey.clone(),
            None => surveys.push(survey.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> SurveyResult<Option<Survey>> {
        let surveys = self.surveys.read().await;
        Ok(surveys.iter().find(|s| s.id() == id).cloned())
    }

    async fn list(&self) -> SurveyResult<Vec<Survey>> {
        Ok(self.surveys.read().await.clone())
    }

    async fn delete(&self, id: Uuid) -> SurveyResult<()> {
        let mut surveys = self.surveys.write().await;
        let before = surveys.len();
        surveys.retain(|s| s.id() != id);

        if surveys.len() == before {
            return Err(SurveyError::SurveyNotFound(id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey(name: &str) -> Survey {
        Survey::new(name.to_string(), String::new()).unwrap().0
    }

    #[tokio::test]
    async fn save_then_find() {
        let repo = InMemorySurveyRepository::new();
        let s = survey("One");

        repo.save(&s).await.unwrap();

        assert_eq!(repo.find_by_id(s.id()).await.unwrap(), Some(s));
    }

    #[tokio::test]
    async fn save_replaces_existing_in_place() {
        let repo = InMemorySurveyRepository::new();
        let first = survey("First");
        let mut second = survey("Second");
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();

        second
            .add_question(
                "Q".to_string(),
                crate::domain::survey::QuestionType::Text,
                None,
                Default::default(),
            )
            .unwrap();
        repo.save(&second).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id(), first.id());
        assert_eq!(all[1].question_count(), 1);
    }

    #[tokio::test]
    async fn delete_missing_survey_fails() {
        let repo = InMemorySurveyRepository::new();
        let id = Uuid::new_v4();

        assert_eq!(repo.delete(id).await, Err(SurveyError::SurveyNotFound(id)));
    }
}
