//! Integration tests for repository layer
//!
//! The same contract runs against every SurveyRepository implementation:
//! insert and replace, question ordering, listing in creation order and
//! deletion. PostgreSQL tests are skipped when DATABASE_URL is not set.

use chrono::Utc;
use serde_json::json;
use survey_agents::domain::repositories::SurveyRepository;
use survey_agents::domain::survey::{
    QuestionOptions, QuestionType, QuestionUpdate, Survey, SurveyError,
};
use survey_agents::infrastructure::repositories::{
    InMemorySurveyRepository, PostgresSurveyRepository,
};
use uuid::Uuid;

/// Set up a PostgreSQL repository, or None when no database is configured
async fn setup_postgres() -> Option<PostgresSurveyRepository> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    let repo = PostgresSurveyRepository::new(pool);
    repo.ensure_schema().await.expect("Failed to create schema");
    Some(repo)
}

fn survey_with_questions(name: &str) -> Survey {
    let (mut survey, _events) =
        Survey::new(name.to_string(), "Repository test".to_string()).unwrap();
    survey
        .add_question(
            "Did you find our website easy to navigate?".to_string(),
            QuestionType::Radio,
            Some(vec!["Yes".to_string(), "No".to_string()]),
            QuestionOptions::from_value(json!({"required": true})).unwrap(),
        )
        .unwrap();
    survey
        .add_question(
            "How many hours per week do you use the platform?".to_string(),
            QuestionType::Numeric,
            None,
            QuestionOptions::from_value(json!({"min_value": 0})).unwrap(),
        )
        .unwrap();
    survey
}

async fn save_and_find(repo: &dyn SurveyRepository) {
    let survey = survey_with_questions(&format!("Save {}", Uuid::new_v4()));
    repo.save(&survey).await.expect("Failed to save survey");

    let found = repo
        .find_by_id(survey.id())
        .await
        .expect("Failed to find survey")
        .expect("Survey should exist");

    assert_eq!(found.name(), survey.name());
    assert_eq!(found.description(), "Repository test");
    assert_eq!(found.question_count(), 2);
    assert_eq!(found.questions()[0].question_type(), QuestionType::Radio);
    assert_eq!(
        found.questions()[0].options().unwrap(),
        ["Yes".to_string(), "No".to_string()]
    );
    assert!(found.questions()[0].question_options().is_required());
    assert_eq!(found.questions()[1].question_type(), QuestionType::Numeric);
    assert_eq!(found.questions()[1].options(), None);
    assert_eq!(
        found.questions()[1].question_options().get("min_value"),
        Some(&json!(0))
    );

    repo.delete(survey.id()).await.expect("Failed to clean up");
}

async fn save_replaces_questions(repo: &dyn SurveyRepository) {
    let mut survey = survey_with_questions(&format!("Replace {}", Uuid::new_v4()));
    repo.save(&survey).await.unwrap();

    let first = survey.questions()[0].id();
    let second = survey.questions()[1].id();
    survey.delete_question(first).unwrap();
    survey
        .edit_question(
            second,
            QuestionUpdate {
                text: Some("Hours per week?".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    repo.save(&survey).await.unwrap();

    let found = repo.find_by_id(survey.id()).await.unwrap().unwrap();
    assert_eq!(found.question_count(), 1);
    assert_eq!(found.questions()[0].id(), second);
    assert_eq!(found.questions()[0].text(), "Hours per week?");

    repo.delete(survey.id()).await.unwrap();
}

async fn list_in_creation_order(repo: &dyn SurveyRepository) {
    // Same timestamps, so only insertion order can separate them
    let now = Utc::now();
    let first = Survey::from_persistence(
        Uuid::new_v4(),
        format!("First {}", Uuid::new_v4()),
        String::new(),
        Vec::new(),
        now,
        now,
    );
    let second = Survey::from_persistence(
        Uuid::new_v4(),
        format!("Second {}", Uuid::new_v4()),
        String::new(),
        Vec::new(),
        now,
        now,
    );
    repo.save(&first).await.unwrap();
    repo.save(&second).await.unwrap();
    // Re-saving keeps the original position
    repo.save(&first).await.unwrap();

    let ids: Vec<Uuid> = repo.list().await.unwrap().iter().map(|s| s.id()).collect();
    let first_pos = ids.iter().position(|id| *id == first.id()).unwrap();
    let second_pos = ids.iter().position(|id| *id == second.id()).unwrap();
    assert!(first_pos < second_pos);

    repo.delete(first.id()).await.unwrap();
    repo.delete(second.id()).await.unwrap();
}

async fn delete_missing(repo: &dyn SurveyRepository) {
    let id = Uuid::new_v4();
    assert_eq!(repo.delete(id).await, Err(SurveyError::SurveyNotFound(id)));
    assert!(repo.find_by_id(id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_in_memory_save_and_find() {
    save_and_find(&InMemorySurveyRepository::new()).await;
}

#[tokio::test]
async fn test_in_memory_save_replaces_questions() {
    save_replaces_questions(&InMemorySurveyRepository::new()).await;
}

#[tokio::test]
async fn test_in_memory_list_in_creation_order() {
    list_in_creation_order(&InMemorySurveyRepository::new()).await;
}

#[tokio::test]
async fn test_in_memory_delete_missing() {
    delete_missing(&InMemorySurveyRepository::new()).await;
}

#[tokio::test]
async fn test_postgres_repository_contract() {
    let Some(repo) = setup_postgres().await else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL repository tests");
        return;
    };

    save_and_find(&repo).await;
    save_replaces_questions(&repo).await;
    list_in_creation_order(&repo).await;
    delete_missing(&repo).await;
}
