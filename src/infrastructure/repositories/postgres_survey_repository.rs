use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::repositories::SurveyRepository;
use crate::domain::survey::{
    Question, QuestionOptions, QuestionType, Survey, SurveyError, SurveyResult,
};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS surveys (
        id UUID PRIMARY KEY,
        seq BIGSERIAL,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    ALTER TABLE surveys ADD COLUMN IF NOT EXISTS seq BIGSERIAL
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS survey_questions (
        id UUID NOT NULL,
        survey_id UUID NOT NULL REFERENCES surveys(id) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        text TEXT NOT NULL,
        question_type TEXT NOT NULL,
        options JSONB,
        question_options JSONB NOT NULL DEFAULT '{}'::jsonb,
        PRIMARY KEY (survey_id, id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS survey_questions_position_idx
        ON survey_questions (survey_id, position)
    "#,
];

/// PostgreSQL implementation of SurveyRepository
///
/// Surveys list in insertion order (`seq`); questions live in their own
/// table, ordered by `position`. Saving a
/// survey rewrites its question rows inside one transaction.
pub struct PostgresSurveyRepository {
    pool: PgPool,
}

impl PostgresSurveyRepository {
    /// Creates a new PostgresSurveyRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables if they do not exist yet
    pub async fn ensure_schema(&self) -> SurveyResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| repository_error("Failed to create schema", e))?;
        }
        Ok(())
    }

    async fn load_questions(
        &self,
        survey_ids: &[Uuid],
    ) -> SurveyResult<HashMap<Uuid, Vec<Question>>> {
        let rows = sqlx::query(
            r#"
            SELECT survey_id, id, text, question_type, options, question_options
            FROM survey_questions
            WHERE survey_id = ANY($1)
            ORDER BY survey_id, position
            "#,
        )
        .bind(survey_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| repository_error("Failed to load questions", e))?;

        let mut grouped: HashMap<Uuid, Vec<Question>> = HashMap::new();
        for row in rows {
            let survey_id: Uuid = row
                .try_get("survey_id")
                .map_err(|e| repository_error("Failed to decode question", e))?;
            grouped
                .entry(survey_id)
                .or_default()
                .push(question_from_row(&row)?);
        }

        Ok(grouped)
    }
}

#[async_trait]
impl SurveyRepository for PostgresSurveyRepository {
    async fn save(&self, survey: &Survey) -> SurveyResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| repository_error("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO surveys (id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                description = EXCLUDED.description,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(survey.id())
        .bind(survey.name())
        .bind(survey.description())
        .bind(survey.created_at())
        .bind(survey.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| repository_error("Failed to save survey", e))?;

        sqlx::query("DELETE FROM survey_questions WHERE survey_id = $1")
            .bind(survey.id())
            .execute(&mut *tx)
            .await
            .map_err(|e| repository_error("Failed to replace questions", e))?;

        for (position, question) in survey.questions().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO survey_questions (
                    id, survey_id, position, text, question_type, options, question_options
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(question.id())
            .bind(survey.id())
            .bind(position as i32)
            .bind(question.text())
            .bind(question.question_type().as_str())
            .bind(question.options().map(|o| Json(o.to_vec())))
            .bind(Json(question.question_options().to_value()))
            .execute(&mut *tx)
            .await
            .map_err(|e| repository_error("Failed to save question", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| repository_error("Failed to commit survey", e))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> SurveyResult<Option<Survey>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM surveys
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| repository_error("Failed to find survey by id", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut questions = self.load_questions(&[id]).await?;
        let survey = survey_from_row(&row, questions.remove(&id).unwrap_or_default())?;
        Ok(Some(survey))
    }

    async fn list(&self) -> SurveyResult<Vec<Survey>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM surveys
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| repository_error("Failed to list surveys", e))?;

        let ids = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>("id"))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| repository_error("Failed to decode survey", e))?;
        let mut questions = self.load_questions(&ids).await?;

        rows.iter()
            .zip(ids)
            .map(|(row, id)| survey_from_row(row, questions.remove(&id).unwrap_or_default()))
            .collect()
    }

    async fn delete(&self, id: Uuid) -> SurveyResult<()> {
        let result = sqlx::query("DELETE FROM surveys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| repository_error("Failed to delete survey", e))?;

        if result.rows_affected() == 0 {
            return Err(SurveyError::SurveyNotFound(id));
        }

        Ok(())
    }
}

fn repository_error(context: &str, err: sqlx::Error) -> SurveyError {
    SurveyError::Repository(format!("{}: {}", context, err))
}

fn survey_from_row(row: &PgRow, questions: Vec<Question>) -> SurveyResult<Survey> {
    let decode = |e| repository_error("Failed to decode survey", e);

    Ok(Survey::from_persistence(
        row.try_get::<Uuid, _>("id").map_err(decode)?,
        row.try_get::<String, _>("name").map_err(decode)?,
        row.try_get::<String, _>("description").map_err(decode)?,
        questions,
        row.try_get::<DateTime<Utc>, _>("created_at").map_err(decode)?,
        row.try_get::<DateTime<Utc>, _>("updated_at").map_err(decode)?,
    ))
}

fn question_from_row(row: &PgRow) -> SurveyResult<Question> {
    let decode = |e| repository_error("Failed to decode question", e);

    let label: String = row.try_get("question_type").map_err(decode)?;
    let question_type: QuestionType = label
        .parse()
        .map_err(|e: SurveyError| SurveyError::Repository(e.to_string()))?;
    let options: Option<Json<Vec<String>>> = row.try_get("options").map_err(decode)?;
    let question_options: Json<Value> = row.try_get("question_options").map_err(decode)?;
    let question_options = QuestionOptions::from_value(question_options.0)
        .map_err(|e| SurveyError::Repository(e.to_string()))?;

    Ok(Question::from_persistence(
        row.try_get("id").map_err(decode)?,
        row.try_get("text").map_err(decode)?,
        question_type,
        options.map(|o| o.0),
        question_options,
    ))
}
