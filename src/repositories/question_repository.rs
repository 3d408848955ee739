use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Question,
};

/// The outcome of checking a user's answer, stored on the question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub user_answer: String,
    pub is_correct: bool,
    pub percentage_correct: Option<u32>,
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    async fn create_many(&self, questions: Vec<Question>) -> AppResult<Vec<Question>>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>>;
    /// Questions of a game ordered by position.
    async fn find_by_game(&self, game_id: &str) -> AppResult<Vec<Question>>;
    async fn record_answer(&self, id: &str, record: AnswerRecord) -> AppResult<Question>;
    /// Removes every question of a game, returning how many were removed.
    async fn delete_by_game(&self, game_id: &str) -> AppResult<u64>;
}

pub struct MongoQuestionRepository {
    collection: Collection<Question>,
}

impl MongoQuestionRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection(db.questions_collection());
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for questions collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let game_index = IndexModel::builder()
            .keys(doc! { "game_id": 1, "position": 1 })
            .options(
                IndexOptions::builder()
                    .name("game_position".to_string())
                    .build(),
            )
            .build();

        self.collection.create_index(id_index).await?;
        self.collection.create_index(game_index).await?;

        log::info!("Successfully created indexes for questions collection");
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for MongoQuestionRepository {
    async fn create_many(&self, questions: Vec<Question>) -> AppResult<Vec<Question>> {
        if questions.is_empty() {
            return Ok(questions);
        }
        self.collection.insert_many(&questions).await?;
        Ok(questions)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let question = self.collection.find_one(doc! { "id": id }).await?;
        Ok(question)
    }

    async fn find_by_game(&self, game_id: &str) -> AppResult<Vec<Question>> {
        let find_options = FindOptions::builder()
            .sort(doc! { "position": 1 })
            .build();

        let cursor = self
            .collection
            .find(doc! { "game_id": game_id })
            .with_options(find_options)
            .await?;
        let questions: Vec<Question> = cursor.try_collect().await?;

        Ok(questions)
    }

    async fn record_answer(&self, id: &str, record: AnswerRecord) -> AppResult<Question> {
        let mut question = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))?;

        question.user_answer = Some(record.user_answer);
        question.is_correct = Some(record.is_correct);
        question.percentage_correct = record.percentage_correct;

        self.collection
            .replace_one(doc! { "id": &question.id }, &question)
            .await?;
        Ok(question)
    }

    async fn delete_by_game(&self, game_id: &str) -> AppResult<u64> {
        let result = self
            .collection
            .delete_many(doc! { "game_id": game_id })
            .await?;
        Ok(result.deleted_count)
    }
}
