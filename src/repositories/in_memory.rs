//! Process-local stores for tests and running without MongoDB.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Game, Question},
    repositories::{AnswerRecord, GameRepository, QuestionRepository},
};

#[derive(Default, Clone)]
pub struct InMemoryGameRepository {
    games: Arc<RwLock<HashMap<String, Game>>>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.games.read().await.is_empty()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn create(&self, game: Game) -> AppResult<Game> {
        let mut games = self.games.write().await;
        if games.contains_key(&game.id) {
            return Err(AppError::AlreadyExists(format!(
                "Game with id '{}' already exists",
                game.id
            )));
        }
        games.insert(game.id.clone(), game.clone());
        Ok(game)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Game>> {
        let games = self.games.read().await;
        Ok(games.get(id).cloned())
    }

    async fn mark_ended(&self, id: &str, ended_at: DateTime<Utc>) -> AppResult<Game> {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Game with id '{}' not found", id)))?;

        if game.time_ended.is_none() {
            game.time_ended = Some(ended_at);
        }
        Ok(game.clone())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryQuestionRepository {
    questions: Arc<RwLock<HashMap<String, Question>>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.questions.read().await.is_empty()
    }
}

#[async_trait]
impl QuestionRepository for InMemoryQuestionRepository {
    async fn create_many(&self, questions: Vec<Question>) -> AppResult<Vec<Question>> {
        let mut stored = self.questions.write().await;
        if let Some(duplicate) = questions.iter().find(|q| stored.contains_key(&q.id)) {
            return Err(AppError::AlreadyExists(format!(
                "Question with id '{}' already exists",
                duplicate.id
            )));
        }
        for question in &questions {
            stored.insert(question.id.clone(), question.clone());
        }
        Ok(questions)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Question>> {
        let questions = self.questions.read().await;
        Ok(questions.get(id).cloned())
    }

    async fn find_by_game(&self, game_id: &str) -> AppResult<Vec<Question>> {
        let questions = self.questions.read().await;
        let mut items: Vec<Question> = questions
            .values()
            .filter(|q| q.game_id == game_id)
            .cloned()
            .collect();
        items.sort_by_key(|q| q.position);
        Ok(items)
    }

    async fn record_answer(&self, id: &str, record: AnswerRecord) -> AppResult<Question> {
        let mut questions = self.questions.write().await;
        let question = questions
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Question with id '{}' not found", id)))?;

        question.user_answer = Some(record.user_answer);
        question.is_correct = Some(record.is_correct);
        question.percentage_correct = record.percentage_correct;
        Ok(question.clone())
    }

    async fn delete_by_game(&self, game_id: &str) -> AppResult<u64> {
        let mut questions = self.questions.write().await;
        let before = questions.len();
        questions.retain(|_, q| q.game_id != game_id);
        Ok((before - questions.len()) as u64)
    }
}
