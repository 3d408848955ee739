use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{GameRepository, MongoGameRepository, MongoQuestionRepository, QuestionRepository},
    services::{CompletionClient, OpenAiModelService, QuizService},
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: Arc<QuizService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let games = Arc::new(MongoGameRepository::new(&db));
        games.ensure_indexes().await?;
        let questions = Arc::new(MongoQuestionRepository::new(&db));
        questions.ensure_indexes().await?;

        let model = Arc::new(OpenAiModelService::new(&config));

        Ok(Self::from_parts(config, games, questions, model))
    }

    /// Wires the service from already-built stores and model client.
    pub fn from_parts(
        config: Config,
        games: Arc<dyn GameRepository>,
        questions: Arc<dyn QuestionRepository>,
        model: Arc<dyn CompletionClient>,
    ) -> Self {
        let quiz_service = Arc::new(QuizService::new(
            games,
            questions,
            model,
            config.generation_attempts,
        ));

        Self {
            quiz_service,
            config: Arc::new(config),
        }
    }
}
