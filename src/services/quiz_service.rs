use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{Game, GameType, Question, QuestionDraft},
        dto::{
            request::{CheckAnswerRequest, CreateGameRequest, EndGameRequest},
            response::{CheckAnswerResponse, CreateGameResponse, EndGameResponse, GameDto},
        },
    },
    repositories::{AnswerRecord, GameRepository, QuestionRepository},
    services::{
        answer_checker::judge_answer,
        model_service::CompletionClient,
        prompt_builder::{build_prompt, PromptMessages},
        response_normalizer::normalize_questions,
    },
    session::{AnswerChecker, GameEnder, GameSession},
};

pub struct QuizService {
    games: Arc<dyn GameRepository>,
    questions: Arc<dyn QuestionRepository>,
    model: Arc<dyn CompletionClient>,
    generation_attempts: u32,
}

impl QuizService {
    pub fn new(
        games: Arc<dyn GameRepository>,
        questions: Arc<dyn QuestionRepository>,
        model: Arc<dyn CompletionClient>,
        generation_attempts: u32,
    ) -> Self {
        Self {
            games,
            questions,
            model,
            generation_attempts: generation_attempts.max(1),
        }
    }

    /// Generates a question bank and stores it as a new game. Nothing is
    /// stored unless generation succeeds.
    pub async fn create_game(&self, request: CreateGameRequest) -> AppResult<CreateGameResponse> {
        request.check()?;

        let topic = request.topic.trim();
        let game_type = request.quiz_type;
        log::info!(
            "Generating {} {} questions about '{}'",
            request.amount,
            game_type,
            topic
        );

        let prompt = build_prompt(request.amount, game_type, topic);
        let mut drafts = self.generate_questions(&prompt, game_type).await?;
        if drafts.len() > request.amount as usize {
            drafts.truncate(request.amount as usize);
        }

        let game = Game::new(topic, game_type);
        let questions = drafts
            .into_iter()
            .enumerate()
            .map(|(position, draft)| Question::from_draft(draft, &game.id, position as u32, game_type))
            .collect::<AppResult<Vec<_>>>()?;
        let count = questions.len();

        // questions first: a game is only visible once its bank is complete
        if let Err(e) = self.questions.create_many(questions).await {
            // an interrupted batch insert may have stored part of the bank
            self.discard_questions(&game.id).await;
            return Err(e);
        }
        let game = match self.games.create(game.clone()).await {
            Ok(game) => game,
            Err(e) => {
                self.discard_questions(&game.id).await;
                return Err(e);
            }
        };

        log::info!("Created game {} with {} questions", game.id, count);
        Ok(CreateGameResponse { game_id: game.id })
    }

    async fn discard_questions(&self, game_id: &str) {
        match self.questions.delete_by_game(game_id).await {
            Ok(removed) => log::warn!("Removed {} questions of unsaved game {}", removed, game_id),
            Err(e) => log::error!("Failed to remove questions of unsaved game {}: {}", game_id, e),
        }
    }

    /// The game with its questions in order; answers are not included.
    pub async fn get_game(&self, game_id: &str) -> AppResult<GameDto> {
        let game = self.find_game(game_id).await?;
        let questions = self.questions.find_by_game(&game.id).await?;
        Ok(GameDto::new(game, questions))
    }

    pub async fn check_answer(&self, request: CheckAnswerRequest) -> AppResult<CheckAnswerResponse> {
        request.validate()?;

        let question = self
            .questions
            .find_by_id(&request.question_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Question with id '{}' not found", request.question_id))
            })?;

        let verdict = judge_answer(&question, &request.user_input);
        self.questions
            .record_answer(
                &question.id,
                AnswerRecord {
                    user_answer: request.user_input,
                    is_correct: verdict.is_correct,
                    percentage_correct: verdict.percentage_similar,
                },
            )
            .await?;

        Ok(CheckAnswerResponse {
            is_correct: verdict.is_correct,
            percentage_similar: verdict.percentage_similar,
        })
    }

    pub async fn end_game(&self, request: EndGameRequest) -> AppResult<EndGameResponse> {
        request.validate()?;

        let game = self.games.mark_ended(&request.game_id, Utc::now()).await?;
        log::info!("Game {} ended", game.id);

        Ok(EndGameResponse {
            message: "Game ended".to_string(),
        })
    }

    /// Starts an in-process session over a stored game, scoring answers
    /// through this service.
    pub async fn start_session(self: &Arc<Self>, game_id: &str) -> AppResult<GameSession> {
        let game = self.find_game(game_id).await?;
        if game.has_ended() {
            return Err(AppError::ValidationError(format!(
                "Game '{}' has already ended",
                game.id
            )));
        }

        let questions = self.questions.find_by_game(&game.id).await?;
        let checker: Arc<dyn AnswerChecker> = self.clone();
        let ender: Arc<dyn GameEnder> = self.clone();

        GameSession::new(&game, questions, checker, ender)
            .map_err(|e| AppError::InternalError(format!("Cannot start session for game '{}': {}", game.id, e)))
    }

    async fn find_game(&self, game_id: &str) -> AppResult<Game> {
        self.games
            .find_by_id(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game with id '{}' not found", game_id)))
    }

    async fn generate_questions(
        &self,
        prompt: &PromptMessages,
        game_type: GameType,
    ) -> AppResult<Vec<QuestionDraft>> {
        let mut attempt = 1;
        loop {
            match self.generate_once(prompt, game_type).await {
                Ok(drafts) => return Ok(drafts),
                Err(e) if e.is_retryable_generation_failure() && attempt < self.generation_attempts => {
                    log::warn!(
                        "Generation attempt {}/{} failed, retrying: {}",
                        attempt,
                        self.generation_attempts,
                        e
                    );
                    attempt += 1;
                }
                Err(e) => {
                    if let AppError::UnparsableResponse { raw, .. } = &e {
                        log::debug!("Unparsable model response: {}", raw);
                    }
                    log::error!("Quiz generation failed after {} attempt(s): {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }

    async fn generate_once(
        &self,
        prompt: &PromptMessages,
        game_type: GameType,
    ) -> AppResult<Vec<QuestionDraft>> {
        let raw = self.model.complete(prompt).await?;
        let mut rng = rand::rng();
        normalize_questions(&raw, game_type, &mut rng)
    }
}

#[async_trait]
impl AnswerChecker for QuizService {
    async fn check_answer(&self, question_id: &str, user_input: &str) -> AppResult<bool> {
        let request = CheckAnswerRequest {
            question_id: question_id.to_string(),
            user_input: user_input.to_string(),
        };

        QuizService::check_answer(self, request)
            .await
            .map(|response| response.is_correct)
            .map_err(|e| AppError::AnswerCheckError(e.to_string()))
    }
}

#[async_trait]
impl GameEnder for QuizService {
    async fn end_game(&self, game_id: &str) -> AppResult<()> {
        self.games.mark_ended(game_id, Utc::now()).await?;
        log::info!("Game {} ended by its session", game_id);
        Ok(())
    }
}
