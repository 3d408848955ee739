use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::errors::AppError;
use crate::models::domain::{Game, GameType, Question};
use crate::session::collaborators::{AnswerChecker, GameEnder};
use crate::session::summary::SessionSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    InProgress,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub correct_answers: u32,
    pub wrong_answers: u32,
}

impl SessionStats {
    pub fn answered(&self) -> u32 {
        self.correct_answers + self.wrong_answers
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session has already ended")]
    AlreadyEnded,

    #[error("An answer for question {0} is already being checked")]
    SubmissionInFlight(usize),

    #[error("Choice {index} is out of range, the question has {available} options")]
    InvalidChoice { index: usize, available: usize },

    #[error("Multiple choice question {0} has no options")]
    MissingOptions(String),

    #[error("Question {question_id} has unreadable options")]
    CorruptOptions {
        question_id: String,
        #[source]
        source: AppError,
    },

    #[error("Answer check failed")]
    AnswerCheck(#[source] AppError),
}

/// Point-in-time view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_index: usize,
    pub question_count: usize,
    pub current_question: Option<String>,
    pub options: Vec<String>,
    pub selected_choice: usize,
    pub stats: SessionStats,
    pub elapsed_seconds: i64,
}

#[derive(Debug)]
struct SessionQuestion {
    id: String,
    question: String,
    options: Vec<String>,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    current_index: usize,
    selected_choice: usize,
    stats: SessionStats,
    // last instant shown to the player, frozen once ended
    now: DateTime<Utc>,
}

/// Clears the in-flight flag when the submission finishes or its future is dropped.
struct FlightGuard<'a>(&'a AtomicBool);

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard(flag))
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives one player through a stored game: question progression, elapsed
/// time, answer submission and the running score.
pub struct GameSession {
    game_id: String,
    topic: String,
    game_type: GameType,
    time_started: DateTime<Utc>,
    questions: Vec<SessionQuestion>,
    state: Mutex<SessionState>,
    submitting: AtomicBool,
    checker: Arc<dyn AnswerChecker>,
    ender: Arc<dyn GameEnder>,
}

impl GameSession {
    pub fn new(
        game: &Game,
        mut questions: Vec<Question>,
        checker: Arc<dyn AnswerChecker>,
        ender: Arc<dyn GameEnder>,
    ) -> Result<Self, SessionError> {
        questions.sort_by_key(|q| q.position);

        let questions = questions
            .into_iter()
            .map(|q| load_question(q, game.game_type))
            .collect::<Result<Vec<_>, _>>()?;

        let phase = if questions.is_empty() {
            log::info!("Game {} has no questions, session starts ended", game.id);
            SessionPhase::Ended
        } else {
            SessionPhase::InProgress
        };

        Ok(Self {
            game_id: game.id.clone(),
            topic: game.topic.clone(),
            game_type: game.game_type,
            time_started: game.time_started,
            questions,
            state: Mutex::new(SessionState {
                phase,
                current_index: 0,
                selected_choice: 0,
                stats: SessionStats::default(),
                now: game.time_started,
            }),
            submitting: AtomicBool::new(false),
            checker,
            ender,
        })
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Moves the displayed clock forward. Does nothing once the session has ended.
    pub async fn tick(&self, now: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        if state.phase == SessionPhase::InProgress {
            state.now = now;
        }
    }

    pub async fn select_choice(&self, index: usize) -> Result<(), SessionError> {
        let mut state = self.state.lock().await;
        if state.phase == SessionPhase::Ended {
            return Err(SessionError::AlreadyEnded);
        }

        let available = self.questions[state.current_index].options.len();
        if index >= available {
            return Err(SessionError::InvalidChoice { index, available });
        }

        state.selected_choice = index;
        Ok(())
    }

    /// Submits the text of the currently selected option.
    pub async fn submit_choice(&self, now: DateTime<Utc>) -> Result<SessionSnapshot, SessionError> {
        let choice = {
            let state = self.state.lock().await;
            if state.phase == SessionPhase::Ended {
                return Err(SessionError::AlreadyEnded);
            }
            let options = &self.questions[state.current_index].options;
            options
                .get(state.selected_choice)
                .cloned()
                .ok_or(SessionError::InvalidChoice {
                    index: state.selected_choice,
                    available: options.len(),
                })?
        };

        self.submit_answer(&choice, now).await
    }

    /// Checks `user_input` against the current question and advances.
    ///
    /// Only one submission runs at a time; a second call while the first is
    /// being checked fails with [`SessionError::SubmissionInFlight`]. A failed
    /// check leaves the session on the same question so it can be retried.
    pub async fn submit_answer(
        &self,
        user_input: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionSnapshot, SessionError> {
        let _flight = match FlightGuard::acquire(&self.submitting) {
            Some(guard) => guard,
            None => {
                let index = self.state.lock().await.current_index;
                return Err(SessionError::SubmissionInFlight(index));
            }
        };

        let question_id = {
            let state = self.state.lock().await;
            if state.phase == SessionPhase::Ended {
                return Err(SessionError::AlreadyEnded);
            }
            self.questions[state.current_index].id.clone()
        };

        let is_correct = self
            .checker
            .check_answer(&question_id, user_input)
            .await
            .map_err(|e| {
                log::warn!("Answer check for question {} failed: {}", question_id, e);
                SessionError::AnswerCheck(e)
            })?;

        let reached_end = {
            let mut state = self.state.lock().await;
            if is_correct {
                state.stats.correct_answers += 1;
            } else {
                state.stats.wrong_answers += 1;
            }
            state.now = now;

            if state.current_index + 1 >= self.questions.len() {
                state.phase = SessionPhase::Ended;
                true
            } else {
                state.current_index += 1;
                state.selected_choice = 0;
                false
            }
        };

        if reached_end {
            log::info!("Session for game {} reached its last question", self.game_id);
            if let Err(e) = self.ender.end_game(&self.game_id).await {
                log::error!("Failed to end game {}: {}", self.game_id, e);
            }
        }

        Ok(self.snapshot().await)
    }

    pub async fn phase(&self) -> SessionPhase {
        self.state.lock().await.phase
    }

    pub async fn stats(&self) -> SessionStats {
        self.state.lock().await.stats
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        let current = match state.phase {
            SessionPhase::InProgress => self.questions.get(state.current_index),
            SessionPhase::Ended => None,
        };

        SessionSnapshot {
            phase: state.phase,
            current_index: state.current_index,
            question_count: self.questions.len(),
            current_question: current.map(|q| q.question.clone()),
            options: current.map(|q| q.options.clone()).unwrap_or_default(),
            selected_choice: state.selected_choice,
            stats: state.stats,
            elapsed_seconds: self.elapsed_seconds(state.now),
        }
    }

    /// `None` until the session has ended.
    pub async fn summary(&self) -> Option<SessionSummary> {
        let state = self.state.lock().await;
        if state.phase != SessionPhase::Ended {
            return None;
        }

        Some(SessionSummary::new(
            &self.game_id,
            &self.topic,
            self.game_type,
            state.stats,
            self.elapsed_seconds(state.now),
        ))
    }

    fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.time_started).num_seconds().max(0)
    }
}

fn load_question(question: Question, game_type: GameType) -> Result<SessionQuestion, SessionError> {
    let options = match game_type {
        GameType::OpenEnded => Vec::new(),
        GameType::Mcq => {
            let decoded = question
                .decoded_options()
                .map_err(|source| SessionError::CorruptOptions {
                    question_id: question.id.clone(),
                    source,
                })?;
            match decoded {
                Some(options) if !options.is_empty() => options,
                _ => return Err(SessionError::MissingOptions(question.id)),
            }
        }
    };

    Ok(SessionQuestion {
        id: question.id,
        question: question.question,
        options,
    })
}
