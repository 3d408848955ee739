use async_trait::async_trait;

use crate::errors::AppResult;

/// Decides whether `user_input` answers the stored question.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerChecker: Send + Sync {
    async fn check_answer(&self, question_id: &str, user_input: &str) -> AppResult<bool>;
}

/// Marks a game as finished once its last question has been answered.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameEnder: Send + Sync {
    async fn end_game(&self, game_id: &str) -> AppResult<()>;
}
