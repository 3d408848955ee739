use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::domain::GameType;

pub const MAX_QUESTIONS_PER_GAME: u32 = 10;

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameRequest {
    #[validate(range(min = 1, max = MAX_QUESTIONS_PER_GAME))]
    pub amount: u32,

    #[serde(alias = "type")]
    pub quiz_type: GameType,

    #[validate(length(min = 1, max = 100))]
    pub topic: String,
}

impl CreateGameRequest {
    /// Runs the derived rules plus the ones the derive cannot express.
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        if self.topic.trim().is_empty() {
            return Err(AppError::ValidationError(
                "topic: must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerRequest {
    #[validate(length(min = 1, max = 100))]
    pub question_id: String,

    #[validate(length(max = 1000))]
    pub user_input: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EndGameRequest {
    #[validate(length(min = 1, max = 100))]
    pub game_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(amount: u32, topic: &str) -> CreateGameRequest {
        CreateGameRequest {
            amount,
            quiz_type: GameType::Mcq,
            topic: topic.to_string(),
        }
    }

    #[test]
    fn test_valid_create_game_request() {
        assert!(create_request(4, "software development").check().is_ok());
        assert!(create_request(MAX_QUESTIONS_PER_GAME, "x").check().is_ok());
    }

    #[test]
    fn test_amount_out_of_range() {
        assert!(matches!(
            create_request(0, "rust").check(),
            Err(AppError::ValidationError(_))
        ));
        assert!(create_request(MAX_QUESTIONS_PER_GAME + 1, "rust").check().is_err());
    }

    #[test]
    fn test_blank_topic_rejected() {
        assert!(create_request(3, "").check().is_err());
        assert!(matches!(
            create_request(3, "   ").check(),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_create_game_request_wire_format() {
        let request: CreateGameRequest = serde_json::from_str(
            r#"{"amount": 4, "quizType": "open_ended", "topic": "databases"}"#,
        )
        .expect("request should deserialize");
        assert_eq!(request.quiz_type, GameType::OpenEnded);

        let legacy: CreateGameRequest =
            serde_json::from_str(r#"{"amount": 2, "type": "mcq", "topic": "networking"}"#)
                .expect("legacy field name should deserialize");
        assert_eq!(legacy.quiz_type, GameType::Mcq);
    }

    #[test]
    fn test_check_answer_request_wire_format() {
        let request: CheckAnswerRequest =
            serde_json::from_str(r#"{"questionId": "q-1", "userInput": "let"}"#)
                .expect("request should deserialize");

        assert_eq!(request.question_id, "q-1");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_end_game_request_requires_id() {
        let request = EndGameRequest {
            game_id: String::new(),
        };
        assert!(request.validate().is_err());
    }
}
