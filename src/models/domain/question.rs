use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::domain::game::GameType;

/// A stored question. `options` is the JSON-encoded option list for
/// multiple choice questions and `None` for open-ended ones.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Question {
    pub id: String,
    pub game_id: String,
    pub position: u32,
    pub question: String,
    pub answer: String,
    pub question_type: GameType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_correct: Option<u32>,
}

/// A validated question before it is attached to a game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question: String,
    pub answer: String,
    pub options: Option<Vec<String>>,
}

impl Question {
    pub fn from_draft(
        draft: QuestionDraft,
        game_id: &str,
        position: u32,
        question_type: GameType,
    ) -> AppResult<Self> {
        let options = draft
            .options
            .as_deref()
            .map(encode_options)
            .transpose()?;

        Ok(Question {
            id: Uuid::new_v4().to_string(),
            game_id: game_id.to_string(),
            position,
            question: draft.question,
            answer: draft.answer,
            question_type,
            options,
            user_answer: None,
            is_correct: None,
            percentage_correct: None,
        })
    }

    pub fn decoded_options(&self) -> AppResult<Option<Vec<String>>> {
        self.options.as_deref().map(decode_options).transpose()
    }
}

pub fn encode_options(options: &[String]) -> AppResult<String> {
    Ok(serde_json::to_string(options)?)
}

pub fn decode_options(encoded: &str) -> AppResult<Vec<String>> {
    serde_json::from_str(encoded)
        .map_err(|e| AppError::InternalError(format!("Stored options are not a JSON string array: {}", e)))
}
