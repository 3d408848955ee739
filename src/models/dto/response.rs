use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::domain::{Game, GameType, Question};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGameResponse {
    pub game_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAnswerResponse {
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage_similar: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGameResponse {
    pub message: String,
}

/// A question as shown to the player; the answer is withheld.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDto {
    pub id: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
}

impl From<Question> for QuestionDto {
    fn from(question: Question) -> Self {
        QuestionDto {
            id: question.id,
            question: question.question,
            options: question.options,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDto {
    pub id: String,
    pub topic: String,
    pub game_type: GameType,
    pub time_started: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ended: Option<DateTime<Utc>>,
    pub questions: Vec<QuestionDto>,
}

impl GameDto {
    pub fn new(game: Game, questions: Vec<Question>) -> Self {
        GameDto {
            id: game.id,
            topic: game.topic,
            game_type: game.game_type,
            time_started: game.time_started,
            time_ended: game.time_ended,
            questions: questions.into_iter().map(QuestionDto::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::domain::QuestionDraft;

    #[test]
    fn test_game_dto_hides_answers() {
        let game = Game::new("operating systems", GameType::Mcq);
        let question = Question::from_draft(
            QuestionDraft {
                question: "What schedules threads?".to_string(),
                answer: "The kernel".to_string(),
                options: Some(vec![
                    "The kernel".to_string(),
                    "The linker".to_string(),
                    "The shell".to_string(),
                    "The BIOS".to_string(),
                ]),
            },
            &game.id,
            0,
            GameType::Mcq,
        )
        .expect("draft converts");

        let dto = GameDto::new(game.clone(), vec![question]);
        let json = serde_json::to_value(&dto).expect("dto serializes");

        assert_eq!(json["id"], game.id.as_str());
        assert_eq!(json["gameType"], "mcq");
        assert!(json["questions"][0].get("answer").is_none());
        assert!(json["questions"][0]["options"].is_string());
    }

    #[test]
    fn test_check_answer_response_omits_missing_percentage() {
        let json = serde_json::to_value(CheckAnswerResponse {
            is_correct: true,
            percentage_similar: None,
        })
        .expect("response serializes");

        assert_eq!(json, serde_json::json!({ "isCorrect": true }));
    }
}
