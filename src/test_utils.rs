#[cfg(test)]
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::models::domain::{Game, GameType, Question, QuestionDraft};

    /// A well-formed multiple choice model reply; question `i` has answer `answer i`.
    pub fn mcq_response(count: usize) -> String {
        let items: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "question": format!("Question {}?", i),
                    "answer": format!("answer {}", i),
                    "option1": format!("first decoy {}", i),
                    "option2": format!("second decoy {}", i),
                    "option3": format!("third decoy {}", i),
                })
            })
            .collect();
        Value::Array(items).to_string()
    }

    /// An open-ended model reply in the loose style models often produce.
    pub fn open_ended_response(count: usize) -> String {
        let items: Vec<String> = (0..count)
            .map(|i| {
                format!(
                    "{{question: 'Who led expedition {}?', answer: 'Captain number {}'}}",
                    i, i
                )
            })
            .collect();
        format!("```json\n[{}]\n```", items.join(", "))
    }

    pub fn test_game(game_type: GameType) -> Game {
        Game::new("software development", game_type)
    }

    pub fn test_question(game: &Game, position: u32) -> Question {
        let options = match game.game_type {
            GameType::Mcq => Some(vec![
                "Borrow checker".to_string(),
                "Garbage collector".to_string(),
                "Reference counting".to_string(),
                "Manual free".to_string(),
            ]),
            GameType::OpenEnded => None,
        };
        Question::from_draft(
            QuestionDraft {
                question: format!("How does Rust manage memory? ({})", position),
                answer: "Borrow checker".to_string(),
                options,
            },
            &game.id,
            position,
            game.game_type,
        )
        .expect("fixture question should encode")
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use crate::models::domain::GameType;
    use crate::services::response_normalizer::normalize_questions;

    #[test]
    fn test_canned_responses_normalize() {
        let mut rng = rand::rng();

        let mcq = normalize_questions(&mcq_response(3), GameType::Mcq, &mut rng).unwrap();
        assert_eq!(mcq.len(), 3);
        assert_eq!(mcq[2].answer, "answer 2");

        let open = normalize_questions(&open_ended_response(2), GameType::OpenEnded, &mut rng).unwrap();
        assert_eq!(open.len(), 2);
        assert_eq!(open[1].answer, "Captain number 1");
    }

    #[test]
    fn test_fixture_questions_belong_to_their_game() {
        let game = test_game(GameType::Mcq);
        let question = test_question(&game, 2);

        assert_eq!(question.game_id, game.id);
        assert_eq!(question.position, 2);
        assert_eq!(question.decoded_options().unwrap().unwrap().len(), 4);
    }
}
