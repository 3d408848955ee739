use std::collections::HashMap;

use crate::models::domain::{GameType, Question};

/// Open-ended answers at or above this similarity count as correct.
pub const OPEN_ENDED_PASS_PERCENTAGE: u32 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerVerdict {
    pub is_correct: bool,
    pub percentage_similar: Option<u32>,
}

pub fn judge_answer(question: &Question, user_input: &str) -> AnswerVerdict {
    match question.question_type {
        GameType::Mcq => AnswerVerdict {
            is_correct: answers_match(&question.answer, user_input),
            percentage_similar: None,
        },
        GameType::OpenEnded => {
            let percentage = (similarity(&question.answer, user_input) * 100.0).round() as u32;
            AnswerVerdict {
                is_correct: percentage >= OPEN_ENDED_PASS_PERCENTAGE,
                percentage_similar: Some(percentage),
            }
        }
    }
}

pub fn answers_match(expected: &str, user_input: &str) -> bool {
    expected.trim().to_lowercase() == user_input.trim().to_lowercase()
}

/// Sørensen–Dice coefficient over character bigrams, ignoring case and
/// whitespace. 1.0 for identical input, 0.0 when nothing overlaps.
pub fn similarity(first: &str, second: &str) -> f64 {
    let first = comparable_chars(first);
    let second = comparable_chars(second);

    if first == second {
        return 1.0;
    }
    if first.len() < 2 || second.len() < 2 {
        return 0.0;
    }

    let mut bigrams: HashMap<(char, char), usize> = HashMap::new();
    for pair in first.windows(2) {
        *bigrams.entry((pair[0], pair[1])).or_insert(0) += 1;
    }

    let mut shared = 0usize;
    for pair in second.windows(2) {
        if let Some(count) = bigrams.get_mut(&(pair[0], pair[1])) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    (2 * shared) as f64 / (first.len() + second.len() - 2) as f64
}

fn comparable_chars(text: &str) -> Vec<char> {
    text.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
