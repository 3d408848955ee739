use serde::Serialize;

use crate::constants::quiz_prompt::{
    MCQ_OUTPUT_FORMAT, MCQ_SYSTEM_PROMPT, OPEN_ENDED_OUTPUT_FORMAT, OPEN_ENDED_SYSTEM_PROMPT,
    OUTPUT_INSTRUCTIONS,
};
use crate::models::domain::GameType;

/// The two chat messages sent to the model for one generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessages {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl PromptMessages {
    pub fn to_chat_messages(&self) -> Vec<ChatMessage<'_>> {
        vec![
            ChatMessage {
                role: "system",
                content: &self.system,
            },
            ChatMessage {
                role: "user",
                content: &self.user,
            },
        ]
    }
}

/// Callers validate `amount` and `topic`; any input produces a prompt.
pub fn build_prompt(amount: u32, game_type: GameType, topic: &str) -> PromptMessages {
    let (system, format) = match game_type {
        GameType::Mcq => (MCQ_SYSTEM_PROMPT, MCQ_OUTPUT_FORMAT),
        GameType::OpenEnded => (OPEN_ENDED_SYSTEM_PROMPT, OPEN_ENDED_OUTPUT_FORMAT),
    };

    PromptMessages {
        system: system.to_string(),
        user: format!(
            "Generate {} hard questions about {} in a valid JSON array:\n{}\n{}",
            amount, topic, format, OUTPUT_INSTRUCTIONS
        ),
    }
}
