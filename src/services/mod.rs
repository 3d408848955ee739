pub mod answer_checker;
pub mod json_repair;
pub mod model_service;
pub mod prompt_builder;
pub mod quiz_service;
pub mod response_normalizer;

pub use model_service::{CompletionClient, OpenAiModelService};
pub use quiz_service::QuizService;
