pub mod game_repository;
pub mod in_memory;
pub mod question_repository;

pub use game_repository::{GameRepository, MongoGameRepository};
pub use in_memory::{InMemoryGameRepository, InMemoryQuestionRepository};
pub use question_repository::{AnswerRecord, MongoQuestionRepository, QuestionRepository};
