pub mod game;
pub mod question;
pub use game::{Game, GameType};
pub use question::{decode_options, encode_options, Question, QuestionDraft};
