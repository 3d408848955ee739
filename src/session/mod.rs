pub mod collaborators;
pub mod game_session;
pub mod summary;

pub use collaborators::{AnswerChecker, GameEnder};
pub use game_session::{GameSession, SessionError, SessionPhase, SessionSnapshot, SessionStats};
pub use summary::{format_time_delta, SessionSummary};
