use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum GameType {
    #[serde(rename = "mcq")]
    Mcq, // four options, one of them correct
    #[serde(rename = "open_ended")]
    OpenEnded,
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::Mcq => write!(f, "mcq"),
            GameType::OpenEnded => write!(f, "open_ended"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Game {
    pub id: String,
    pub topic: String,
    pub game_type: GameType,
    pub time_started: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_ended: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(topic: &str, game_type: GameType) -> Self {
        Game {
            id: Uuid::new_v4().to_string(),
            topic: topic.to_string(),
            game_type,
            time_started: Utc::now(),
            time_ended: None,
        }
    }

    pub fn has_ended(&self) -> bool {
        self.time_ended.is_some()
    }

    /// Whole seconds between start and end, `None` while the game is running.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.time_ended
            .map(|ended| (ended - self.time_started).num_seconds().max(0))
    }
}
