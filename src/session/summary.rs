use serde::Serialize;

use crate::models::domain::GameType;
use crate::session::game_session::SessionStats;

/// What a finished session reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub game_id: String,
    pub topic: String,
    pub game_type: GameType,
    pub stats: SessionStats,
    pub elapsed_seconds: i64,
    pub duration: String,
}

impl SessionSummary {
    pub fn new(
        game_id: &str,
        topic: &str,
        game_type: GameType,
        stats: SessionStats,
        elapsed_seconds: i64,
    ) -> Self {
        let elapsed_seconds = elapsed_seconds.max(0);
        Self {
            game_id: game_id.to_string(),
            topic: topic.to_string(),
            game_type,
            stats,
            elapsed_seconds,
            duration: format_time_delta(elapsed_seconds),
        }
    }

    /// Share of correct answers, rounded to a whole percent.
    pub fn accuracy_percentage(&self) -> u32 {
        let answered = self.stats.answered();
        if answered == 0 {
            return 0;
        }
        ((self.stats.correct_answers as f64 / answered as f64) * 100.0).round() as u32
    }
}

/// Renders seconds as `1h 2m 3s`, leaving out zero units.
pub fn format_time_delta(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let parts: Vec<String> = [(hours, "h"), (minutes, "m"), (secs, "s")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "0s".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_each_unit() {
        assert_eq!(format_time_delta(3723), "1h 2m 3s");
        assert_eq!(format_time_delta(3600), "1h");
        assert_eq!(format_time_delta(61), "1m 1s");
        assert_eq!(format_time_delta(45), "45s");
        assert_eq!(format_time_delta(7260), "2h 1m");
    }

    #[test]
    fn test_zero_and_negative_are_zero_seconds() {
        assert_eq!(format_time_delta(0), "0s");
        assert_eq!(format_time_delta(-5), "0s");
    }

    #[test]
    fn test_summary_reports_accuracy() {
        let stats = SessionStats {
            correct_answers: 3,
            wrong_answers: 1,
        };
        let summary = SessionSummary::new("g-1", "rust", GameType::Mcq, stats, 95);

        assert_eq!(summary.duration, "1m 35s");
        assert_eq!(summary.accuracy_percentage(), 75);

        let empty = SessionSummary::new("g-2", "rust", GameType::Mcq, SessionStats::default(), -1);
        assert_eq!(empty.elapsed_seconds, 0);
        assert_eq!(empty.accuracy_percentage(), 0);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = SessionSummary::new("g-1", "rust", GameType::OpenEnded, SessionStats::default(), 3);
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["gameId"], "g-1");
        assert_eq!(json["gameType"], "open_ended");
        assert_eq!(json["elapsedSeconds"], 3);
        assert_eq!(json["stats"]["correctAnswers"], 0);
    }
}
