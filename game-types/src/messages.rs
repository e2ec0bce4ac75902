use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameError, PlayRecord, UserProfile};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProfileResponse {
    pub profile: UserProfile,
    pub history: Vec<PlayRecord>,
    pub total_plays: u32,
    pub total_wins: u32,
}

/// Play totals for a set of records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlaySummary {
    pub total_plays: u32,
    pub total_wins: u32,
    /// Percentage with one decimal place, `"0"` when there are no plays.
    pub win_rate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyResults {
    pub date: NaiveDate,
    pub summary: PlaySummary,
    pub results: Vec<PlayRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AdminReport {
    pub summary: PlaySummary,
    /// Newest date first.
    pub days: Vec<DailyResults>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ApiError {
    pub error: GameError,
    pub message: String,
}

impl From<GameError> for ApiError {
    fn from(error: GameError) -> Self {
        let message = error.to_string();
        Self { error, message }
    }
}
