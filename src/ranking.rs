//! Wire types for the external ranking service.
//!
//! Scores, nicknames and categories pass through unchanged; the service owns
//! validation and ordering.

use std::fmt;
use std::str::FromStr;

use crate::config::Category;
use crate::quiz::QuizFormat;

pub const RANKING_PATH: &str = "/api/ranking";

/// Why a ranking request failed.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RankingError {
    #[error("ranking request failed: {message}")]
    Transport { message: String },
    #[error("ranking service answered with status {status}")]
    Status { status: u16 },
    #[error("failed to parse ranking response: {message}")]
    Parse { message: String },
    #[error("quiz is not complete")]
    IncompleteQuiz,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown ranking type: {0}")]
pub struct ParseRankingTypeError(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingType {
    #[default]
    Daily,
    AllTime,
}

impl RankingType {
    pub fn as_str(self) -> &'static str {
        match self {
            RankingType::Daily => "daily",
            RankingType::AllTime => "all_time",
        }
    }
}

impl fmt::Display for RankingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingType {
    type Err = ParseRankingTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [RankingType::Daily, RankingType::AllTime]
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| ParseRankingTypeError(value.to_string()))
    }
}

/// Body of `POST /api/ranking`. The quiz category travels as `region`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScoreSubmission {
    pub nickname: String,
    pub score: u64,
    pub region: Category,
    pub format: QuizFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rank {
    pub rank: u32,
    pub nickname: String,
    pub score: u64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RankingResponse {
    pub ranking: Vec<Rank>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SubmitResponse {
    pub data: Rank,
}

/// Filter for `GET /api/ranking`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingQuery {
    pub region: Category,
    pub kind: RankingType,
    pub format: QuizFormat,
}

impl RankingQuery {
    pub fn path(&self) -> String {
        format!(
            "{}?region={}&type={}&format={}",
            RANKING_PATH, self.region, self.kind, self.format
        )
    }
}
