use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Game;
use crate::dao::models::RankingRecord;

/// Leaderboard row as shown on the live displays; the phone number stays
/// server-side.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct RankingEntryDto {
    pub name: String,
    pub score: i64,
}

impl From<RankingRecord> for RankingEntryDto {
    fn from(record: RankingRecord) -> Self {
        Self {
            name: record.name,
            score: record.score,
        }
    }
}

/// Complete leaderboard row for the administrative view.
#[derive(Debug, Serialize, ToSchema)]
pub struct FullRankingEntryDto {
    pub name: String,
    pub phone_number: String,
    pub game: String,
    pub score: i64,
}

impl From<RankingRecord> for FullRankingEntryDto {
    fn from(record: RankingRecord) -> Self {
        Self {
            name: record.name,
            phone_number: record.phone_number,
            game: record.game,
            score: record.score,
        }
    }
}

/// Payload used to delete a single leaderboard row by exact value match.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteRankingRequest {
    pub name: String,
    pub game: String,
    pub score: i64,
}

/// The configured game set exposed to clients. `games` stays a plain id
/// list; labels and score polarity ride along in `details` for displays
/// that want them.
#[derive(Debug, Serialize, ToSchema)]
pub struct GamesResponse {
    pub games: Vec<String>,
    pub details: Vec<Game>,
}

impl GamesResponse {
    pub fn new(games: &[Game]) -> Self {
        Self {
            games: games.iter().map(|game| game.id.clone()).collect(),
            details: games.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::AppConfig;

    use super::*;

    #[test]
    fn games_field_is_a_plain_id_list() {
        let config = AppConfig::default();
        let response = GamesResponse::new(config.games());
        let value = serde_json::to_value(&response).unwrap();

        let ids = value["games"].as_array().unwrap();
        assert!(ids.iter().all(|id| id.is_string()));
        assert_eq!(ids.len(), config.games().len());
        assert!(value["details"][0]["label"].is_string());
    }
}
