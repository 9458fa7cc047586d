//! Application-level configuration loading, including the configured game set.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LINEUP_BACK_CONFIG_PATH";

/// How a game's leaderboard is meant to be read by displays. The store always
/// sorts score-descending; this tag only travels to the presentation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoreOrder {
    /// Higher scores rank better.
    #[default]
    Descending,
    /// Lower scores rank better (time trials).
    Ascending,
}

/// One entry of the fixed game set.
#[derive(Clone, Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct Game {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub order: ScoreOrder,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    games: Vec<Game>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to a baked-in default game set.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config = Self { games: raw.games };
                    info!(
                        path = %path.display(),
                        count = app_config.games.len(),
                        "loaded game set from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Build a configuration from an explicit game set (used by tests).
    pub fn with_games(games: Vec<Game>) -> Self {
        Self { games }
    }

    /// The configured game set, in configuration order.
    pub fn games(&self) -> &[Game] {
        &self.games
    }

    /// Whether `id` names a configured game.
    pub fn knows_game(&self, id: &str) -> bool {
        self.games.iter().any(|game| game.id == id)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            games: default_games(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    games: Vec<Game>,
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in game set shipped with the binary.
fn default_games() -> Vec<Game> {
    vec![
        Game {
            id: "1".into(),
            label: "Target Shot".into(),
            order: ScoreOrder::Descending,
        },
        Game {
            id: "2".into(),
            label: "Ring Toss".into(),
            order: ScoreOrder::Descending,
        },
        Game {
            id: "3".into(),
            label: "Speed Run".into(),
            order: ScoreOrder::Ascending,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_is_known() {
        let config = AppConfig::default();
        assert!(config.knows_game("1"));
        assert!(config.knows_game("3"));
        assert!(!config.knows_game("bowling"));
    }

    #[test]
    fn order_defaults_to_descending_when_omitted() {
        let raw: Game =
            serde_json::from_str(r#"{"id": "7", "label": "Darts"}"#).unwrap();
        assert_eq!(raw.order, ScoreOrder::Descending);
    }

    #[test]
    fn game_order_follows_configuration() {
        let config = AppConfig::with_games(vec![
            Game {
                id: "b".into(),
                label: "B".into(),
                order: ScoreOrder::Descending,
            },
            Game {
                id: "a".into(),
                label: "A".into(),
                order: ScoreOrder::Descending,
            },
        ]);
        let ids: Vec<&str> = config.games().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
