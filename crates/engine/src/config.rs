use std::env;

use crate::types::{DEFAULT_GAME_TIME, DEFAULT_SEED};

/// Match configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    /// Number of rounds before the match ends on its own.
    pub game_time: u32,
    /// Seed for fallback move selection.
    pub seed: u32,
    /// Optional path to a layout file. `None` means the built-in maze.
    pub layout_path: Option<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            game_time: DEFAULT_GAME_TIME,
            seed: DEFAULT_SEED,
            layout_path: None,
        }
    }
}

impl MatchConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let game_time = env::var("GRIDMATCH_GAME_TIME")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_GAME_TIME);

        let seed = env::var("GRIDMATCH_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(DEFAULT_SEED);

        let layout_path = env::var("GRIDMATCH_LAYOUT")
            .ok()
            .map(|s| s.trim().to_string())
            .and_then(|s| if s.is_empty() { None } else { Some(s) });

        Self {
            game_time,
            seed,
            layout_path,
        }
    }

    pub fn with_game_time(mut self, game_time: u32) -> Self {
        self.game_time = game_time;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_config_from_env() {
        // Only checks that reading the environment never panics.
        let _config = MatchConfig::from_env();
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = MatchConfig::default().with_game_time(5).with_seed(9);
        assert_eq!(config.game_time, 5);
        assert_eq!(config.seed, 9);
        assert_eq!(config.layout_path, None);
    }
}
