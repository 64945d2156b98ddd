use thiserror::Error;

/// Failures that stop a match (or stop it from starting).
///
/// Per-move player faults never show up here; the resolver turns them into
/// events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Registered players do not line up with board teams.
    #[error("board uses {teams} teams, but {players} players are registered")]
    TeamMismatch { teams: usize, players: usize },

    /// Observer registered after the match left `NotStarted`.
    #[error("observers must be registered before the first round")]
    InvalidObserver,

    #[error("match has already finished")]
    AlreadyFinished,

    /// The board rejected a move the engine chose itself, or offered none.
    #[error("board failure: {0}")]
    Board(String),
}

impl MatchError {
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::TeamMismatch { .. } => "team_mismatch",
            MatchError::InvalidObserver => "invalid_observer",
            MatchError::AlreadyFinished => "already_finished",
            MatchError::Board(_) => "board_failure",
        }
    }

    /// Setup errors are raised before any round runs.
    pub fn is_setup_error(&self) -> bool {
        matches!(
            self,
            MatchError::TeamMismatch { .. } | MatchError::InvalidObserver
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_mismatch_message() {
        let err = MatchError::TeamMismatch {
            teams: 2,
            players: 1,
        };
        assert_eq!(err.code(), "team_mismatch");
        assert!(err.is_setup_error());
        assert!(err.to_string().contains("2 teams"));
    }

    #[test]
    fn test_board_failure_is_not_setup() {
        let err = MatchError::Board("no legal moves".into());
        assert_eq!(err.code(), "board_failure");
        assert!(!err.is_setup_error());
    }
}
