//! Engine errors and the coarse kinds callers map onto their transport.

use crate::models::{GroupLabel, MatchId, PlayerId, TeamId, TournamentId, TournamentPhase};
use crate::store::StoreError;

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("team {0} not found")]
    TeamNotFound(TeamId),
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("group {0} not found")]
    GroupNotFound(GroupLabel),
    /// The team is already registered for this tournament.
    #[error("team {team_id} is already registered for tournament {tournament_id}")]
    DuplicateRegistration {
        tournament_id: TournamentId,
        team_id: TeamId,
    },
    /// The match was written by someone else since it was read.
    #[error("match {match_id} has version {actual}, expected {expected}")]
    ConcurrencyConflict {
        match_id: MatchId,
        expected: u64,
        actual: u64,
    },
    /// Group fixtures already exist for this tournament.
    #[error("tournament {0} has already been started")]
    AlreadyStarted(TournamentId),
    #[error("need at least {required} registered teams, have {registered}")]
    InsufficientParticipants { required: usize, registered: usize },
    #[error("{qualifiers} knockout qualifiers exceed the largest bracket of 16")]
    BracketTooLarge { qualifiers: usize },
    #[error("invalid score: {0}")]
    InvalidScore(String),
    /// A knockout match ended level without a deciding shoot-out.
    #[error("knockout match cannot end in a draw without distinct penalty counts")]
    DrawNotAllowed,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("operation not allowed while tournament is in phase {actual:?}")]
    WrongPhase { actual: TournamentPhase },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Coarse error taxonomy for callers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    WrongPhase,
    Store,
}

impl ErrorKind {
    /// Conflicts clear up after re-reading state; everything else needs different input.
    pub fn is_retryable(self) -> bool {
        self == ErrorKind::Conflict
    }
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        use EngineError::*;
        match self {
            TournamentNotFound(_)
            | TeamNotFound(_)
            | PlayerNotFound(_)
            | MatchNotFound(_)
            | GroupNotFound(_) => ErrorKind::NotFound,
            DuplicateRegistration { .. } | ConcurrencyConflict { .. } | AlreadyStarted(_) => {
                ErrorKind::Conflict
            }
            InsufficientParticipants { .. }
            | BracketTooLarge { .. }
            | InvalidScore(_)
            | DrawNotAllowed
            | InvalidInput(_) => ErrorKind::Validation,
            WrongPhase { .. } => ErrorKind::WrongPhase,
            Store(_) => ErrorKind::Store,
        }
    }
}
