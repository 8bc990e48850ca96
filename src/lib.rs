//! Tournament progression engine: library with models, persistence interface and business logic.

pub mod config;
pub mod error;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{ConfigError, EngineConfig, SeedingPolicy, TieBreaker};
pub use error::{EngineError, ErrorKind};
pub use logic::{
    add_player, all_standings, bracket_state, compute_standings, compute_table, create_team,
    create_tournament, generate_group_stage, head_to_head, list_matches, open_registration,
    register_team, start_tournament, submit_result, top_scorers, tournament_phase,
    try_advance_phase, Advancement, BracketRound, BracketView, CardDetail, GoalDetail, HeadToHead,
    RecordedResult, ResultSubmission, ScorerRow, TeamRow,
};
pub use models::{
    Card, CardType, GameMatch, Goal, GroupLabel, MatchId, MatchPhase, Player, PlayerId,
    Registration, Team, TeamId, Tournament, TournamentFormat, TournamentId, TournamentPhase,
};
pub use store::{ChangeSet, Guard, MemoryStore, Store, StoreError};
