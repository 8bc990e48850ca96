//! Data records for the tournament engine: tournaments, teams, players, matches and their details.

mod game;
mod player;
mod team;
mod tournament;

pub use game::{Card, CardType, GameMatch, Goal, GroupLabel, MatchId, MatchPhase};
pub use player::{Player, PlayerId};
pub use team::{in_registration_order, Registration, Team, TeamId};
pub use tournament::{Tournament, TournamentFormat, TournamentId, TournamentPhase};
