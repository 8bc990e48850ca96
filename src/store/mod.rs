//! Persistence interface the engine reads and writes through.
//!
//! Reads are id lookups or predicate queries. Every write goes through [`Store::commit`], which
//! applies a [`ChangeSet`] all-or-nothing after checking its [`Guard`]s under the same lock.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    Card, GameMatch, Goal, MatchId, MatchPhase, Player, PlayerId, Registration, Team, TeamId,
    Tournament, TournamentId, TournamentPhase,
};

/// A condition that must hold at commit time for the change set to be applied.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Guard {
    /// Tournament is currently in `phase`.
    Phase {
        tournament_id: TournamentId,
        phase: TournamentPhase,
    },
    /// Match's stored version token equals `version`.
    MatchVersion { match_id: MatchId, version: u64 },
    /// Tournament has no match in `phase` yet.
    NoMatchesInPhase {
        tournament_id: TournamentId,
        phase: MatchPhase,
    },
    /// Team is not yet registered for the tournament.
    NotRegistered {
        tournament_id: TournamentId,
        team_id: TeamId,
    },
}

/// Errors reported by a store. Passed through the engine unmodified.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("commit guard failed: {0:?}")]
    GuardFailed(Guard),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// One atomic unit of writes.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    pub guards: Vec<Guard>,
    pub tournaments: Vec<Tournament>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub registrations: Vec<Registration>,
    pub matches: Vec<GameMatch>,
    /// Replaces every goal row of the match.
    pub goals: Vec<(MatchId, Vec<Goal>)>,
    /// Replaces every card row of the match.
    pub cards: Vec<(MatchId, Vec<Card>)>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn guard_all(mut self, guards: impl IntoIterator<Item = Guard>) -> Self {
        self.guards.extend(guards);
        self
    }

    pub fn tournament(mut self, tournament: Tournament) -> Self {
        self.tournaments.push(tournament);
        self
    }

    pub fn team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    pub fn player(mut self, player: Player) -> Self {
        self.players.push(player);
        self
    }

    pub fn registration(mut self, registration: Registration) -> Self {
        self.registrations.push(registration);
        self
    }

    pub fn game(mut self, game: GameMatch) -> Self {
        self.matches.push(game);
        self
    }

    pub fn games(mut self, games: impl IntoIterator<Item = GameMatch>) -> Self {
        self.matches.extend(games);
        self
    }

    pub fn goals(mut self, match_id: MatchId, goals: Vec<Goal>) -> Self {
        self.goals.push((match_id, goals));
        self
    }

    pub fn cards(mut self, match_id: MatchId, cards: Vec<Card>) -> Self {
        self.cards.push((match_id, cards));
        self
    }
}

/// Storage the engine runs against. Implementations must make `commit` atomic and check guards
/// under the lock that applies the writes.
pub trait Store: Send + Sync {
    fn tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError>;
    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError>;
    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError>;
    fn game(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError>;

    fn registrations(
        &self,
        filter: &dyn Fn(&Registration) -> bool,
    ) -> Result<Vec<Registration>, StoreError>;
    fn players(&self, filter: &dyn Fn(&Player) -> bool) -> Result<Vec<Player>, StoreError>;
    fn matches(&self, filter: &dyn Fn(&GameMatch) -> bool) -> Result<Vec<GameMatch>, StoreError>;
    fn goals(&self, filter: &dyn Fn(&Goal) -> bool) -> Result<Vec<Goal>, StoreError>;
    fn cards(&self, filter: &dyn Fn(&Card) -> bool) -> Result<Vec<Card>, StoreError>;

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError>;
}
