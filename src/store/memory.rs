//! In-memory store: all tables behind one RwLock.

use crate::models::{
    Card, GameMatch, Goal, MatchId, Player, PlayerId, Registration, Team, TeamId, Tournament,
    TournamentId,
};
use crate::store::{ChangeSet, Guard, Store, StoreError};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    tournaments: HashMap<TournamentId, Tournament>,
    teams: HashMap<TeamId, Team>,
    players: HashMap<PlayerId, Player>,
    /// Insertion order kept so queries are stable.
    registrations: Vec<Registration>,
    matches: HashMap<MatchId, GameMatch>,
    goals: HashMap<MatchId, Vec<Goal>>,
    cards: HashMap<MatchId, Vec<Card>>,
}

impl Tables {
    fn holds(&self, guard: &Guard) -> bool {
        match guard {
            Guard::Phase {
                tournament_id,
                phase,
            } => self
                .tournaments
                .get(tournament_id)
                .is_some_and(|t| t.phase == *phase),
            Guard::MatchVersion { match_id, version } => self
                .matches
                .get(match_id)
                .is_some_and(|m| m.version == *version),
            Guard::NoMatchesInPhase {
                tournament_id,
                phase,
            } => !self
                .matches
                .values()
                .any(|m| m.tournament_id == *tournament_id && m.phase == *phase),
            Guard::NotRegistered {
                tournament_id,
                team_id,
            } => !self
                .registrations
                .iter()
                .any(|r| r.tournament_id == *tournament_id && r.team_id == *team_id),
        }
    }

    fn apply(&mut self, changes: ChangeSet) {
        for t in changes.tournaments {
            self.tournaments.insert(t.id, t);
        }
        for t in changes.teams {
            self.teams.insert(t.id, t);
        }
        for p in changes.players {
            self.players.insert(p.id, p);
        }
        for r in changes.registrations {
            match self
                .registrations
                .iter_mut()
                .find(|x| x.tournament_id == r.tournament_id && x.team_id == r.team_id)
            {
                Some(existing) => *existing = r,
                None => self.registrations.push(r),
            }
        }
        for m in changes.matches {
            self.matches.insert(m.id, m);
        }
        for (match_id, goals) in changes.goals {
            self.goals.insert(match_id, goals);
        }
        for (match_id, cards) in changes.cards {
            self.cards.insert(match_id, cards);
        }
    }
}

/// Reference [`Store`] used by the web binary and the tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

impl Store for MemoryStore {
    fn tournament(&self, id: TournamentId) -> Result<Option<Tournament>, StoreError> {
        Ok(self.read()?.tournaments.get(&id).cloned())
    }

    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError> {
        Ok(self.read()?.teams.get(&id).cloned())
    }

    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        Ok(self.read()?.players.get(&id).cloned())
    }

    fn game(&self, id: MatchId) -> Result<Option<GameMatch>, StoreError> {
        Ok(self.read()?.matches.get(&id).cloned())
    }

    fn registrations(
        &self,
        filter: &dyn Fn(&Registration) -> bool,
    ) -> Result<Vec<Registration>, StoreError> {
        Ok(self
            .read()?
            .registrations
            .iter()
            .filter(|r| filter(r))
            .cloned()
            .collect())
    }

    fn players(&self, filter: &dyn Fn(&Player) -> bool) -> Result<Vec<Player>, StoreError> {
        Ok(self
            .read()?
            .players
            .values()
            .filter(|p| filter(p))
            .cloned()
            .collect())
    }

    fn matches(&self, filter: &dyn Fn(&GameMatch) -> bool) -> Result<Vec<GameMatch>, StoreError> {
        Ok(self
            .read()?
            .matches
            .values()
            .filter(|m| filter(m))
            .cloned()
            .collect())
    }

    fn goals(&self, filter: &dyn Fn(&Goal) -> bool) -> Result<Vec<Goal>, StoreError> {
        Ok(self
            .read()?
            .goals
            .values()
            .flatten()
            .filter(|g| filter(g))
            .cloned()
            .collect())
    }

    fn cards(&self, filter: &dyn Fn(&Card) -> bool) -> Result<Vec<Card>, StoreError> {
        Ok(self
            .read()?
            .cards
            .values()
            .flatten()
            .filter(|c| filter(c))
            .cloned()
            .collect())
    }

    fn commit(&self, changes: ChangeSet) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        if let Some(failed) = changes.guards.iter().find(|g| !tables.holds(g)) {
            return Err(StoreError::GuardFailed(failed.clone()));
        }
        tables.apply(changes);
        Ok(())
    }
}
