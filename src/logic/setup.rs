//! Setup: tournaments, teams, players, registration, and starting the tournament.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::logic::bracket::{try_advance_phase, Advancement};
use crate::logic::fixtures::generate_group_stage;
use crate::models::{
    GameMatch, MatchPhase, Player, Registration, Team, TeamId, Tournament, TournamentFormat,
    TournamentId, TournamentPhase,
};
use crate::store::{ChangeSet, Guard, Store, StoreError};
use chrono::NaiveDate;
use log::info;

fn require_name(name: &str) -> Result<&str, EngineError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput("name cannot be empty".into()));
    }
    Ok(trimmed)
}

fn load_tournament(store: &dyn Store, id: TournamentId) -> Result<Tournament, EngineError> {
    store
        .tournament(id)?
        .ok_or(EngineError::TournamentNotFound(id))
}

/// Create a tournament in Draft.
pub fn create_tournament(
    store: &dyn Store,
    name: &str,
    format: TournamentFormat,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Tournament, EngineError> {
    let name = require_name(name)?;
    if end_date < start_date {
        return Err(EngineError::InvalidInput(
            "end date is before start date".into(),
        ));
    }
    let tournament = Tournament::new(name, format, start_date, end_date);
    store.commit(ChangeSet::new().tournament(tournament.clone()))?;
    info!("Created tournament {} ({:?})", tournament.id, format);
    Ok(tournament)
}

/// Draft -> Open.
pub fn open_registration(
    store: &dyn Store,
    tournament_id: TournamentId,
) -> Result<Tournament, EngineError> {
    let mut tournament = load_tournament(store, tournament_id)?;
    if !tournament
        .phase
        .can_advance_to(TournamentPhase::Open, tournament.format)
    {
        return Err(EngineError::WrongPhase {
            actual: tournament.phase,
        });
    }
    tournament.phase = TournamentPhase::Open;
    let changes = ChangeSet::new()
        .guard(Guard::Phase {
            tournament_id,
            phase: TournamentPhase::Draft,
        })
        .tournament(tournament.clone());
    commit_in_phase(store, tournament_id, changes)?;
    Ok(tournament)
}

pub fn create_team(store: &dyn Store, name: &str) -> Result<Team, EngineError> {
    let team = Team::new(require_name(name)?);
    store.commit(ChangeSet::new().team(team.clone()))?;
    Ok(team)
}

pub fn add_player(store: &dyn Store, team_id: TeamId, name: &str) -> Result<Player, EngineError> {
    let name = require_name(name)?;
    store
        .team(team_id)?
        .ok_or(EngineError::TeamNotFound(team_id))?;
    let player = Player::new(name, team_id);
    store.commit(ChangeSet::new().player(player.clone()))?;
    Ok(player)
}

/// Register a team for a tournament (Draft or Open only, once per team).
pub fn register_team(
    store: &dyn Store,
    tournament_id: TournamentId,
    team_id: TeamId,
) -> Result<Registration, EngineError> {
    let tournament = load_tournament(store, tournament_id)?;
    store
        .team(team_id)?
        .ok_or(EngineError::TeamNotFound(team_id))?;
    if !tournament.phase.accepts_registrations() {
        return Err(EngineError::WrongPhase {
            actual: tournament.phase,
        });
    }

    let registration = Registration::new(tournament_id, team_id);
    let changes = ChangeSet::new()
        .guard(Guard::Phase {
            tournament_id,
            phase: tournament.phase,
        })
        .guard(Guard::NotRegistered {
            tournament_id,
            team_id,
        })
        .registration(registration.clone());
    match store.commit(changes) {
        Ok(()) => {}
        Err(StoreError::GuardFailed(Guard::NotRegistered { .. })) => {
            return Err(EngineError::DuplicateRegistration {
                tournament_id,
                team_id,
            })
        }
        Err(StoreError::GuardFailed(_)) => {
            let actual = load_tournament(store, tournament_id)?.phase;
            return Err(EngineError::WrongPhase { actual });
        }
        Err(e) => return Err(e.into()),
    }
    info!("Team {} registered for tournament {}", team_id, tournament_id);
    Ok(registration)
}

/// Start the tournament: generate the group stage. A cup has no groups, so its first knockout
/// round is seeded straight away. Returns every match created.
pub fn start_tournament(
    store: &dyn Store,
    config: &EngineConfig,
    tournament_id: TournamentId,
) -> Result<Vec<GameMatch>, EngineError> {
    let mut matches = generate_group_stage(store, config, tournament_id)?;
    if matches.is_empty() {
        if let Advancement::RoundGenerated { matches: first_round } =
            try_advance_phase(store, config, tournament_id)?
        {
            matches = first_round;
        }
    }
    Ok(matches)
}

pub fn tournament_phase(
    store: &dyn Store,
    tournament_id: TournamentId,
) -> Result<TournamentPhase, EngineError> {
    Ok(load_tournament(store, tournament_id)?.phase)
}

/// Matches of a tournament in schedule order, optionally narrowed to one phase and to played or
/// open matches.
pub fn list_matches(
    store: &dyn Store,
    tournament_id: TournamentId,
    phase: Option<MatchPhase>,
    played: Option<bool>,
) -> Result<Vec<GameMatch>, EngineError> {
    load_tournament(store, tournament_id)?;
    let mut matches = store.matches(&|m| {
        m.tournament_id == tournament_id
            && phase.map_or(true, |p| m.phase == p)
            && played.map_or(true, |p| m.played == p)
    })?;
    matches.sort_by(|a, b| {
        (a.scheduled_date, &a.group, a.matchday, a.phase.round_rank(), a.bracket_slot).cmp(&(
            b.scheduled_date,
            &b.group,
            b.matchday,
            b.phase.round_rank(),
            b.bracket_slot,
        ))
    });
    Ok(matches)
}

fn commit_in_phase(
    store: &dyn Store,
    tournament_id: TournamentId,
    changes: ChangeSet,
) -> Result<(), EngineError> {
    match store.commit(changes) {
        Ok(()) => Ok(()),
        Err(StoreError::GuardFailed(_)) => {
            let actual = load_tournament(store, tournament_id)?.phase;
            Err(EngineError::WrongPhase { actual })
        }
        Err(e) => Err(e.into()),
    }
}
