//! Knockout bracket: seeding the first round when the group stage completes, generating each
//! following round exactly once, and completing the tournament after the final.
//!
//! Every write here is a guarded commit. Two callers that both see a finished round race on
//! `NoMatchesInPhase` for the next round; the loser's commit is refused and it reports
//! `NoAction`. The commit also pins the version of every match the decision was read from, so a
//! result corrected in between voids it and the next call recomputes from the stored scores.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::logic::seeding::{bracket_size, first_round_pairings, select_qualifiers, separate_groups};
use crate::logic::standings::tables_by_group;
use crate::models::{
    in_registration_order, GameMatch, GroupLabel, MatchPhase, TeamId, Tournament,
    TournamentFormat, TournamentId, TournamentPhase,
};
use crate::store::{ChangeSet, Guard, Store, StoreError};
use chrono::{Duration, NaiveDate};
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;

/// Largest bracket with a named first round (Round of 16).
pub const MAX_BRACKET_SIZE: usize = 16;

/// Outcome of [`try_advance_phase`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Advancement {
    /// Current round still open, or another caller already advanced it.
    NoAction,
    RoundGenerated { matches: Vec<GameMatch> },
    TournamentCompleted { champion: TeamId },
}

/// One knockout round in bracket order.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketRound {
    pub phase: MatchPhase,
    pub matches: Vec<GameMatch>,
}

/// Knockout bracket as currently stored.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketView {
    pub tournament_id: TournamentId,
    pub phase: TournamentPhase,
    /// Seed order; seed 1 first.
    pub seeds: Vec<TeamId>,
    /// Seeds that skip the first round.
    pub byes: Vec<TeamId>,
    pub rounds: Vec<BracketRound>,
    pub champion: Option<TeamId>,
}

/// Move the tournament forward if its current round is complete. Called after every committed
/// result; safe to call at any time and any number of times.
pub fn try_advance_phase(
    store: &dyn Store,
    config: &EngineConfig,
    tournament_id: TournamentId,
) -> Result<Advancement, EngineError> {
    let tournament = store
        .tournament(tournament_id)?
        .ok_or(EngineError::TournamentNotFound(tournament_id))?;
    match tournament.phase {
        TournamentPhase::GroupStage => advance_from_groups(store, config, tournament),
        TournamentPhase::Knockout => advance_knockout(store, config, tournament),
        _ => Ok(Advancement::NoAction),
    }
}

fn advance_from_groups(
    store: &dyn Store,
    config: &EngineConfig,
    mut tournament: Tournament,
) -> Result<Advancement, EngineError> {
    let tournament_id = tournament.id;
    let group_matches =
        store.matches(&|m| m.tournament_id == tournament_id && m.phase == MatchPhase::Group)?;
    if group_matches.iter().any(|m| !m.played) {
        return Ok(Advancement::NoAction);
    }
    let last_date = group_matches.iter().map(|m| m.scheduled_date).max();
    let read_versions = version_guards(&group_matches);
    let tables = tables_by_group(group_matches, &config.tie_breakers);

    if tournament.format == TournamentFormat::League {
        let Some(champion) = tables
            .first()
            .and_then(|(_, table)| table.first())
            .map(|row| row.team_id)
        else {
            return Ok(Advancement::NoAction);
        };
        tournament.phase = TournamentPhase::Completed;
        tournament.champion = Some(champion);
        let changes = ChangeSet::new()
            .guard(Guard::Phase {
                tournament_id,
                phase: TournamentPhase::GroupStage,
            })
            .guard_all(read_versions)
            .tournament(tournament);
        if !commit_unless_raced(store, changes)? {
            return Ok(Advancement::NoAction);
        }
        info!("League {} completed; champion {}", tournament_id, champion);
        return Ok(Advancement::TournamentCompleted { champion });
    }

    let seeds = match tournament.format {
        TournamentFormat::Cup => {
            in_registration_order(store.registrations(&|r| r.tournament_id == tournament_id)?)
                .into_iter()
                .map(|r| r.team_id)
                .collect()
        }
        _ => {
            let mut seeds = select_qualifiers(&tables, config);
            let group_of: HashMap<TeamId, GroupLabel> = tables
                .iter()
                .flat_map(|(label, table)| table.iter().map(move |row| (row.team_id, label.clone())))
                .collect();
            separate_groups(&mut seeds, &group_of);
            seeds
        }
    };
    if seeds.len() < 2 {
        return Err(EngineError::InvalidInput(format!(
            "knockout needs at least 2 qualifiers, found {}",
            seeds.len()
        )));
    }
    let phase = MatchPhase::for_bracket_size(bracket_size(seeds.len())).ok_or(
        EngineError::BracketTooLarge {
            qualifiers: seeds.len(),
        },
    )?;

    let date = next_round_date(&tournament, last_date, config);
    let matches: Vec<GameMatch> = first_round_pairings(&seeds)
        .into_iter()
        .enumerate()
        .filter_map(|(slot, (home, away))| {
            away.map(|away| GameMatch::knockout(tournament_id, home, away, phase, slot as u32, date))
        })
        .collect();

    tournament.phase = TournamentPhase::Knockout;
    tournament.seeds = seeds;
    let changes = ChangeSet::new()
        .guard(Guard::Phase {
            tournament_id,
            phase: TournamentPhase::GroupStage,
        })
        .guard(Guard::NoMatchesInPhase {
            tournament_id,
            phase,
        })
        .guard_all(read_versions)
        .tournament(tournament)
        .games(matches.clone());
    if !commit_unless_raced(store, changes)? {
        return Ok(Advancement::NoAction);
    }
    info!(
        "Tournament {} entered knockout: {:?} with {} matches",
        tournament_id,
        phase,
        matches.len()
    );
    Ok(Advancement::RoundGenerated { matches })
}

fn advance_knockout(
    store: &dyn Store,
    config: &EngineConfig,
    mut tournament: Tournament,
) -> Result<Advancement, EngineError> {
    let tournament_id = tournament.id;
    let knockout =
        store.matches(&|m| m.tournament_id == tournament_id && m.phase.is_knockout())?;
    let Some(current_rank) = knockout.iter().map(|m| m.phase.round_rank()).max() else {
        return Ok(Advancement::NoAction);
    };
    let last_date = knockout.iter().map(|m| m.scheduled_date).max();
    let mut current: Vec<GameMatch> = knockout
        .into_iter()
        .filter(|m| m.phase.round_rank() == current_rank)
        .collect();
    if current.iter().any(|m| !m.played) {
        debug!("Tournament {}: round still in progress", tournament_id);
        return Ok(Advancement::NoAction);
    }
    let read_versions = version_guards(&current);

    if current_rank == MatchPhase::Final.round_rank() {
        let champion = current
            .iter()
            .find(|m| m.phase == MatchPhase::Final)
            .and_then(GameMatch::winner)
            .ok_or_else(|| EngineError::InvalidInput("final has no winner".into()))?;
        tournament.phase = TournamentPhase::Completed;
        tournament.champion = Some(champion);
        let changes = ChangeSet::new()
            .guard(Guard::Phase {
                tournament_id,
                phase: TournamentPhase::Knockout,
            })
            .guard_all(read_versions)
            .tournament(tournament);
        if !commit_unless_raced(store, changes)? {
            return Ok(Advancement::NoAction);
        }
        info!("Tournament {} completed; champion {}", tournament_id, champion);
        return Ok(Advancement::TournamentCompleted { champion });
    }

    current.sort_by_key(|m| m.bracket_slot);
    let phase = current[0].phase;
    let Some(next) = phase.next() else {
        return Ok(Advancement::NoAction);
    };
    let advancing = round_advancers(phase, &current, &tournament.seeds)?;
    let date = next_round_date(&tournament, last_date, config);

    let mut matches: Vec<GameMatch> = advancing
        .chunks_exact(2)
        .enumerate()
        .map(|(slot, pair)| {
            GameMatch::knockout(tournament_id, pair[0], pair[1], next, slot as u32, date)
        })
        .collect();

    if next == MatchPhase::Final && config.third_place_match {
        let losers: Vec<TeamId> = current.iter().filter_map(GameMatch::loser).collect();
        if let [first, second] = losers.as_slice() {
            matches.push(GameMatch::knockout(
                tournament_id,
                *first,
                *second,
                MatchPhase::ThirdPlace,
                0,
                date,
            ));
        }
    }

    let changes = ChangeSet::new()
        .guard(Guard::Phase {
            tournament_id,
            phase: TournamentPhase::Knockout,
        })
        .guard(Guard::NoMatchesInPhase {
            tournament_id,
            phase: next,
        })
        .guard_all(read_versions)
        .games(matches.clone());
    if !commit_unless_raced(store, changes)? {
        return Ok(Advancement::NoAction);
    }
    info!(
        "Tournament {}: {:?} complete, generated {} match(es) for {:?}",
        tournament_id,
        phase,
        matches.len(),
        next
    );
    Ok(Advancement::RoundGenerated { matches })
}

/// Teams going through from a completed round, in bracket order. In the first round a slot
/// without a match is a bye and its seed goes through.
fn round_advancers(
    phase: MatchPhase,
    round: &[GameMatch],
    seeds: &[TeamId],
) -> Result<Vec<TeamId>, EngineError> {
    let first_round = MatchPhase::for_bracket_size(bracket_size(seeds.len())) == Some(phase);
    let pairings = if first_round {
        first_round_pairings(seeds)
    } else {
        Vec::new()
    };
    let slots = phase.bracket_size() / 2;
    (0..slots)
        .map(|slot| {
            match round.iter().find(|m| m.bracket_slot == Some(slot as u32)) {
                Some(m) => m.winner().ok_or_else(|| {
                    EngineError::InvalidInput(format!("{:?} slot {} has no winner", phase, slot))
                }),
                None => pairings
                    .get(slot)
                    .filter(|(_, opponent)| opponent.is_none())
                    .map(|(seed, _)| *seed)
                    .ok_or_else(|| {
                        EngineError::InvalidInput(format!(
                            "{:?} slot {} has no match",
                            phase, slot
                        ))
                    }),
            }
        })
        .collect()
}

fn next_round_date(
    tournament: &Tournament,
    last_date: Option<NaiveDate>,
    config: &EngineConfig,
) -> NaiveDate {
    match last_date {
        Some(date) => date + Duration::days(config.match_interval_days),
        None => tournament.start_date,
    }
}

fn version_guards(matches: &[GameMatch]) -> Vec<Guard> {
    matches
        .iter()
        .map(|m| Guard::MatchVersion {
            match_id: m.id,
            version: m.version,
        })
        .collect()
}

/// Commit, treating a failed guard as a lost race. Returns whether the changes were applied.
fn commit_unless_raced(store: &dyn Store, changes: ChangeSet) -> Result<bool, EngineError> {
    match store.commit(changes) {
        Ok(()) => Ok(true),
        Err(StoreError::GuardFailed(guard)) => {
            debug!("Advancement already done by another caller: {:?}", guard);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Seeds, byes, knockout rounds in order, and the champion once decided.
pub fn bracket_state(
    store: &dyn Store,
    tournament_id: TournamentId,
) -> Result<BracketView, EngineError> {
    let tournament = store
        .tournament(tournament_id)?
        .ok_or(EngineError::TournamentNotFound(tournament_id))?;
    let mut knockout =
        store.matches(&|m| m.tournament_id == tournament_id && m.phase.is_knockout())?;
    knockout.sort_by_key(|m| (m.phase.round_rank(), m.phase == MatchPhase::ThirdPlace, m.bracket_slot));

    let mut rounds: Vec<BracketRound> = Vec::new();
    for m in knockout {
        match rounds.last_mut() {
            Some(round) if round.phase == m.phase => round.matches.push(m),
            _ => rounds.push(BracketRound {
                phase: m.phase,
                matches: vec![m],
            }),
        }
    }

    let byes = first_round_pairings(&tournament.seeds)
        .into_iter()
        .filter(|(_, opponent)| opponent.is_none())
        .map(|(seed, _)| seed)
        .collect();

    Ok(BracketView {
        tournament_id,
        phase: tournament.phase,
        seeds: tournament.seeds,
        byes,
        rounds,
        champion: tournament.champion,
    })
}
