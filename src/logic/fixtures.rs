//! Group stage: partitioning registered teams into groups and generating round-robin fixtures.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::logic::bracket::MAX_BRACKET_SIZE;
use crate::models::{
    in_registration_order, GameMatch, GroupLabel, MatchPhase, TeamId, TournamentFormat,
    TournamentId, TournamentPhase,
};
use crate::store::{ChangeSet, Guard, Store, StoreError};
use chrono::Duration;
use log::{info, warn};

/// Label for the group at `index`: A, B, ..., Z, AA, AB, ...
pub fn group_label(index: usize) -> GroupLabel {
    let letter = |i: usize| char::from(b'A' + (i % 26) as u8);
    if index < 26 {
        letter(index).to_string()
    } else {
        format!("{}{}", letter(index / 26 - 1), letter(index))
    }
}

/// Split teams (in registration order) into groups: team i goes to group i / group_size.
/// A trailing group of a single team cannot play, so it joins the group before it.
pub fn partition_into_groups(teams: &[TeamId], group_size: usize) -> Vec<Vec<TeamId>> {
    let mut groups: Vec<Vec<TeamId>> = teams
        .chunks(group_size.max(1))
        .map(|c| c.to_vec())
        .collect();
    if groups.len() > 1 && groups.last().is_some_and(|g| g.len() == 1) {
        if let Some(lone) = groups.pop() {
            if let Some(previous) = groups.last_mut() {
                previous.extend(lone);
            }
        }
    }
    groups
}

/// Single round-robin by the circle method: slot 0 stays fixed while the others rotate.
/// Returns one `(home, away)` list per round. Odd counts get a bye slot, skipped in the output.
///
/// The fixed team alternates home and away each round; every other pairing puts the team in the
/// upper half at home. Rotation carries each team through both halves, so home counts differ by
/// at most one.
pub fn round_robin_rounds(teams: &[TeamId]) -> Vec<Vec<(TeamId, TeamId)>> {
    if teams.len() < 2 {
        return Vec::new();
    }
    let mut slots: Vec<Option<TeamId>> = teams.iter().copied().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }
    let n = slots.len();

    let mut rounds = Vec::with_capacity(n - 1);
    for round in 0..n - 1 {
        let mut pairs = Vec::with_capacity(n / 2);
        for i in 0..n / 2 {
            let (Some(a), Some(b)) = (slots[i], slots[n - 1 - i]) else {
                continue;
            };
            let pair = if i == 0 && round % 2 == 1 { (b, a) } else { (a, b) };
            pairs.push(pair);
        }
        rounds.push(pairs);
        slots[1..].rotate_right(1);
    }
    rounds
}

/// Generate the group stage for a tournament and move it to GroupStage.
///
/// Only valid from Draft or Open, with at least `min_teams` registered and no group matches yet.
/// Cup tournaments get no groups: the phase still moves to GroupStage, and the empty stage is
/// complete at once.
pub fn generate_group_stage(
    store: &dyn Store,
    config: &EngineConfig,
    tournament_id: TournamentId,
) -> Result<Vec<GameMatch>, EngineError> {
    let mut tournament = store
        .tournament(tournament_id)?
        .ok_or(EngineError::TournamentNotFound(tournament_id))?;
    if !tournament.phase.accepts_registrations() {
        return Err(EngineError::AlreadyStarted(tournament_id));
    }
    let existing =
        store.matches(&|m| m.tournament_id == tournament_id && m.phase == MatchPhase::Group)?;
    if !existing.is_empty() {
        return Err(EngineError::AlreadyStarted(tournament_id));
    }

    let teams: Vec<TeamId> =
        in_registration_order(store.registrations(&|r| r.tournament_id == tournament_id)?)
            .into_iter()
            .map(|r| r.team_id)
            .collect();
    if teams.len() < config.min_teams {
        return Err(EngineError::InsufficientParticipants {
            required: config.min_teams,
            registered: teams.len(),
        });
    }

    let groups = match tournament.format {
        TournamentFormat::League => vec![teams.clone()],
        TournamentFormat::Mixed => partition_into_groups(&teams, config.group_size),
        TournamentFormat::Cup => Vec::new(),
    };
    let qualifiers = match tournament.format {
        TournamentFormat::League => 0,
        TournamentFormat::Mixed => groups
            .iter()
            .map(|g| g.len().min(config.qualifiers_per_group))
            .sum(),
        TournamentFormat::Cup => teams.len(),
    };
    if qualifiers > MAX_BRACKET_SIZE {
        return Err(EngineError::BracketTooLarge { qualifiers });
    }

    let interval = Duration::days(config.match_interval_days);
    let mut matches = Vec::new();
    for (index, group) in groups.iter().enumerate() {
        let label = group_label(index);
        for (matchday, round) in round_robin_rounds(group).into_iter().enumerate() {
            let date = tournament.start_date + interval * matchday as i32;
            for (home, away) in round {
                matches.push(GameMatch::group(
                    tournament_id,
                    home,
                    away,
                    label.clone(),
                    matchday as u32,
                    date,
                ));
            }
        }
    }

    let from = tournament.phase;
    tournament.phase = TournamentPhase::GroupStage;
    let changes = ChangeSet::new()
        .guard(Guard::Phase {
            tournament_id,
            phase: from,
        })
        .guard(Guard::NoMatchesInPhase {
            tournament_id,
            phase: MatchPhase::Group,
        })
        .tournament(tournament)
        .games(matches.clone());
    match store.commit(changes) {
        Ok(()) => {}
        Err(StoreError::GuardFailed(guard)) => {
            warn!("Start of tournament {} lost a race: {:?}", tournament_id, guard);
            return Err(EngineError::AlreadyStarted(tournament_id));
        }
        Err(e) => return Err(e.into()),
    }

    info!(
        "Tournament {} started: {} teams, {} groups, {} group matches",
        tournament_id,
        teams.len(),
        groups.len(),
        matches.len()
    );
    Ok(matches)
}
