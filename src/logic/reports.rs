//! Read-only summaries: scorer tables and head-to-head records.

use crate::error::EngineError;
use crate::models::{GameMatch, PlayerId, TeamId, TournamentId};
use crate::store::Store;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ScorerRow {
    pub player_id: PlayerId,
    pub team_id: TeamId,
    pub goals: u32,
}

/// Goals per player in a tournament, most first (ties by player id). Own goals don't count.
pub fn top_scorers(
    store: &dyn Store,
    tournament_id: TournamentId,
) -> Result<Vec<ScorerRow>, EngineError> {
    store
        .tournament(tournament_id)?
        .ok_or(EngineError::TournamentNotFound(tournament_id))?;
    let match_ids: HashSet<_> = store
        .matches(&|m| m.tournament_id == tournament_id)?
        .into_iter()
        .map(|m| m.id)
        .collect();
    let goals = store.goals(&|g| !g.own_goal && match_ids.contains(&g.match_id))?;

    let mut tally: HashMap<PlayerId, u32> = HashMap::new();
    for goal in goals {
        *tally.entry(goal.player_id).or_default() += 1;
    }
    let mut rows = Vec::with_capacity(tally.len());
    for (player_id, goals) in tally {
        let player = store
            .player(player_id)?
            .ok_or(EngineError::PlayerNotFound(player_id))?;
        rows.push(ScorerRow {
            player_id,
            team_id: player.team_id,
            goals,
        });
    }
    rows.sort_by(|a, b| b.goals.cmp(&a.goals).then_with(|| a.player_id.cmp(&b.player_id)));
    Ok(rows)
}

/// Record between two teams across every tournament, from `team`'s point of view.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct HeadToHead {
    pub team: TeamId,
    pub opponent: TeamId,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    /// Played matches, oldest first.
    pub matches: Vec<GameMatch>,
}

/// Every played match between `team` and `opponent`. Shoot-outs decide wins and losses; a level
/// group match is a draw.
pub fn head_to_head(
    store: &dyn Store,
    team: TeamId,
    opponent: TeamId,
) -> Result<HeadToHead, EngineError> {
    for id in [team, opponent] {
        store.team(id)?.ok_or(EngineError::TeamNotFound(id))?;
    }
    let mut matches =
        store.matches(&|m| m.played && m.involves(team) && m.involves(opponent) && team != opponent)?;
    matches.sort_by_key(|m| m.scheduled_date);

    let mut record = HeadToHead {
        team,
        opponent,
        wins: 0,
        draws: 0,
        losses: 0,
        goals_for: 0,
        goals_against: 0,
        matches: Vec::new(),
    };
    for m in &matches {
        let (scored, conceded) = if m.home_team_id == team {
            (m.home_goals, m.away_goals)
        } else {
            (m.away_goals, m.home_goals)
        };
        record.goals_for += scored;
        record.goals_against += conceded;
        match m.winner() {
            Some(winner) if winner == team => record.wins += 1,
            Some(_) => record.losses += 1,
            None => record.draws += 1,
        }
    }
    record.matches = matches;
    Ok(record)
}
