//! Group standings: a pure projection of the played matches, recomputed in full on every call.

use crate::config::{EngineConfig, TieBreaker};
use crate::error::EngineError;
use crate::models::{GameMatch, GroupLabel, MatchPhase, TeamId, TournamentId};
use crate::store::Store;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

/// One team's line in a group table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TeamRow {
    pub team_id: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i64,
    pub points: u32,
}

impl TeamRow {
    fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Self::default()
        }
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = i64::from(self.goals_for) - i64::from(self.goals_against);
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

fn compare_by(a: &TeamRow, b: &TeamRow, criterion: TieBreaker) -> Ordering {
    match criterion {
        TieBreaker::Points => b.points.cmp(&a.points),
        TieBreaker::GoalDifference => b.goal_difference.cmp(&a.goal_difference),
        TieBreaker::GoalsFor => b.goals_for.cmp(&a.goals_for),
        TieBreaker::GoalsAgainst => a.goals_against.cmp(&b.goals_against),
        TieBreaker::Wins => b.won.cmp(&a.won),
    }
}

/// Order two rows by the configured criteria, falling back to team id ascending.
pub fn compare_rows(a: &TeamRow, b: &TeamRow, tie_breakers: &[TieBreaker]) -> Ordering {
    tie_breakers
        .iter()
        .map(|&c| compare_by(a, b, c))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| a.team_id.cmp(&b.team_id))
}

/// Build the ranked table for the teams appearing in `matches`. Unplayed matches still put their
/// teams in the table (with zero records) but contribute nothing else.
pub fn compute_table(matches: &[GameMatch], tie_breakers: &[TieBreaker]) -> Vec<TeamRow> {
    let mut rows: HashMap<TeamId, TeamRow> = HashMap::new();
    for m in matches {
        rows.entry(m.home_team_id)
            .or_insert_with(|| TeamRow::new(m.home_team_id));
        rows.entry(m.away_team_id)
            .or_insert_with(|| TeamRow::new(m.away_team_id));
        if !m.played {
            continue;
        }
        if let Some(home) = rows.get_mut(&m.home_team_id) {
            home.record(m.home_goals, m.away_goals);
        }
        if let Some(away) = rows.get_mut(&m.away_team_id) {
            away.record(m.away_goals, m.home_goals);
        }
    }
    let mut table: Vec<TeamRow> = rows.into_values().collect();
    table.sort_by(|a, b| compare_rows(a, b, tie_breakers));
    table
}

/// Standings for one group of a tournament.
pub fn compute_standings(
    store: &dyn Store,
    config: &EngineConfig,
    tournament_id: TournamentId,
    group: &str,
) -> Result<Vec<TeamRow>, EngineError> {
    store
        .tournament(tournament_id)?
        .ok_or(EngineError::TournamentNotFound(tournament_id))?;
    let matches = store.matches(&|m| {
        m.tournament_id == tournament_id
            && m.phase == MatchPhase::Group
            && m.group.as_deref() == Some(group)
    })?;
    if matches.is_empty() {
        return Err(EngineError::GroupNotFound(group.to_string()));
    }
    Ok(compute_table(&matches, &config.tie_breakers))
}

/// Every group's table, ordered by group label.
pub fn all_standings(
    store: &dyn Store,
    config: &EngineConfig,
    tournament_id: TournamentId,
) -> Result<Vec<(GroupLabel, Vec<TeamRow>)>, EngineError> {
    store
        .tournament(tournament_id)?
        .ok_or(EngineError::TournamentNotFound(tournament_id))?;
    let matches =
        store.matches(&|m| m.tournament_id == tournament_id && m.phase == MatchPhase::Group)?;
    Ok(tables_by_group(matches, &config.tie_breakers))
}

pub(crate) fn tables_by_group(
    matches: Vec<GameMatch>,
    tie_breakers: &[TieBreaker],
) -> Vec<(GroupLabel, Vec<TeamRow>)> {
    let mut groups: BTreeMap<GroupLabel, Vec<GameMatch>> = BTreeMap::new();
    for m in matches {
        if let Some(label) = m.group.clone() {
            groups.entry(label).or_default().push(m);
        }
    }
    groups
        .into_iter()
        .map(|(label, ms)| {
            let table = compute_table(&ms, tie_breakers);
            (label, table)
        })
        .collect()
}
