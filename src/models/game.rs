//! Match (game), MatchPhase, and the goal/card detail rows.

use crate::models::player::PlayerId;
use crate::models::team::TeamId;
use crate::models::tournament::TournamentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Group label ("A", "B", ...).
pub type GroupLabel = String;

/// Phase of the tournament this match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    Group,
    RoundOf16,
    QuarterFinal,
    SemiFinal,
    Final,
    ThirdPlace,
}

impl MatchPhase {
    pub fn is_knockout(self) -> bool {
        self != MatchPhase::Group
    }

    /// First knockout phase for a bracket of `size` slots (a power of two).
    pub fn for_bracket_size(size: usize) -> Option<MatchPhase> {
        match size {
            2 => Some(MatchPhase::Final),
            4 => Some(MatchPhase::SemiFinal),
            8 => Some(MatchPhase::QuarterFinal),
            16 => Some(MatchPhase::RoundOf16),
            _ => None,
        }
    }

    /// Number of bracket slots (teams) the round is played by.
    pub fn bracket_size(self) -> usize {
        match self {
            MatchPhase::Group => 0,
            MatchPhase::RoundOf16 => 16,
            MatchPhase::QuarterFinal => 8,
            MatchPhase::SemiFinal => 4,
            MatchPhase::Final | MatchPhase::ThirdPlace => 2,
        }
    }

    /// The knockout round that follows this one. The final round has none.
    pub fn next(self) -> Option<MatchPhase> {
        match self {
            MatchPhase::RoundOf16 => Some(MatchPhase::QuarterFinal),
            MatchPhase::QuarterFinal => Some(MatchPhase::SemiFinal),
            MatchPhase::SemiFinal => Some(MatchPhase::Final),
            MatchPhase::Group | MatchPhase::Final | MatchPhase::ThirdPlace => None,
        }
    }

    /// Ordering of rounds through the tournament. ThirdPlace shares the final round.
    pub fn round_rank(self) -> u8 {
        match self {
            MatchPhase::Group => 0,
            MatchPhase::RoundOf16 => 1,
            MatchPhase::QuarterFinal => 2,
            MatchPhase::SemiFinal => 3,
            MatchPhase::Final | MatchPhase::ThirdPlace => 4,
        }
    }
}

/// A single match between two teams.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub scheduled_date: NaiveDate,
    pub played: bool,
    pub home_goals: u32,
    pub away_goals: u32,
    /// Shoot-out score; only for a level knockout match.
    pub home_penalties: Option<u32>,
    pub away_penalties: Option<u32>,
    pub phase: MatchPhase,
    /// Set iff `phase` is Group.
    pub group: Option<GroupLabel>,
    /// Round-robin round within the group (0-based). Zero for knockout matches.
    pub matchday: u32,
    /// Position within the knockout round, in bracket order. None for group matches.
    pub bracket_slot: Option<u32>,
    /// Bumped on every write; compared before each result write.
    pub version: u64,
}

impl GameMatch {
    /// New unplayed group match.
    pub fn group(
        tournament_id: TournamentId,
        home_team_id: TeamId,
        away_team_id: TeamId,
        group: impl Into<GroupLabel>,
        matchday: u32,
        scheduled_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            home_team_id,
            away_team_id,
            scheduled_date,
            played: false,
            home_goals: 0,
            away_goals: 0,
            home_penalties: None,
            away_penalties: None,
            phase: MatchPhase::Group,
            group: Some(group.into()),
            matchday,
            bracket_slot: None,
            version: 0,
        }
    }

    /// New unplayed knockout match at `slot` of its round.
    pub fn knockout(
        tournament_id: TournamentId,
        home_team_id: TeamId,
        away_team_id: TeamId,
        phase: MatchPhase,
        slot: u32,
        scheduled_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            home_team_id,
            away_team_id,
            scheduled_date,
            played: false,
            home_goals: 0,
            away_goals: 0,
            home_penalties: None,
            away_penalties: None,
            phase,
            group: None,
            matchday: 0,
            bracket_slot: Some(slot),
            version: 0,
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// Winning team of a played match, deciding on penalties when goals are level.
    /// None for unplayed matches and drawn group matches.
    pub fn winner(&self) -> Option<TeamId> {
        if !self.played {
            return None;
        }
        let (home, away) = if self.home_goals != self.away_goals {
            (self.home_goals, self.away_goals)
        } else {
            (self.home_penalties?, self.away_penalties?)
        };
        match home.cmp(&away) {
            std::cmp::Ordering::Greater => Some(self.home_team_id),
            std::cmp::Ordering::Less => Some(self.away_team_id),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn loser(&self) -> Option<TeamId> {
        let winner = self.winner()?;
        Some(if winner == self.home_team_id {
            self.away_team_id
        } else {
            self.home_team_id
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Yellow,
    Red,
}

/// A goal scored in a match. An own goal counts for the scorer's opponent.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub minute: u32,
    #[serde(default)]
    pub own_goal: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub card_type: CardType,
    pub minute: u32,
}
