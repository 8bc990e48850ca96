//! Tournament, TournamentPhase and the phase state machine.

use crate::models::team::TeamId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Shape of the competition.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    /// Single round-robin table; the leader is champion.
    League,
    /// Knockout only, seeded by registration order.
    Cup,
    /// Groups, then knockout.
    #[default]
    Mixed,
}

/// Current phase of the tournament. Phases only ever move forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentPhase {
    /// Created; teams may register.
    #[default]
    Draft,
    /// Registration open.
    Open,
    /// Group fixtures generated; results being recorded.
    GroupStage,
    /// Knockout bracket seeded.
    Knockout,
    /// Final played (or league table complete). Terminal.
    Completed,
}

impl TournamentPhase {
    /// Whether teams may still register.
    pub fn accepts_registrations(self) -> bool {
        matches!(self, TournamentPhase::Draft | TournamentPhase::Open)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// The chain is linear. The one shortcut is GroupStage -> Completed, taken only by
    /// league tournaments, which have no knockout.
    pub fn can_advance_to(self, next: TournamentPhase, format: TournamentFormat) -> bool {
        use TournamentPhase::*;
        match (self, next) {
            (Draft, Open) | (Open, GroupStage) | (GroupStage, Knockout) | (Knockout, Completed) => true,
            (GroupStage, Completed) => format == TournamentFormat::League,
            _ => false,
        }
    }
}

/// A tournament record. Teams and matches link back through `tournament_id`; nothing here
/// holds another entity.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub format: TournamentFormat,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub phase: TournamentPhase,
    /// Knockout seeds in seed order (seed 1 first). Empty until the bracket is seeded.
    #[serde(default)]
    pub seeds: Vec<TeamId>,
    /// Set when the tournament reaches Completed.
    #[serde(default)]
    pub champion: Option<TeamId>,
}

impl Tournament {
    /// Create a new tournament in Draft.
    pub fn new(
        name: impl Into<String>,
        format: TournamentFormat,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            format,
            start_date,
            end_date,
            phase: TournamentPhase::Draft,
            seeds: Vec::new(),
            champion: None,
        }
    }
}
