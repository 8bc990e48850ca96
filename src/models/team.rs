//! Team and Registration.

use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// A team's entry into a tournament. At most one per (tournament, team) pair.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub tournament_id: TournamentId,
    pub team_id: TeamId,
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(tournament_id: TournamentId, team_id: TeamId) -> Self {
        Self {
            tournament_id,
            team_id,
            registered_at: Utc::now(),
        }
    }
}

/// Sort registrations into registration order (time, then team id for identical stamps).
pub fn in_registration_order(mut registrations: Vec<Registration>) -> Vec<Registration> {
    registrations.sort_by(|a, b| {
        a.registered_at
            .cmp(&b.registered_at)
            .then_with(|| a.team_id.cmp(&b.team_id))
    });
    registrations
}
