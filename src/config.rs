//! Engine configuration: group sizing, qualification, tie-breaks and seeding.
//!
//! Defaults match a standard groups-of-four, top-two-qualify tournament. `from_env` layers an
//! optional JSON file (`TOURNAMENT_CONFIG`) and `TOURNAMENT_*` overrides on top.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Longest gap between rounds, in days.
pub const MAX_MATCH_INTERVAL_DAYS: i64 = 365;

/// Criteria for ordering a standings table, applied in sequence. Team id ascending always
/// breaks whatever ties remain.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreaker {
    Points,
    GoalDifference,
    GoalsFor,
    GoalsAgainst,
    Wins,
}

/// How group qualifiers are turned into knockout seeds.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingPolicy {
    /// All group winners (by group label), then all runners-up, and so on.
    #[default]
    GroupPosition,
    /// Same finishing-position bands, but each band ordered by record instead of group label.
    Merit,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Registered teams needed to start.
    pub min_teams: usize,
    /// Target teams per group.
    pub group_size: usize,
    /// Teams per group promoted to the knockout.
    pub qualifiers_per_group: usize,
    /// Play a third-place match alongside the final.
    pub third_place_match: bool,
    /// Days between consecutive rounds.
    pub match_interval_days: i64,
    /// Latest minute accepted on goal and card rows.
    pub max_minute: u32,
    pub tie_breakers: Vec<TieBreaker>,
    pub seeding: SeedingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_teams: 4,
            group_size: 4,
            qualifiers_per_group: 2,
            third_place_match: false,
            match_interval_days: 7,
            max_minute: 130,
            tie_breakers: vec![
                TieBreaker::Points,
                TieBreaker::GoalDifference,
                TieBreaker::GoalsFor,
            ],
            seeding: SeedingPolicy::GroupPosition,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl EngineConfig {
    /// Load from `TOURNAMENT_CONFIG` (JSON) if set, then apply env overrides, then validate.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("TOURNAMENT_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                serde_json::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?
            }
            Err(_) => Self::default(),
        };

        override_from_env("TOURNAMENT_MIN_TEAMS", &mut config.min_teams)?;
        override_from_env("TOURNAMENT_GROUP_SIZE", &mut config.group_size)?;
        override_from_env("TOURNAMENT_QUALIFIERS_PER_GROUP", &mut config.qualifiers_per_group)?;
        override_from_env("TOURNAMENT_THIRD_PLACE", &mut config.third_place_match)?;
        override_from_env("TOURNAMENT_MATCH_INTERVAL_DAYS", &mut config.match_interval_days)?;
        override_from_env("TOURNAMENT_MAX_MINUTE", &mut config.max_minute)?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_size < 2 {
            return Err(ConfigError::Invalid("group_size must be at least 2".into()));
        }
        if self.min_teams < 2 {
            return Err(ConfigError::Invalid("min_teams must be at least 2".into()));
        }
        if self.qualifiers_per_group == 0 {
            return Err(ConfigError::Invalid(
                "qualifiers_per_group must be at least 1".into(),
            ));
        }
        if !(0..=MAX_MATCH_INTERVAL_DAYS).contains(&self.match_interval_days) {
            return Err(ConfigError::Invalid(format!(
                "match_interval_days must lie in 0..={}",
                MAX_MATCH_INTERVAL_DAYS
            )));
        }
        Ok(())
    }
}

fn override_from_env<T: FromStr>(var: &'static str, slot: &mut T) -> Result<(), ConfigError> {
    if let Ok(value) = std::env::var(var) {
        *slot = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var, value })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn match_interval_is_bounded() {
        let mut config = EngineConfig::default();
        config.match_interval_days = MAX_MATCH_INTERVAL_DAYS;
        assert!(config.validate().is_ok());
        config.match_interval_days = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.match_interval_days = -1;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }
}
