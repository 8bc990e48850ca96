//! Recording match results under optimistic concurrency.
//!
//! A submission is validated in full before anything is written. The score, the detail rows and
//! the version bump then go out as one guarded commit, and the bracket is given a chance to
//! advance.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::logic::bracket::{try_advance_phase, Advancement};
use crate::models::{
    Card, CardType, GameMatch, Goal, MatchId, MatchPhase, PlayerId, TeamId, TournamentPhase,
};
use crate::store::{ChangeSet, Guard, Store, StoreError};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GoalDetail {
    pub player_id: PlayerId,
    pub minute: u32,
    #[serde(default)]
    pub own_goal: bool,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CardDetail {
    pub player_id: PlayerId,
    pub card_type: CardType,
    pub minute: u32,
}

/// A full result for one match, written against the version the caller last read.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub match_id: MatchId,
    pub expected_version: u64,
    pub home_goals: u32,
    pub away_goals: u32,
    #[serde(default)]
    pub goals: Vec<GoalDetail>,
    #[serde(default)]
    pub cards: Vec<CardDetail>,
    #[serde(default)]
    pub home_penalties: Option<u32>,
    #[serde(default)]
    pub away_penalties: Option<u32>,
}

/// The committed match and what the bracket did in response.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RecordedResult {
    #[serde(rename = "match")]
    pub game: GameMatch,
    pub advancement: Advancement,
}

/// Validate and commit a match result, then try to advance the tournament.
///
/// Fails with `ConcurrencyConflict` if the match changed since `expected_version` was read; the
/// stored match is left as it was.
pub fn submit_result(
    store: &dyn Store,
    config: &EngineConfig,
    submission: ResultSubmission,
) -> Result<RecordedResult, EngineError> {
    let match_id = submission.match_id;
    let game = store
        .game(match_id)?
        .ok_or(EngineError::MatchNotFound(match_id))?;
    let tournament = store
        .tournament(game.tournament_id)?
        .ok_or(EngineError::TournamentNotFound(game.tournament_id))?;

    let required_phase = if game.phase == MatchPhase::Group {
        TournamentPhase::GroupStage
    } else {
        TournamentPhase::Knockout
    };
    if tournament.phase != required_phase {
        return Err(EngineError::WrongPhase {
            actual: tournament.phase,
        });
    }
    // A knockout result is frozen once the round after it exists.
    let next_round = game.phase.next();
    if let Some(next) = next_round {
        let tournament_id = game.tournament_id;
        if !store
            .matches(&|m| m.tournament_id == tournament_id && m.phase == next)?
            .is_empty()
        {
            return Err(EngineError::WrongPhase {
                actual: tournament.phase,
            });
        }
    }

    if submission.expected_version != game.version {
        warn!(
            "Stale result for match {}: expected version {}, stored {}",
            match_id, submission.expected_version, game.version
        );
        return Err(EngineError::ConcurrencyConflict {
            match_id,
            expected: submission.expected_version,
            actual: game.version,
        });
    }

    let (goals, cards) = validate_details(store, config, &game, &submission)?;
    validate_decision(&game, &submission)?;

    let mut updated = game.clone();
    updated.played = true;
    updated.home_goals = submission.home_goals;
    updated.away_goals = submission.away_goals;
    updated.home_penalties = submission.home_penalties;
    updated.away_penalties = submission.away_penalties;
    updated.version = game.version + 1;

    let mut changes = ChangeSet::new()
        .guard(Guard::MatchVersion {
            match_id,
            version: game.version,
        })
        .guard(Guard::Phase {
            tournament_id: game.tournament_id,
            phase: required_phase,
        });
    if let Some(next) = next_round {
        changes = changes.guard(Guard::NoMatchesInPhase {
            tournament_id: game.tournament_id,
            phase: next,
        });
    }
    let changes = changes
        .game(updated.clone())
        .goals(match_id, goals)
        .cards(match_id, cards);

    match store.commit(changes) {
        Ok(()) => {}
        Err(StoreError::GuardFailed(Guard::MatchVersion { .. })) => {
            let actual = store.game(match_id)?.map_or(game.version, |m| m.version);
            warn!("Concurrent write to match {} won; now at version {}", match_id, actual);
            return Err(EngineError::ConcurrencyConflict {
                match_id,
                expected: submission.expected_version,
                actual,
            });
        }
        Err(StoreError::GuardFailed(_)) => {
            let actual = store
                .tournament(game.tournament_id)?
                .map_or(tournament.phase, |t| t.phase);
            return Err(EngineError::WrongPhase { actual });
        }
        Err(e) => return Err(e.into()),
    }
    info!(
        "Match {} recorded: {}-{} (version {})",
        match_id, updated.home_goals, updated.away_goals, updated.version
    );

    // The result is committed either way; a failed advancement is retried by the next call.
    let advancement = match try_advance_phase(store, config, game.tournament_id) {
        Ok(advancement) => advancement,
        Err(e) => {
            warn!(
                "Advancing tournament {} after match {} failed: {}",
                game.tournament_id, match_id, e
            );
            Advancement::NoAction
        }
    };
    Ok(RecordedResult {
        game: updated,
        advancement,
    })
}

/// Check every goal and card row against the match and build the rows to store.
fn validate_details(
    store: &dyn Store,
    config: &EngineConfig,
    game: &GameMatch,
    submission: &ResultSubmission,
) -> Result<(Vec<Goal>, Vec<Card>), EngineError> {
    let mut home_tally = 0u32;
    let mut away_tally = 0u32;
    let mut goals = Vec::with_capacity(submission.goals.len());
    for detail in &submission.goals {
        let team = participant_team(store, game, detail.player_id)?;
        check_minute(detail.minute, config)?;
        let credited_home = (team == game.home_team_id) != detail.own_goal;
        if credited_home {
            home_tally += 1;
        } else {
            away_tally += 1;
        }
        goals.push(Goal {
            id: Uuid::new_v4(),
            match_id: game.id,
            player_id: detail.player_id,
            minute: detail.minute,
            own_goal: detail.own_goal,
        });
    }
    if home_tally != submission.home_goals || away_tally != submission.away_goals {
        return Err(EngineError::InvalidScore(format!(
            "goal rows add up to {}-{}, score is {}-{}",
            home_tally, away_tally, submission.home_goals, submission.away_goals
        )));
    }

    let mut cards = Vec::with_capacity(submission.cards.len());
    for detail in &submission.cards {
        participant_team(store, game, detail.player_id)?;
        check_minute(detail.minute, config)?;
        cards.push(Card {
            id: Uuid::new_v4(),
            match_id: game.id,
            player_id: detail.player_id,
            card_type: detail.card_type,
            minute: detail.minute,
        });
    }
    Ok((goals, cards))
}

/// Team of a player who must belong to one of the two sides.
fn participant_team(
    store: &dyn Store,
    game: &GameMatch,
    player_id: PlayerId,
) -> Result<TeamId, EngineError> {
    let player = store
        .player(player_id)?
        .ok_or(EngineError::PlayerNotFound(player_id))?;
    if !game.involves(player.team_id) {
        return Err(EngineError::InvalidScore(format!(
            "player {} does not play for either team",
            player_id
        )));
    }
    Ok(player.team_id)
}

fn check_minute(minute: u32, config: &EngineConfig) -> Result<(), EngineError> {
    if minute == 0 || minute > config.max_minute {
        return Err(EngineError::InvalidScore(format!(
            "minute {} outside 1..={}",
            minute, config.max_minute
        )));
    }
    Ok(())
}

/// Group matches may be drawn and never have penalties. Knockout matches level after regulation
/// need a shoot-out with distinct counts; decided ones must not carry one.
fn validate_decision(game: &GameMatch, submission: &ResultSubmission) -> Result<(), EngineError> {
    let penalties = (submission.home_penalties, submission.away_penalties);
    let has_penalties = penalties.0.is_some() || penalties.1.is_some();
    if !game.phase.is_knockout() {
        if has_penalties {
            return Err(EngineError::InvalidScore(
                "group matches have no penalty shoot-out".into(),
            ));
        }
        return Ok(());
    }
    if submission.home_goals != submission.away_goals {
        if has_penalties {
            return Err(EngineError::InvalidScore(
                "penalties only apply when goals are level".into(),
            ));
        }
        return Ok(());
    }
    match penalties {
        (Some(home), Some(away)) if home != away => Ok(()),
        _ => Err(EngineError::DrawNotAllowed),
    }
}
