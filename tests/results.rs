//! Integration tests for recording match results.

mod common;

use common::{harness, Harness};
use tournament_engine::{
    add_player, start_tournament, submit_result, Advancement, CardDetail, CardType, EngineError,
    ErrorKind, GameMatch, GoalDetail, MatchPhase, Store, TournamentFormat, TournamentPhase,
};

fn started(format: TournamentFormat, teams: usize) -> Harness {
    let h = harness(format, teams);
    start_tournament(&h.store, &h.config, h.tournament.id).unwrap();
    h
}

fn goal_rows(h: &Harness, game: &GameMatch) -> usize {
    let id = game.id;
    h.store.goals(&|g| g.match_id == id).unwrap().len()
}

/// Four-team group played out so the final is open.
fn final_pending() -> (Harness, GameMatch) {
    let h = started(TournamentFormat::Mixed, 4);
    h.play_open_matches();
    let final_match = h.unplayed().pop().unwrap();
    assert_eq!(final_match.phase, MatchPhase::Final);
    (h, final_match)
}

#[test]
fn recording_bumps_version_and_stores_details() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    let mut submission = h.result(&game, 2, 1);
    submission.cards.push(CardDetail {
        player_id: h.strikers[&game.away_team_id],
        card_type: CardType::Yellow,
        minute: 55,
    });
    let recorded = submit_result(&h.store, &h.config, submission).unwrap();

    assert!(recorded.game.played);
    assert_eq!(recorded.game.version, 1);
    assert_eq!((recorded.game.home_goals, recorded.game.away_goals), (2, 1));
    assert_eq!(recorded.advancement, Advancement::NoAction);
    assert_eq!(h.store.game(game.id).unwrap().unwrap(), recorded.game);
    assert_eq!(goal_rows(&h, &game), 3);
    let id = game.id;
    assert_eq!(h.store.cards(&|c| c.match_id == id).unwrap().len(), 1);
}

#[test]
fn stale_version_conflicts_and_leaves_match_untouched() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    h.play(&game, 1, 0).unwrap();
    let before = h.store.game(game.id).unwrap().unwrap();

    // `game` still carries version 0.
    let err = h.play(&game, 0, 3).unwrap_err();
    assert_eq!(
        err,
        EngineError::ConcurrencyConflict {
            match_id: game.id,
            expected: 0,
            actual: 1
        }
    );
    assert!(err.kind().is_retryable());
    assert_eq!(h.store.game(game.id).unwrap().unwrap(), before);
    assert_eq!(goal_rows(&h, &game), 1);

    // Re-read and retry replaces score and detail rows together.
    let recorded = h.play(&before, 0, 3).unwrap();
    assert_eq!(recorded.game.version, 2);
    assert_eq!(goal_rows(&h, &game), 3);
}

#[test]
fn concurrent_submissions_on_one_match_let_exactly_one_win() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    let outcomes: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..6u32)
            .map(|i| {
                let h = &h;
                let game = &game;
                s.spawn(move || h.play(game, i % 3, 1))
            })
            .collect();
        handles.into_iter().map(|t| t.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    for err in outcomes.iter().filter_map(|o| o.as_ref().err()) {
        assert!(matches!(err, EngineError::ConcurrencyConflict { .. }));
    }
    let stored = h.store.game(game.id).unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(goal_rows(&h, &game) as u32, stored.home_goals + stored.away_goals);
}

#[test]
fn detail_rows_must_add_up_to_the_score() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    let mut submission = h.result(&game, 2, 0);
    submission.goals.pop();
    let err = submit_result(&h.store, &h.config, submission).unwrap_err();
    assert!(matches!(err, EngineError::InvalidScore(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!h.store.game(game.id).unwrap().unwrap().played);
}

#[test]
fn own_goals_count_for_the_opponent() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    let defender = add_player(&h.store, game.home_team_id, "Unlucky Defender").unwrap();
    let mut submission = h.result(&game, 1, 0);
    submission.away_goals = 1;
    submission.goals.push(GoalDetail {
        player_id: defender.id,
        minute: 80,
        own_goal: true,
    });
    let recorded = submit_result(&h.store, &h.config, submission).unwrap();
    assert_eq!((recorded.game.home_goals, recorded.game.away_goals), (1, 1));
}

#[test]
fn scorers_must_play_for_either_side() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    let outsider = h
        .teams
        .iter()
        .find(|t| !game.involves(t.id))
        .map(|t| h.strikers[&t.id])
        .unwrap();
    let mut submission = h.result(&game, 0, 0);
    submission.home_goals = 1;
    submission.goals.push(GoalDetail {
        player_id: outsider,
        minute: 30,
        own_goal: false,
    });
    let err = submit_result(&h.store, &h.config, submission).unwrap_err();
    assert!(matches!(err, EngineError::InvalidScore(_)));
}

#[test]
fn minutes_outside_the_match_are_rejected() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    let mut submission = h.result(&game, 1, 0);
    submission.goals[0].minute = 0;
    let err = submit_result(&h.store, &h.config, submission).unwrap_err();
    assert!(matches!(err, EngineError::InvalidScore(_)));
}

#[test]
fn unknown_match_is_not_found() {
    let h = started(TournamentFormat::Mixed, 4);
    let mut submission = h.result(&h.unplayed()[0], 0, 0);
    submission.match_id = uuid::Uuid::new_v4();
    let err = submit_result(&h.store, &h.config, submission.clone()).unwrap_err();
    assert_eq!(err, EngineError::MatchNotFound(submission.match_id));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn group_matches_take_no_penalties() {
    let h = started(TournamentFormat::Mixed, 4);
    let game = h.unplayed()[0].clone();
    let mut submission = h.result(&game, 1, 1);
    submission.home_penalties = Some(4);
    submission.away_penalties = Some(3);
    let err = submit_result(&h.store, &h.config, submission).unwrap_err();
    assert!(matches!(err, EngineError::InvalidScore(_)));
}

#[test]
fn knockout_draw_without_penalties_is_rejected() {
    let (h, final_match) = final_pending();
    let err = h.play(&final_match, 1, 1).unwrap_err();
    assert_eq!(err, EngineError::DrawNotAllowed);

    let err = h.play_shootout(&final_match, 1, 3, 3).unwrap_err();
    assert_eq!(err, EngineError::DrawNotAllowed);
    assert!(!h.store.game(final_match.id).unwrap().unwrap().played);
}

#[test]
fn shootout_decides_a_level_knockout_match() {
    let (h, final_match) = final_pending();
    let recorded = h.play_shootout(&final_match, 2, 4, 5).unwrap();
    assert_eq!(recorded.game.winner(), Some(final_match.away_team_id));
    assert_eq!(
        recorded.advancement,
        Advancement::TournamentCompleted {
            champion: final_match.away_team_id
        }
    );
}

#[test]
fn decided_knockout_match_takes_no_penalties() {
    let (h, final_match) = final_pending();
    let mut submission = h.result(&final_match, 2, 1);
    submission.home_penalties = Some(5);
    submission.away_penalties = Some(4);
    let err = submit_result(&h.store, &h.config, submission).unwrap_err();
    assert!(matches!(err, EngineError::InvalidScore(_)));
}

#[test]
fn group_results_close_with_the_group_stage() {
    let h = started(TournamentFormat::Mixed, 4);
    let first = h.unplayed()[0].clone();
    h.play_open_matches();
    assert_eq!(h.current().phase, TournamentPhase::Knockout);

    let stored = h.store.game(first.id).unwrap().unwrap();
    let err = h.play(&stored, 5, 0).unwrap_err();
    assert_eq!(
        err,
        EngineError::WrongPhase {
            actual: TournamentPhase::Knockout
        }
    );
}

#[test]
fn completed_tournament_accepts_no_more_results() {
    let (h, final_match) = final_pending();
    h.play(&final_match, 1, 0).unwrap();
    let stored = h.store.game(final_match.id).unwrap().unwrap();
    let err = h.play(&stored, 0, 1).unwrap_err();
    assert_eq!(
        err,
        EngineError::WrongPhase {
            actual: TournamentPhase::Completed
        }
    );
}
