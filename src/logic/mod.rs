//! Tournament business logic: setup, group stage, standings, knockout bracket, results.

mod bracket;
mod fixtures;
mod reports;
mod results;
mod seeding;
mod setup;
mod standings;

pub use bracket::{bracket_state, try_advance_phase, Advancement, BracketRound, BracketView};
pub use fixtures::{generate_group_stage, group_label, partition_into_groups, round_robin_rounds};
pub use reports::{head_to_head, top_scorers, HeadToHead, ScorerRow};
pub use results::{submit_result, CardDetail, GoalDetail, RecordedResult, ResultSubmission};
pub use seeding::{
    bracket_order, bracket_size, first_round_pairings, select_qualifiers, separate_groups,
};
pub use setup::{
    add_player, create_team, create_tournament, list_matches, open_registration, register_team,
    start_tournament, tournament_phase,
};
pub use standings::{all_standings, compare_rows, compute_standings, compute_table, TeamRow};
