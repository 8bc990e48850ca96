//! Shared helpers: a registered tournament on an in-memory store, and result builders.

#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use tournament_engine::{
    add_player, create_team, create_tournament, open_registration, register_team, submit_result,
    EngineConfig, EngineError, GameMatch, GoalDetail, MemoryStore, PlayerId, RecordedResult,
    ResultSubmission, Store, Team, TeamId, Tournament, TournamentFormat,
};

pub struct Harness {
    pub store: MemoryStore,
    pub config: EngineConfig,
    pub tournament: Tournament,
    pub teams: Vec<Team>,
    /// One goalscorer per team.
    pub strikers: HashMap<TeamId, PlayerId>,
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()
}

pub fn harness(format: TournamentFormat, teams: usize) -> Harness {
    harness_with(format, teams, EngineConfig::default())
}

pub fn harness_with(format: TournamentFormat, n: usize, config: EngineConfig) -> Harness {
    let store = MemoryStore::new();
    let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
    let tournament = create_tournament(&store, "Spring Cup", format, start_date(), end).unwrap();
    open_registration(&store, tournament.id).unwrap();

    let mut teams = Vec::new();
    let mut strikers = HashMap::new();
    for i in 0..n {
        let team = create_team(&store, &format!("Team {i}")).unwrap();
        let striker = add_player(&store, team.id, &format!("Striker {i}")).unwrap();
        register_team(&store, tournament.id, team.id).unwrap();
        strikers.insert(team.id, striker.id);
        teams.push(team);
    }
    let tournament = store.tournament(tournament.id).unwrap().unwrap();
    Harness {
        store,
        config,
        tournament,
        teams,
        strikers,
    }
}

impl Harness {
    /// A submission with every goal credited to the teams' strikers.
    pub fn result(&self, game: &GameMatch, home: u32, away: u32) -> ResultSubmission {
        let mut goals = Vec::new();
        for (team, count) in [(game.home_team_id, home), (game.away_team_id, away)] {
            for i in 0..count {
                goals.push(GoalDetail {
                    player_id: self.strikers[&team],
                    minute: 10 + i,
                    own_goal: false,
                });
            }
        }
        ResultSubmission {
            match_id: game.id,
            expected_version: game.version,
            home_goals: home,
            away_goals: away,
            goals,
            cards: Vec::new(),
            home_penalties: None,
            away_penalties: None,
        }
    }

    pub fn play(&self, game: &GameMatch, home: u32, away: u32) -> Result<RecordedResult, EngineError> {
        submit_result(&self.store, &self.config, self.result(game, home, away))
    }

    pub fn play_shootout(
        &self,
        game: &GameMatch,
        goals: u32,
        home_penalties: u32,
        away_penalties: u32,
    ) -> Result<RecordedResult, EngineError> {
        let mut submission = self.result(game, goals, goals);
        submission.home_penalties = Some(home_penalties);
        submission.away_penalties = Some(away_penalties);
        submit_result(&self.store, &self.config, submission)
    }

    pub fn matches(&self) -> Vec<GameMatch> {
        let id = self.tournament.id;
        self.store.matches(&|m| m.tournament_id == id).unwrap()
    }

    pub fn unplayed(&self) -> Vec<GameMatch> {
        let mut open: Vec<GameMatch> = self.matches().into_iter().filter(|m| !m.played).collect();
        open.sort_by_key(|m| (m.group.clone(), m.matchday, m.bracket_slot));
        open
    }

    /// Play every open match as a 1-0 home win; returns the last recorded result.
    pub fn play_open_matches(&self) -> RecordedResult {
        let mut last = None;
        for game in self.unplayed() {
            last = Some(self.play(&game, 1, 0).unwrap());
        }
        last.expect("no open matches")
    }

    pub fn current(&self) -> Tournament {
        self.store.tournament(self.tournament.id).unwrap().unwrap()
    }
}
