//! Knockout seeding: which teams qualify, in which seed order, and where each seed sits in the
//! bracket.

use crate::config::{EngineConfig, SeedingPolicy};
use crate::logic::standings::{compare_rows, TeamRow};
use crate::models::{GroupLabel, TeamId};
use std::collections::HashMap;

/// Seed order from finished group tables (ordered by group label).
///
/// Takes the top `qualifiers_per_group` of each group, one finishing position at a time: all
/// winners, then all runners-up. With fewer than two qualifiers the next positions are taken
/// until a final can be played.
pub fn select_qualifiers(
    tables: &[(GroupLabel, Vec<TeamRow>)],
    config: &EngineConfig,
) -> Vec<TeamId> {
    let deepest = tables.iter().map(|(_, t)| t.len()).max().unwrap_or(0);
    let mut seeds = Vec::new();
    for position in 0..deepest {
        if position >= config.qualifiers_per_group && seeds.len() >= 2 {
            break;
        }
        let mut band: Vec<&TeamRow> = tables
            .iter()
            .filter_map(|(_, table)| table.get(position))
            .collect();
        if config.seeding == SeedingPolicy::Merit {
            band.sort_by(|a, b| compare_rows(a, b, &config.tie_breakers));
        }
        seeds.extend(band.into_iter().map(|row| row.team_id));
    }
    seeds
}

/// Smallest power-of-two bracket holding `entrants` (at least 2).
pub fn bracket_size(entrants: usize) -> usize {
    entrants.max(2).next_power_of_two()
}

/// Standard single-elimination draw for `size` slots, as 1-based seed numbers in bracket order.
/// Seed 1 meets the lowest seed, seed 2 the next-lowest, and the top two seeds can only meet in
/// the final: for 8 slots, `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn bracket_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let mirror = order.len() * 2 + 1;
        order = order.iter().flat_map(|&s| [s, mirror - s]).collect();
    }
    order
}

/// First-round slots for `entrants` seeds as 0-based seed indices: the higher seed, then the
/// lower seed or None for a bye.
fn first_round_slots(entrants: usize) -> Vec<(usize, Option<usize>)> {
    bracket_order(bracket_size(entrants))
        .chunks_exact(2)
        .filter_map(|pair| {
            let (high, low) = (pair[0].min(pair[1]) - 1, pair[0].max(pair[1]) - 1);
            (high < entrants).then(|| (high, (low < entrants).then_some(low)))
        })
        .collect()
}

/// First-round pairings for `seeds`, one entry per bracket slot. The higher seed comes first;
/// the second side is None when the higher seed has a bye.
pub fn first_round_pairings(seeds: &[TeamId]) -> Vec<(TeamId, Option<TeamId>)> {
    first_round_slots(seeds.len())
        .into_iter()
        .map(|(high, low)| (seeds[high], low.map(|low| seeds[low])))
        .collect()
}

/// Reorder lower seeds so that no first-round match is a rematch from the same group. A lower
/// seed facing its own group trades places with the lower seed of another match when the trade
/// leaves both matches cross-group. Clashes with no such trade (one group only) are kept.
pub fn separate_groups(seeds: &mut [TeamId], group_of: &HashMap<TeamId, GroupLabel>) {
    let same_group = |a: &TeamId, b: &TeamId| match (group_of.get(a), group_of.get(b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    };
    let slots = first_round_slots(seeds.len());
    for &(high, low) in &slots {
        let Some(low) = low else { continue };
        if !same_group(&seeds[high], &seeds[low]) {
            continue;
        }
        let partner = slots.iter().find_map(|&(other_high, other_low)| {
            let other_low = other_low?;
            (other_low != low
                && !same_group(&seeds[high], &seeds[other_low])
                && !same_group(&seeds[other_high], &seeds[low]))
            .then_some(other_low)
        });
        if let Some(other_low) = partner {
            seeds.swap(low, other_low);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_order_for_eight() {
        assert_eq!(bracket_order(8), vec![1, 8, 4, 5, 2, 7, 3, 6]);
        assert_eq!(bracket_order(2), vec![1, 2]);
    }

    #[test]
    fn byes_go_to_top_seeds() {
        let seeds: Vec<TeamId> = (0..6).map(|_| uuid::Uuid::new_v4()).collect();
        let pairings = first_round_pairings(&seeds);
        assert_eq!(pairings.len(), 4);
        assert_eq!(pairings[0], (seeds[0], None));
        assert_eq!(pairings[1], (seeds[3], Some(seeds[4])));
        assert_eq!(pairings[2], (seeds[1], None));
        assert_eq!(pairings[3], (seeds[2], Some(seeds[5])));
    }

    #[test]
    fn three_groups_avoid_first_round_rematches() {
        // Winners A1 B1 C1, then runners-up A2 B2 C2.
        let seeds: Vec<TeamId> = (0..6).map(|_| uuid::Uuid::new_v4()).collect();
        let group_of: HashMap<TeamId, GroupLabel> = seeds
            .iter()
            .enumerate()
            .map(|(i, &team)| (team, ["A", "B", "C"][i % 3].to_string()))
            .collect();
        let mut separated = seeds.clone();
        separate_groups(&mut separated, &group_of);

        let pairings = first_round_pairings(&separated);
        for (high, low) in &pairings {
            if let Some(low) = low {
                assert_ne!(group_of[high], group_of[low]);
            }
        }
        // Winners keep their seeds and the top two keep their byes.
        assert_eq!(separated[..3], seeds[..3]);
        assert_eq!(pairings[0], (seeds[0], None));
        assert_eq!(pairings[2], (seeds[1], None));
    }

    #[test]
    fn single_group_final_is_left_alone() {
        let seeds: Vec<TeamId> = (0..2).map(|_| uuid::Uuid::new_v4()).collect();
        let group_of: HashMap<TeamId, GroupLabel> =
            seeds.iter().map(|&team| (team, "A".to_string())).collect();
        let mut separated = seeds.clone();
        separate_groups(&mut separated, &group_of);
        assert_eq!(separated, seeds);
    }
}
