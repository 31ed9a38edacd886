//! Combat resolution for simultaneous conflicting claims
//!
//! All moves of a turn are grouped by target tile. For each contested tile
//! the claimants fight the current owner (and, transitively, each other):
//! the first fighter defends against the summed strength of the rest, a
//! uniform roll either confirms or eliminates it, and the survivors recurse
//! until one remains.

use std::collections::BTreeMap;

use rand::Rng;

use crate::civ::{CivId, Move};
use crate::grid::TileId;
use crate::rng::SimRng;
use crate::world::World;

/// A tile that changed hands during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCapture {
    pub tile: TileId,
    pub from: CivId,
    pub to: CivId,
}

/// Resolves every move of the turn, mutating ownership where a claimant
/// prevails. Tiles are resolved in index order; within one tile the fighters
/// are the claimants in move order with the current owner appended last.
pub(crate) fn resolve_moves(
    world: &mut World,
    moves: Vec<Move>,
    rng: &mut SimRng,
) -> Vec<TileCapture> {
    let mut by_target: BTreeMap<TileId, Vec<CivId>> = BTreeMap::new();
    for mv in moves {
        by_target.entry(mv.target).or_default().push(mv.civ);
    }

    let mut captures = Vec::new();
    for (target, claimants) in by_target {
        let owner = world.grid().tile(target).owner();
        let mut fighters = claimants;
        fighters.push(owner);

        let winner = resolve_combat(world, target, &fighters, rng);
        if winner != owner {
            world.transfer_tile(target, winner, rng);
            captures.push(TileCapture {
                tile: target,
                from: owner,
                to: winner,
            });
        }
    }
    captures
}

/// Recursive multi-party combat: the defender-designate either wins outright
/// or is eliminated and the rest fight on.
fn resolve_combat(world: &World, target: TileId, fighters: &[CivId], rng: &mut SimRng) -> CivId {
    if fighters.len() == 1 {
        return fighters[0];
    }

    let defender_strength = combat_weight(world.civ(fighters[0]).strength(target, world.grid()));
    let attackers_strength: u64 = fighters[1..]
        .iter()
        .map(|&civ| combat_weight(world.civ(civ).strength(target, world.grid())))
        .sum();

    if defender_survives(defender_strength, attackers_strength, rng) {
        fighters[0]
    } else {
        resolve_combat(world, target, &fighters[1..], rng)
    }
}

/// One roll of attackers against the defender. A powerless attacking side
/// cannot eliminate anyone; otherwise a uniform roll in
/// `[1, defender + attackers]` keeps the defender iff it lands within the
/// defender's share.
fn defender_survives(defender: u64, attackers: u64, rng: &mut SimRng) -> bool {
    if attackers == 0 {
        return true;
    }
    let roll = rng.gen_range(1..=defender + attackers);
    roll <= defender
}

/// Strength as a die weight: negative strength (including the sentinel's
/// minimum) counts for nothing.
fn combat_weight(strength: f64) -> u64 {
    if strength <= 0.0 {
        0
    } else {
        strength.floor() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    #[test]
    fn weight_clamps_negative_and_sentinel_strength() {
        assert_eq!(combat_weight(f64::NEG_INFINITY), 0);
        assert_eq!(combat_weight(-3.5), 0);
        assert_eq!(combat_weight(0.0), 0);
        assert_eq!(combat_weight(0.9), 0);
        assert_eq!(combat_weight(7.8), 7);
    }

    #[test]
    fn powerless_attackers_never_eliminate() {
        let mut rng = seeded(1);
        for _ in 0..100 {
            assert!(defender_survives(5, 0, &mut rng));
            assert!(defender_survives(0, 0, &mut rng));
        }
    }

    #[test]
    fn powerless_defender_always_falls() {
        let mut rng = seeded(2);
        for _ in 0..100 {
            assert!(!defender_survives(0, 10, &mut rng));
        }
    }

    #[test]
    fn contested_roll_goes_both_ways() {
        let mut rng = seeded(3);
        let mut survived = 0;
        let mut fell = 0;
        for _ in 0..200 {
            if defender_survives(10, 10, &mut rng) {
                survived += 1;
            } else {
                fell += 1;
            }
        }
        assert!(survived > 0 && fell > 0);
    }
}
