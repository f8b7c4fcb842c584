//! Per-turn hazard propagation.
//!
//! One event per turn: a discovered floor cell is sampled uniformly and
//! escalates one stage. Clear cells fill with smoke, smoke bursts into fire,
//! and a cell already burning spreads to a random neighbour. Every new
//! ignition is followed by structural-damage and POI-burn detection.

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Position, outcome::GameCounters, poi::PoiManager, world::GridWorld};

/// What the hazard step did this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazardEvent {
    /// Smoke settled on a clear cell.
    Smoke(Position),
    /// Smoke at this cell became fire.
    Ignition(Position),
    /// Fire at `from` spread directly into `to`.
    Expansion { from: Position, to: Position },
    /// A burning cell was sampled but had nowhere to spread.
    Contained(Position),
}

/// Applies one hazard event. Returns `None` when no discovered floor cell exists.
pub fn spread_hazard(
    world: &mut GridWorld,
    pois: &PoiManager,
    counters: &mut GameCounters,
    rng: &mut impl Rng,
) -> Option<HazardEvent> {
    let candidates = world.discovered_floor_cells();
    let &sampled = candidates.choose(rng)?;

    let event = if !world.has_fire(sampled) && !world.has_smoke(sampled) {
        world.add_smoke(sampled);
        HazardEvent::Smoke(sampled)
    } else if world.has_smoke(sampled) {
        world.ignite(sampled);
        after_ignition(world, pois, counters, rng);
        HazardEvent::Ignition(sampled)
    } else {
        let spread_to: Vec<Position> = world
            .neighbors(sampled)
            .filter(|n| world.is_discovered(*n) && world.is_floor(*n) && !world.has_fire(*n))
            .collect();
        match spread_to.choose(rng) {
            Some(&target) => {
                world.ignite(target);
                after_ignition(world, pois, counters, rng);
                HazardEvent::Expansion {
                    from: sampled,
                    to: target,
                }
            }
            None => HazardEvent::Contained(sampled),
        }
    };

    debug!(?event, "hazard event");
    Some(event)
}

fn after_ignition(
    world: &mut GridWorld,
    pois: &PoiManager,
    counters: &mut GameCounters,
    rng: &mut impl Rng,
) {
    if let Some(run) = detect_structural_damage(world) {
        counters.damage += 1;
        debug!(?run, damage = counters.damage, "structural damage");
    }

    for (pos, kind) in pois.burn(world, rng) {
        if kind.is_victim() {
            counters.lost += 1;
            debug!(?pos, lost = counters.lost, "victim lost to fire");
        }
    }
}

/// Finds the first run of three burning cells in a straight line.
///
/// Horizontal runs are scanned row by row before vertical runs column by
/// column; only the first run matters since one ignition adds at most one
/// damage point.
pub fn detect_structural_damage(world: &GridWorld) -> Option<[Position; 3]> {
    let (width, height) = (world.width(), world.height());
    let burning = |run: &[Position; 3]| run.iter().all(|p| world.has_fire(*p));

    let horizontal = (0..height).flat_map(|y| {
        (0..width.saturating_sub(2)).map(move |x| {
            [
                Position::new(x, y),
                Position::new(x + 1, y),
                Position::new(x + 2, y),
            ]
        })
    });
    let vertical = (0..width).flat_map(|x| {
        (0..height.saturating_sub(2)).map(move |y| {
            [
                Position::new(x, y),
                Position::new(x, y + 1),
                Position::new(x, y + 2),
            ]
        })
    });

    horizontal.chain(vertical).find(burning)
}
