use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Position, config::GameRules, world::GridWorld};

/// What a point of interest turns out to be once revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoiKind {
    Victim,
    FalseAlarm,
}

impl PoiKind {
    pub fn is_victim(self) -> bool {
        matches!(self, PoiKind::Victim)
    }
}

/// Keeps the number of points of interest on the board at a fixed target.
///
/// Whenever the board is below target, replacements are drawn uniformly from
/// floor cells that hold no POI, fire, smoke, entrance or closed door. When no
/// such cell exists the deficit is left for the next opportunity.
#[derive(Debug, Clone)]
pub struct PoiManager {
    target: usize,
    victim_probability: f64,
}

impl PoiManager {
    pub fn new(target: usize, victim_probability: f64) -> Self {
        PoiManager {
            target,
            victim_probability,
        }
    }

    pub fn from_rules(rules: &GameRules) -> Self {
        Self::new(rules.active_pois, rules.victim_probability)
    }

    /// Floor cells a new POI may be placed on, in row-major order.
    pub fn eligible_cells(world: &GridWorld) -> Vec<Position> {
        world
            .cells()
            .enumerate()
            .filter(|(pos, cell)| {
                let pos = *pos;
                cell.is_floor()
                    && !world.has_poi(pos)
                    && !world.has_fire(pos)
                    && !world.has_smoke(pos)
                    && !world.is_entrance(pos)
                    && !world.has_closed_door(pos)
            })
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Fills the board up to the target. Returns how many POIs were placed.
    pub fn replenish(&self, world: &mut GridWorld, rng: &mut impl Rng) -> usize {
        let mut placed = 0;
        while world.pois().len() < self.target {
            let candidates = Self::eligible_cells(world);
            let Some(&pos) = candidates.choose(rng) else {
                debug!(
                    active = world.pois().len(),
                    target = self.target,
                    "no free cell for a new point of interest"
                );
                break;
            };
            let kind = if rng.random::<f64>() < self.victim_probability {
                PoiKind::Victim
            } else {
                PoiKind::FalseAlarm
            };
            world.insert_poi(pos, kind);
            debug!(?pos, ?kind, "point of interest placed");
            placed += 1;
        }
        placed
    }

    /// Removes the POI at `pos`, returning its kind, and tops the board back up.
    pub fn reveal(
        &self,
        world: &mut GridWorld,
        pos: Position,
        rng: &mut impl Rng,
    ) -> Option<PoiKind> {
        let kind = world.remove_poi(pos)?;
        self.replenish(world, rng);
        Some(kind)
    }

    /// Removes every POI now standing in fire, replacing each as it goes.
    /// Returns the burned POIs in row-major order.
    pub fn burn(&self, world: &mut GridWorld, rng: &mut impl Rng) -> Vec<(Position, PoiKind)> {
        let burning: Vec<Position> = world
            .pois()
            .keys()
            .copied()
            .filter(|pos| world.has_fire(*pos))
            .collect();

        let mut burned = Vec::with_capacity(burning.len());
        for pos in burning {
            if let Some(kind) = world.remove_poi(pos) {
                debug!(?pos, ?kind, "point of interest consumed by fire");
                burned.push((pos, kind));
                self.replenish(world, rng);
            }
        }
        burned
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{Direction, world::Walls};

    fn pos(x: usize, y: usize) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn replenish_fills_to_target_on_eligible_cells() {
        let mut world = GridWorld::new(8, 6);
        world.ignite(pos(4, 3));
        world.add_smoke(pos(5, 3));
        world.add_entrance(pos(0, 0));
        world.add_closed_door(pos(1, 0), Direction::Left);
        let manager = PoiManager::new(3, 0.6);

        for seed in 0..50 {
            let mut world = world.clone();
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(manager.replenish(&mut world, &mut rng), 3);
            assert_eq!(world.pois().len(), 3);
            for blocked in [pos(4, 3), pos(5, 3), pos(0, 0), pos(1, 0)] {
                assert!(!world.has_poi(blocked));
            }
        }
    }

    #[test]
    fn replenish_carries_deficit_when_board_is_full() {
        let mut world = GridWorld::new(2, 1);
        world.set_walls(pos(1, 0), Walls::all());
        let manager = PoiManager::new(3, 0.6);
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(manager.replenish(&mut world, &mut rng), 1);
        assert_eq!(world.pois().len(), 1);
        assert!(world.has_poi(pos(0, 0)));

        world.remove_poi(pos(0, 0));
        world.ignite(pos(0, 0));
        assert_eq!(manager.replenish(&mut world, &mut rng), 0);
        assert!(world.pois().is_empty());
    }

    #[test]
    fn kinds_follow_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(1);

        let mut world = GridWorld::new(4, 4);
        PoiManager::new(5, 1.0).replenish(&mut world, &mut rng);
        assert!(world.pois().values().all(|k| k.is_victim()));

        let mut world = GridWorld::new(4, 4);
        PoiManager::new(5, 0.0).replenish(&mut world, &mut rng);
        assert!(world.pois().values().all(|k| !k.is_victim()));
    }

    #[test]
    fn reveal_replaces_the_revealed_poi() {
        let mut world = GridWorld::new(8, 6);
        let manager = PoiManager::new(3, 0.6);
        let mut rng = StdRng::seed_from_u64(3);
        world.insert_poi(pos(2, 2), PoiKind::FalseAlarm);
        manager.replenish(&mut world, &mut rng);

        assert_eq!(manager.reveal(&mut world, pos(2, 2), &mut rng), Some(PoiKind::FalseAlarm));
        assert_eq!(world.pois().len(), 3);
        assert_eq!(manager.reveal(&mut world, pos(7, 7), &mut rng), None);
    }

    #[test]
    fn burn_removes_pois_under_fire_and_replaces_them() {
        let mut world = GridWorld::new(8, 6);
        let manager = PoiManager::new(3, 0.6);
        let mut rng = StdRng::seed_from_u64(11);
        world.insert_poi(pos(1, 1), PoiKind::Victim);
        world.insert_poi(pos(2, 1), PoiKind::FalseAlarm);
        world.insert_poi(pos(3, 1), PoiKind::Victim);
        world.ignite(pos(1, 1));
        world.ignite(pos(2, 1));

        let burned = manager.burn(&mut world, &mut rng);
        assert_eq!(
            burned,
            vec![(pos(1, 1), PoiKind::Victim), (pos(2, 1), PoiKind::FalseAlarm)]
        );
        assert_eq!(world.pois().len(), 3);
        assert!(world.pois().keys().all(|p| !world.has_fire(*p)));
    }
}
