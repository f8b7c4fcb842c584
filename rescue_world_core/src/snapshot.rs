//! Read-only export of simulation state.
//!
//! Contents of undiscovered cells are withheld: their hazard, POI and door
//! flags read as empty and they are left out of the marker lists. Walls and
//! entrances are structural and always visible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    Direction, EntityId, Position,
    agent::{AgentMode, BehaviorState, RescueAgent, Role},
    outcome::GameResult,
    simulation::{RunSummary, Simulation, TurnSummary},
    world::GridWorld,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Position in a recorder's history; the turn number otherwise.
    pub step: usize,
    pub width: usize,
    pub height: usize,
    pub agents: Vec<AgentSnapshot>,
    /// Every cell in row-major order.
    pub cells: Vec<CellSnapshot>,
    pub markers: Markers,
    pub stats: Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: EntityId,
    pub role: Role,
    pub position: Position,
    pub state: BehaviorState,
    pub action_points: u32,
    pub max_action_points: u32,
    pub carrying: bool,
    pub target: Option<Position>,
    pub mode: AgentMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub position: Position,
    pub floor: bool,
    pub discovered: bool,
    pub fire: bool,
    pub smoke: bool,
    pub poi: bool,
    pub found_victim: bool,
    pub closed_door: bool,
    pub open_door: bool,
    pub door_facing: Option<Direction>,
    pub entrance: bool,
    /// Up, left, down, right; `1` where a wall stands.
    pub walls: [u8; 4],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorMarker {
    pub position: Position,
    pub facing: Direction,
}

/// Discovered content grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    pub fire: Vec<Position>,
    pub smoke: Vec<Position>,
    pub pois: Vec<Position>,
    pub found_victims: Vec<Position>,
    pub closed_doors: Vec<DoorMarker>,
    pub open_doors: Vec<DoorMarker>,
    pub entrances: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub turn: u32,
    pub rescued: u32,
    pub lost: u32,
    pub found: u32,
    pub damage: u32,
    pub terminal: bool,
    pub result: Option<GameResult>,
    pub active_fires: usize,
    pub active_smoke: usize,
    pub active_pois: usize,
    pub found_markers: usize,
    pub victims_to_win: u32,
    pub max_victims_lost: u32,
    pub max_damage: u32,
    pub mode: AgentMode,
    pub seed: u64,
}

impl Snapshot {
    pub fn capture(sim: &Simulation, step: usize) -> Self {
        let world = sim.world();
        let counters = sim.counters();
        let rules = sim.rules();

        Snapshot {
            step,
            width: world.width(),
            height: world.height(),
            agents: sim.agents().iter().map(AgentSnapshot::from).collect(),
            cells: world
                .cells()
                .positions()
                .map(|pos| CellSnapshot::capture(world, pos))
                .collect(),
            markers: Markers::capture(world),
            stats: Statistics {
                turn: counters.turn,
                rescued: counters.rescued,
                lost: counters.lost,
                found: counters.found,
                damage: counters.damage,
                terminal: counters.is_terminal(),
                result: counters.result,
                active_fires: world.fire().len(),
                active_smoke: world.smoke().len(),
                active_pois: world.pois().len(),
                found_markers: world.found_victims().len(),
                victims_to_win: rules.victims_to_win,
                max_victims_lost: rules.max_victims_lost,
                max_damage: rules.max_damage,
                mode: sim.mode(),
                seed: sim.seed(),
            },
        }
    }
}

impl From<&RescueAgent> for AgentSnapshot {
    fn from(agent: &RescueAgent) -> Self {
        AgentSnapshot {
            id: agent.id(),
            role: agent.role(),
            position: agent.position(),
            state: agent.state(),
            action_points: agent.action_points(),
            max_action_points: agent.max_action_points(),
            carrying: agent.is_carrying(),
            target: agent.target(),
            mode: agent.mode(),
        }
    }
}

impl CellSnapshot {
    fn capture(world: &GridWorld, pos: Position) -> Self {
        let seen = world.is_discovered(pos);
        CellSnapshot {
            position: pos,
            floor: world.is_floor(pos),
            discovered: seen,
            fire: seen && world.has_fire(pos),
            smoke: seen && world.has_smoke(pos),
            poi: seen && world.has_poi(pos),
            found_victim: seen && world.has_found_victim(pos),
            closed_door: seen && world.has_closed_door(pos),
            open_door: seen && world.open_doors().contains_key(&pos),
            door_facing: world.door_facing(pos).filter(|_| seen),
            entrance: world.is_entrance(pos),
            walls: world.cell(pos).map(|c| c.walls.sides()).unwrap_or_default(),
        }
    }
}

impl Markers {
    fn capture(world: &GridWorld) -> Self {
        let seen = |pos: &Position| world.is_discovered(*pos);
        let doors = |doors: &BTreeMap<Position, Direction>| -> Vec<DoorMarker> {
            doors
                .iter()
                .filter(|(pos, _)| seen(*pos))
                .map(|(&position, &facing)| DoorMarker { position, facing })
                .collect()
        };

        Markers {
            fire: world.fire().iter().copied().filter(seen).collect(),
            smoke: world.smoke().iter().copied().filter(seen).collect(),
            pois: world.pois().keys().copied().filter(seen).collect(),
            found_victims: world.found_victims().iter().copied().filter(seen).collect(),
            closed_doors: doors(world.closed_doors()),
            open_doors: doors(world.open_doors()),
            entrances: world.entrances().iter().copied().collect(),
        }
    }
}

impl Simulation {
    /// Snapshot of the current state, stepped by turn number.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self, self.counters().turn as usize)
    }
}

/// Wraps a [`Simulation`] and keeps a snapshot of every state it passes
/// through: one after construction and one after each turn played.
#[derive(Debug, Clone)]
pub struct SnapshotRecorder {
    simulation: Simulation,
    history: Vec<Snapshot>,
}

impl SnapshotRecorder {
    pub fn new(simulation: Simulation) -> Self {
        let initial = Snapshot::capture(&simulation, 0);
        SnapshotRecorder {
            simulation,
            history: vec![initial],
        }
    }

    /// Advances the wrapped simulation. Turns after the game ended are not
    /// recorded since they change nothing.
    pub fn advance(&mut self) -> TurnSummary {
        if self.simulation.is_terminal() {
            return self.simulation.summary();
        }
        let summary = self.simulation.advance();
        let step = self.history.len();
        self.history.push(Snapshot::capture(&self.simulation, step));
        summary
    }

    pub fn run_to_end(&mut self, max_turns: u32) -> RunSummary {
        while !self.simulation.is_terminal() && self.simulation.counters().turn < max_turns {
            self.advance();
        }
        self.simulation.run_summary()
    }

    pub fn set_mode(&mut self, mode: AgentMode) {
        self.simulation.set_mode(mode);
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn at(&self, step: usize) -> Option<&Snapshot> {
        self.history.get(step)
    }

    pub fn latest(&self) -> &Snapshot {
        // `new` records the initial state, so history is never empty.
        &self.history[self.history.len() - 1]
    }
}
