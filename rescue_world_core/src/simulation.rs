//! Turn scheduling and win evaluation.

use rand::{
    SeedableRng,
    rngs::StdRng,
    seq::{IndexedRandom, SliceRandom},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    EntityId, Position,
    agent::{ActionContext, AgentMode, RescueAgent, Role},
    config::{GameRules, SimulationOptions},
    fire::{self, HazardEvent},
    layout::Layout,
    outcome::{GameCounters, GameResult, evaluate},
    poi::PoiManager,
    world::GridWorld,
};

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("no free floor cell to place agent {id} ({role:?})")]
    NoSpawnCell { id: EntityId, role: Role },
}

/// Externally observable state after a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnSummary {
    pub turn: u32,
    pub rescued: u32,
    pub lost: u32,
    pub damage: u32,
    pub found: u32,
    pub result: Option<GameResult>,
    /// Hazard event of the most recent turn.
    pub hazard: Option<HazardEvent>,
}

/// One row of per-turn metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMetrics {
    pub turn: u32,
    pub rescued: u32,
    pub lost: u32,
    pub damage: u32,
    pub fires: usize,
    pub smoke: usize,
}

/// Outcome of [`Simulation::run_to_end`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// `None` when the turn cap was reached first.
    pub result: Option<GameResult>,
    pub rescued: u32,
    pub lost: u32,
    pub damage: u32,
    pub turns: u32,
    pub final_fires: usize,
    pub final_smoke: usize,
    pub remaining_pois: usize,
}

/// A single rescue game.
///
/// All randomness comes from one generator seeded at construction, so two
/// instances built from the same layout, options and seed play out identically.
#[derive(Debug, Clone)]
pub struct Simulation {
    world: GridWorld,
    agents: Vec<RescueAgent>,
    pois: PoiManager,
    counters: GameCounters,
    rules: GameRules,
    mode: AgentMode,
    rng: StdRng,
    seed: u64,
    last_hazard: Option<HazardEvent>,
    metrics: Option<Vec<TurnMetrics>>,
}

impl Simulation {
    pub fn new(layout: &Layout, options: SimulationOptions) -> Result<Self, SimulationError> {
        let SimulationOptions {
            mode,
            seed,
            collect_metrics,
            rules,
        } = options;
        let seed = seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut world = GridWorld::from_layout(layout);
        let pois = PoiManager::from_rules(&rules);

        let mut agents = Vec::with_capacity(Role::TEAM.len());
        for (id, role) in Role::TEAM.into_iter().enumerate() {
            let candidates = spawn_cells(&world);
            let &position = candidates
                .choose(&mut rng)
                .ok_or(SimulationError::NoSpawnCell { id, role })?;
            debug!(agent = id, role = role.label(), ?position, "agent placed");
            agents.push(RescueAgent::new(
                id,
                role,
                position,
                mode,
                rules.action_points,
            ));
        }

        pois.replenish(&mut world, &mut rng);

        let entrances: Vec<Position> = world.entrances().iter().copied().collect();
        for entrance in entrances {
            world.discover_around(entrance);
        }

        let smoky: Vec<Position> = world
            .fire()
            .iter()
            .flat_map(|&burning| world.neighbors(burning))
            .filter(|&n| world.is_floor(n) && !world.has_fire(n))
            .collect();
        for pos in smoky {
            world.add_smoke(pos);
        }

        info!(
            seed,
            ?mode,
            width = world.width(),
            height = world.height(),
            "simulation created"
        );

        Ok(Simulation {
            world,
            agents,
            pois,
            counters: GameCounters::default(),
            rules,
            mode,
            rng,
            seed,
            last_hazard: None,
            metrics: collect_metrics.then(Vec::new),
        })
    }

    /// Plays one full turn: refill, every agent once in shuffled order, one
    /// hazard event, evaluation. Does nothing once the game is over.
    pub fn advance(&mut self) -> TurnSummary {
        if self.counters.is_terminal() {
            return self.summary();
        }

        self.counters.turn += 1;
        for agent in &mut self.agents {
            agent.refill();
        }

        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        order.shuffle(&mut self.rng);
        for index in order {
            let mut ctx = ActionContext {
                world: &mut self.world,
                pois: &self.pois,
                counters: &mut self.counters,
                rules: &self.rules,
                rng: &mut self.rng,
            };
            self.agents[index].act(&mut ctx);
        }

        self.last_hazard = fire::spread_hazard(
            &mut self.world,
            &self.pois,
            &mut self.counters,
            &mut self.rng,
        );

        if let Some(result) = evaluate(&self.counters, &self.rules) {
            self.counters.result = Some(result);
            info!(
                turn = self.counters.turn,
                rescued = self.counters.rescued,
                lost = self.counters.lost,
                damage = self.counters.damage,
                "game over: {result}"
            );
        }

        if let Some(metrics) = &mut self.metrics {
            metrics.push(TurnMetrics {
                turn: self.counters.turn,
                rescued: self.counters.rescued,
                lost: self.counters.lost,
                damage: self.counters.damage,
                fires: self.world.fire().len(),
                smoke: self.world.smoke().len(),
            });
        }

        self.summary()
    }

    /// Advances until the game ends or `max_turns` turns have been played.
    pub fn run_to_end(&mut self, max_turns: u32) -> RunSummary {
        while !self.is_terminal() && self.counters.turn < max_turns {
            self.advance();
        }
        self.run_summary()
    }

    pub fn run_summary(&self) -> RunSummary {
        RunSummary {
            result: self.counters.result,
            rescued: self.counters.rescued,
            lost: self.counters.lost,
            damage: self.counters.damage,
            turns: self.counters.turn,
            final_fires: self.world.fire().len(),
            final_smoke: self.world.smoke().len(),
            remaining_pois: self.world.pois().len(),
        }
    }

    pub fn summary(&self) -> TurnSummary {
        TurnSummary {
            turn: self.counters.turn,
            rescued: self.counters.rescued,
            lost: self.counters.lost,
            damage: self.counters.damage,
            found: self.counters.found,
            result: self.counters.result,
            hazard: self.last_hazard,
        }
    }

    /// Switches every agent to `mode`, dropping their current goals.
    pub fn set_mode(&mut self, mode: AgentMode) {
        self.mode = mode;
        for agent in &mut self.agents {
            agent.set_mode(mode);
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.counters.is_terminal()
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn agents(&self) -> &[RescueAgent] {
        &self.agents
    }

    pub fn counters(&self) -> &GameCounters {
        &self.counters
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn mode(&self) -> AgentMode {
        self.mode
    }

    /// The seed the instance's random source was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn last_hazard(&self) -> Option<HazardEvent> {
        self.last_hazard
    }

    /// Per-turn metrics, if they are being collected.
    pub fn metrics(&self) -> Option<&[TurnMetrics]> {
        self.metrics.as_deref()
    }
}

/// Floor cells an agent may start on: no fire, smoke, POI or closed door.
fn spawn_cells(world: &GridWorld) -> Vec<Position> {
    world
        .cells()
        .enumerate()
        .filter(|(pos, cell)| {
            let pos = *pos;
            cell.is_floor()
                && !world.has_fire(pos)
                && !world.has_smoke(pos)
                && !world.has_poi(pos)
                && !world.has_closed_door(pos)
        })
        .map(|(pos, _)| pos)
        .collect()
}
