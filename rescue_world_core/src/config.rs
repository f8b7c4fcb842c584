use serde::{Deserialize, Serialize};

use crate::agent::AgentMode;

/// Thresholds and constants of a rescue game.
///
/// `Default` yields the reference family-game values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Rescued victims needed for victory.
    pub victims_to_win: u32,
    /// Lost victims that end the game in defeat.
    pub max_victims_lost: u32,
    /// Structural damage that collapses the building.
    pub max_damage: u32,
    /// Number of points of interest kept on the board.
    pub active_pois: usize,
    /// Chance that a freshly generated POI hides a victim.
    pub victim_probability: f64,
    /// Found-victim markers allowed on the board at once.
    pub max_found_victims: usize,
    /// Action points every agent receives at the start of a turn.
    pub action_points: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            victims_to_win: 7,
            max_victims_lost: 4,
            max_damage: 24,
            active_pois: 3,
            victim_probability: 0.6,
            max_found_victims: 2,
            action_points: 4,
        }
    }
}

/// Everything besides the layout that shapes a simulation instance.
#[derive(Debug, Clone, Default)]
pub struct SimulationOptions {
    /// Operating mode applied to every agent.
    pub mode: AgentMode,
    /// Seed for the instance's single random source. `None` draws one.
    pub seed: Option<u64>,
    /// Record a [`TurnMetrics`](crate::simulation::TurnMetrics) row per turn.
    pub collect_metrics: bool,
    pub rules: GameRules,
}

impl SimulationOptions {
    pub fn new(mode: AgentMode) -> Self {
        SimulationOptions {
            mode,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_metrics(mut self) -> Self {
        self.collect_metrics = true;
        self
    }

    pub fn with_rules(mut self, rules: GameRules) -> Self {
        self.rules = rules;
        self
    }
}
