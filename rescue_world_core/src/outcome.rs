use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::GameRules;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Victory,
    VictimsLost,
    Collapse,
}

impl GameResult {
    pub fn is_victory(self) -> bool {
        matches!(self, GameResult::Victory)
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameResult::Victory => "victory",
            GameResult::VictimsLost => "defeat: victims lost",
            GameResult::Collapse => "defeat: structural collapse",
        })
    }
}

/// Accumulated game counters. `result` is set once the game is over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCounters {
    pub turn: u32,
    pub rescued: u32,
    pub lost: u32,
    pub damage: u32,
    /// Victims revealed and not yet delivered.
    pub found: u32,
    pub result: Option<GameResult>,
}

impl GameCounters {
    pub fn is_terminal(&self) -> bool {
        self.result.is_some()
    }
}

/// Checks the termination thresholds in priority order: rescued, lost, damage.
pub fn evaluate(counters: &GameCounters, rules: &GameRules) -> Option<GameResult> {
    if counters.rescued >= rules.victims_to_win {
        Some(GameResult::Victory)
    } else if counters.lost >= rules.max_victims_lost {
        Some(GameResult::VictimsLost)
    } else if counters.damage >= rules.max_damage {
        Some(GameResult::Collapse)
    } else {
        None
    }
}
