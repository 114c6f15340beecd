//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::persistence::Encoding;

/// Engine-wide tunables shared by the scheduler, bots and estimation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of one scheduler tick in milliseconds (default: 50).
    pub tick_interval_ms: u64,

    /// Number of bot-only simulations per duration estimate.
    pub estimate_simulations: usize,

    /// How much slower humans play than bots.
    /// Applied to the simulated mean when reporting an estimate.
    pub human_speed_multiplier: f64,

    /// Hard stop for a single simulation run.
    pub max_simulation_ticks: u64,

    /// Default pause before a bot acts.
    pub bot_think_ticks: u32,

    /// Encoding used when the scheduler saves a table.
    pub snapshot_encoding: Encoding,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            estimate_simulations: 10,
            human_speed_multiplier: 2.0,
            max_simulation_ticks: 500_000,
            bot_think_ticks: 5,
            snapshot_encoding: Encoding::Json,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    #[must_use]
    pub fn ticks_per_second(&self) -> u64 {
        (1000 / self.tick_interval_ms.max(1)).max(1)
    }

    pub fn with_tick_interval_ms(mut self, millis: u64) -> Self {
        self.tick_interval_ms = millis;
        self
    }

    pub fn with_estimate_simulations(mut self, count: usize) -> Self {
        self.estimate_simulations = count;
        self
    }

    pub fn with_human_speed_multiplier(mut self, multiplier: f64) -> Self {
        self.human_speed_multiplier = multiplier;
        self
    }

    pub fn with_max_simulation_ticks(mut self, ticks: u64) -> Self {
        self.max_simulation_ticks = ticks;
        self
    }

    pub fn with_bot_think_ticks(mut self, ticks: u32) -> Self {
        self.bot_think_ticks = ticks;
        self
    }

    pub fn with_snapshot_encoding(mut self, encoding: Encoding) -> Self {
        self.snapshot_encoding = encoding;
        self
    }
}
