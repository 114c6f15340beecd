//! Headless bot-only runs of a game.
//!
//! Used by duration estimates and by tests that check a game survives being
//! saved and restored between every tick.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::core::{EngineConfig, GameStatus, OptionBag, PersistError, PlayerId};
use crate::engine::lifecycle;
use crate::game::{Game, GameResult};
use crate::persistence::{restore, serialize, Encoding};
use crate::user::UserHandle;

/// How a simulation ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationReport {
    /// Ticks from start to finish (or to the tick limit).
    pub ticks: u64,
    pub finished: bool,
    pub result: Option<GameResult>,
}

/// A table of bots ticked to completion.
pub struct Simulation<G: Game> {
    game: G,
    config: EngineConfig,
    max_ticks: u64,
    round_trip: Option<Encoding>,
    observers: Vec<(PlayerId, UserHandle)>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<G: Game> Simulation<G> {
    /// A lobby with `bot_count` bots and default options.
    #[must_use]
    pub fn new(bot_count: usize, seed: u64) -> Self {
        let mut game = G::new_table("simulation", seed);
        for _ in 0..bot_count {
            lifecycle::add_bot(&mut game, None);
        }
        let config = EngineConfig::default();
        Self {
            game,
            max_ticks: config.max_simulation_ticks,
            config,
            round_trip: None,
            observers: Vec::new(),
            cancel: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: OptionBag) -> Self {
        self.game.core_mut().options = options;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.max_ticks = config.max_simulation_ticks;
        self.game.core_mut().set_config(config.clone());
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Serialize and restore the table after every tick.
    #[must_use]
    pub fn with_round_trip(mut self, encoding: Encoding) -> Self {
        self.round_trip = Some(encoding);
        self
    }

    /// Stop at the next tick boundary once `flag` is set.
    #[must_use]
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Seat a spectating human who hears everything the table says. The
    /// observer is reattached after every round trip.
    #[must_use]
    pub fn with_observer(mut self, name: &str, user: UserHandle) -> Self {
        let id = lifecycle::add_player(&mut self.game, name, user.clone());
        if let Some(seat) = self.game.core_mut().player_mut(&id) {
            seat.is_spectator = true;
        }
        self.observers.push((id, user));
        self
    }

    #[must_use]
    pub fn game(&self) -> &G {
        &self.game
    }

    #[must_use]
    pub fn into_game(self) -> G {
        self.game
    }

    /// Start the game and tick until it finishes, the tick limit is hit or
    /// the run is cancelled.
    pub fn run(&mut self) -> Result<SimulationReport, PersistError> {
        if self.game.core().status == GameStatus::Lobby {
            lifecycle::start_game(&mut self.game);
        }
        let start = self.game.core().tick;
        loop {
            let core = self.game.core();
            if core.status == GameStatus::Finished || core.is_destroyed() || core.tick - start >= self.max_ticks {
                break;
            }
            if self.is_cancelled() {
                debug!(game = G::GAME_TYPE, ticks = core.tick - start, "simulation cancelled");
                break;
            }
            lifecycle::run_tick(&mut self.game);
            if let Some(encoding) = self.round_trip {
                self.reload(encoding)?;
            }
        }
        let core = self.game.core();
        let report = SimulationReport {
            ticks: core.tick - start,
            finished: core.status == GameStatus::Finished,
            result: core.result.clone(),
        };
        debug!(
            game = G::GAME_TYPE,
            ticks = report.ticks,
            finished = report.finished,
            "simulation ended"
        );
        Ok(report)
    }

    fn reload(&mut self, encoding: Encoding) -> Result<(), PersistError> {
        if self.game.core().is_destroyed() {
            return Ok(());
        }
        let blob = serialize(&self.game, encoding)?;
        let mut restored: G = restore(&blob)?;
        restored.core_mut().set_config(self.config.clone());
        for (id, user) in &self.observers {
            if let Err(err) = lifecycle::attach_user(&mut restored, id, user.clone()) {
                debug!(player = %id, error = %err, "observer lost its seat on reload");
            }
        }
        self.game = restored;
        Ok(())
    }
}
