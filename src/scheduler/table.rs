//! Object-safe view of a table, so the scheduler can hold tables of
//! different game types side by side.

use crate::core::{EngineConfig, GameStatus, PersistError, PlayerId, Rejection};
use crate::engine::{events, lifecycle, menus, Dispatch, PlayerEvent};
use crate::game::{Game, GameResult};
use crate::persistence::{serialize, Encoding, StateBlob};
use crate::user::UserHandle;

/// A running table as the scheduler sees it.
pub trait Table: Send {
    fn table_id(&self) -> &str;

    fn game_type(&self) -> &str;

    fn status(&self) -> GameStatus;

    /// Ticks processed so far.
    fn tick_count(&self) -> u64;

    /// Run one tick.
    fn tick(&mut self);

    fn dispatch(&mut self, player: &PlayerId, event: PlayerEvent) -> Result<Dispatch, Rejection>;

    /// Seat a connecting user, or reattach them to their seat.
    fn join(&mut self, name: &str, user: UserHandle) -> PlayerId;

    fn attach_user(&mut self, player: &PlayerId, user: UserHandle) -> Result<(), Rejection>;

    fn detach_user(&mut self, player: &PlayerId);

    fn leave(&mut self, player: &PlayerId);

    fn snapshot(&self, encoding: Encoding) -> Result<StateBlob, PersistError>;

    /// The player who asked for a save since the last call, if any.
    fn take_save_request(&mut self) -> Option<PlayerId>;

    fn is_destroyed(&self) -> bool;

    fn destroy(&mut self);

    fn configure(&mut self, config: &EngineConfig);

    fn result(&self) -> Option<&GameResult>;
}

impl<G: Game> Table for G {
    fn table_id(&self) -> &str {
        &self.core().table_id
    }

    fn game_type(&self) -> &str {
        &self.core().game_type
    }

    fn status(&self) -> GameStatus {
        self.core().status
    }

    fn tick_count(&self) -> u64 {
        self.core().tick
    }

    fn tick(&mut self) {
        lifecycle::run_tick(self);
    }

    fn dispatch(&mut self, player: &PlayerId, event: PlayerEvent) -> Result<Dispatch, Rejection> {
        events::handle_event(self, player, event)
    }

    fn join(&mut self, name: &str, user: UserHandle) -> PlayerId {
        let id = lifecycle::add_player(self, name, user);
        menus::flush(self);
        id
    }

    fn attach_user(&mut self, player: &PlayerId, user: UserHandle) -> Result<(), Rejection> {
        lifecycle::attach_user(self, player, user)
    }

    fn detach_user(&mut self, player: &PlayerId) {
        lifecycle::detach_user(self, player);
    }

    fn leave(&mut self, player: &PlayerId) {
        lifecycle::leave_table(self, player);
        menus::flush(self);
    }

    fn snapshot(&self, encoding: Encoding) -> Result<StateBlob, PersistError> {
        serialize(self, encoding)
    }

    fn take_save_request(&mut self) -> Option<PlayerId> {
        self.core_mut().runtime.save_requested.take()
    }

    fn is_destroyed(&self) -> bool {
        self.core().is_destroyed()
    }

    fn destroy(&mut self) {
        lifecycle::destroy(self);
    }

    fn configure(&mut self, config: &EngineConfig) {
        self.core_mut().set_config(config.clone());
    }

    fn result(&self) -> Option<&GameResult> {
        self.core().result.as_ref()
    }
}
