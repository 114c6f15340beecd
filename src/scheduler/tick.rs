//! The tick loop.
//!
//! ## Scheduler
//!
//! One [`Scheduler`] owns every live table. Each cycle it:
//! 1. Drains queued commands from transports, in arrival order
//! 2. Ticks every live table once
//! 3. Saves and closes tables whose host asked for a save
//! 4. Drops destroyed tables
//!
//! Commands from other threads arrive through a [`SchedulerHandle`] and are
//! only ever applied on the scheduler's own thread, so a table never runs
//! two things at once. A panic inside one table freezes that table; the
//! others keep ticking.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use super::table::Table;
use crate::core::{EngineConfig, PersistError, PlayerId, Rejection, TickError};
use crate::engine::{Dispatch, PlayerEvent};
use crate::persistence::{GameRegistry, PersistenceStore, StateBlob};
use crate::user::UserHandle;

/// Whether a table is still being ticked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TableHealth {
    Live,
    /// Stopped after a fault; kept for inspection and never ticked again.
    Frozen { reason: String },
}

impl TableHealth {
    #[must_use]
    pub fn is_live(&self) -> bool {
        matches!(self, TableHealth::Live)
    }
}

struct TableSlot {
    table: Box<dyn Table>,
    health: TableHealth,
}

type Reply<T> = Option<Sender<Result<T, Rejection>>>;

/// Work queued for a table by a transport.
pub enum Command {
    Event {
        table_id: String,
        player: PlayerId,
        event: PlayerEvent,
        reply: Reply<Dispatch>,
    },
    Join {
        table_id: String,
        name: String,
        user: UserHandle,
        reply: Reply<PlayerId>,
    },
    Attach {
        table_id: String,
        player: PlayerId,
        user: UserHandle,
        reply: Reply<()>,
    },
    Detach {
        table_id: String,
        player: PlayerId,
    },
    Leave {
        table_id: String,
        player: PlayerId,
    },
}

impl Command {
    fn table_id(&self) -> &str {
        match self {
            Command::Event { table_id, .. }
            | Command::Join { table_id, .. }
            | Command::Attach { table_id, .. }
            | Command::Detach { table_id, .. }
            | Command::Leave { table_id, .. } => table_id,
        }
    }

    fn refuse(self, rejection: Rejection) {
        match self {
            Command::Event { reply, .. } => send(reply, Err(rejection)),
            Command::Join { reply, .. } => send(reply, Err(rejection)),
            Command::Attach { reply, .. } => send(reply, Err(rejection)),
            Command::Detach { .. } | Command::Leave { .. } => {}
        }
    }
}

fn send<T>(reply: Reply<T>, result: Result<T, Rejection>) {
    if let Some(reply) = reply {
        // The caller may have stopped waiting.
        let _ = reply.send(result);
    }
}

/// Cloneable sender side of the scheduler, safe to hand to I/O threads.
#[derive(Clone)]
pub struct SchedulerHandle {
    sender: Sender<Command>,
    shutdown: Arc<AtomicBool>,
}

impl SchedulerHandle {
    /// Queue an event and get a receiver for its outcome.
    pub fn send_event(
        &self,
        table_id: impl Into<String>,
        player: PlayerId,
        event: PlayerEvent,
    ) -> Receiver<Result<Dispatch, Rejection>> {
        let (reply, outcome) = mpsc::channel();
        self.submit(Command::Event {
            table_id: table_id.into(),
            player,
            event,
            reply: Some(reply),
        });
        outcome
    }

    /// Queue an event without waiting for its outcome.
    pub fn post_event(&self, table_id: impl Into<String>, player: PlayerId, event: PlayerEvent) {
        self.submit(Command::Event {
            table_id: table_id.into(),
            player,
            event,
            reply: None,
        });
    }

    pub fn join(
        &self,
        table_id: impl Into<String>,
        name: impl Into<String>,
        user: UserHandle,
    ) -> Receiver<Result<PlayerId, Rejection>> {
        let (reply, outcome) = mpsc::channel();
        self.submit(Command::Join {
            table_id: table_id.into(),
            name: name.into(),
            user,
            reply: Some(reply),
        });
        outcome
    }

    pub fn attach(
        &self,
        table_id: impl Into<String>,
        player: PlayerId,
        user: UserHandle,
    ) -> Receiver<Result<(), Rejection>> {
        let (reply, outcome) = mpsc::channel();
        self.submit(Command::Attach {
            table_id: table_id.into(),
            player,
            user,
            reply: Some(reply),
        });
        outcome
    }

    pub fn detach(&self, table_id: impl Into<String>, player: PlayerId) {
        self.submit(Command::Detach {
            table_id: table_id.into(),
            player,
        });
    }

    pub fn leave(&self, table_id: impl Into<String>, player: PlayerId) {
        self.submit(Command::Leave {
            table_id: table_id.into(),
            player,
        });
    }

    /// Ask [`Scheduler::run`] to return after the current cycle.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    fn submit(&self, command: Command) {
        if self.sender.send(command).is_err() {
            debug!("scheduler is gone; command dropped");
        }
    }
}

/// Owns the live tables and drives them at a fixed cadence.
pub struct Scheduler {
    config: EngineConfig,
    registry: GameRegistry,
    store: Option<Box<dyn PersistenceStore>>,
    tables: IndexMap<String, TableSlot>,
    inbox: Receiver<Command>,
    sender: Sender<Command>,
    shutdown: Arc<AtomicBool>,
    cycles: u64,
}

impl Scheduler {
    #[must_use]
    pub fn new(config: EngineConfig, registry: GameRegistry) -> Self {
        let (sender, inbox) = mpsc::channel();
        Self {
            config,
            registry,
            store: None,
            tables: IndexMap::new(),
            inbox,
            sender,
            shutdown: Arc::new(AtomicBool::new(false)),
            cycles: 0,
        }
    }

    /// Save tables here when their host asks.
    #[must_use]
    pub fn with_store(mut self, store: impl PersistenceStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    #[must_use]
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            sender: self.sender.clone(),
            shutdown: Arc::clone(&self.shutdown),
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Cycles completed so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    // === Table registry ===

    /// Start driving a table. A table with the same id is replaced.
    pub fn add_table(&mut self, mut table: Box<dyn Table>) {
        table.configure(&self.config);
        let table_id = table.table_id().to_string();
        info!(table = %table_id, game = %table.game_type(), "table added");
        self.tables.insert(
            table_id,
            TableSlot {
                table,
                health: TableHealth::Live,
            },
        );
    }

    /// Create a lobby table of a registered game type.
    pub fn create_table(&mut self, game_type: &str, table_id: &str, seed: u64) -> Result<(), PersistError> {
        let table = self.registry.create(game_type, table_id, seed)?;
        self.add_table(table);
        Ok(())
    }

    /// Restore a table from a blob and start ticking it.
    pub fn load_table(&mut self, blob: &StateBlob) -> Result<(), PersistError> {
        let table = self.registry.load(blob)?;
        self.add_table(table);
        Ok(())
    }

    /// Restore a previously saved table from the store and remove the save.
    pub fn restore_table(&mut self, table_id: &str) -> Result<(), PersistError> {
        let store = self
            .store
            .as_mut()
            .ok_or_else(|| PersistError::Store("no store configured".to_string()))?;
        let blob = store
            .load(table_id)?
            .ok_or_else(|| PersistError::Store(format!("no saved table `{table_id}`")))?;
        let table = self.registry.load(&blob)?;
        store.remove(table_id)?;
        self.add_table(table);
        Ok(())
    }

    #[must_use]
    pub fn table(&self, table_id: &str) -> Option<&dyn Table> {
        self.tables.get(table_id).map(|slot| slot.table.as_ref())
    }

    pub fn table_mut(&mut self, table_id: &str) -> Option<&mut (dyn Table + 'static)> {
        self.tables.get_mut(table_id).map(|slot| slot.table.as_mut())
    }

    #[must_use]
    pub fn health(&self, table_id: &str) -> Option<&TableHealth> {
        self.tables.get(table_id).map(|slot| &slot.health)
    }

    pub fn table_ids(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    // === Driving ===

    /// Run one full cycle. Returns the faults caught along the way.
    pub fn tick_once(&mut self) -> Vec<TickError> {
        let mut faults = Vec::new();
        while let Ok(command) = self.inbox.try_recv() {
            if let Some(fault) = self.apply(command) {
                faults.push(fault);
            }
        }
        for (table_id, slot) in &mut self.tables {
            if !slot.health.is_live() {
                continue;
            }
            let table = &mut slot.table;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| table.tick())) {
                faults.push(freeze(table_id, slot, "tick", payload.as_ref()));
            }
        }
        self.save_requested_tables();
        self.tables.retain(|table_id, slot| {
            let keep = !slot.table.is_destroyed();
            if !keep {
                debug!(table = %table_id, "dropping destroyed table");
            }
            keep
        });
        self.cycles += 1;
        faults
    }

    /// Tick until [`SchedulerHandle::shutdown`] is called, then save every
    /// live table if a store is configured.
    pub fn run(&mut self) -> Vec<TickError> {
        let interval = self.config.tick_interval();
        info!(interval_ms = self.config.tick_interval_ms, "scheduler started");
        let mut faults = Vec::new();
        while !self.shutdown.load(Ordering::SeqCst) {
            let started = Instant::now();
            faults.extend(self.tick_once());
            if let Some(rest) = interval.checked_sub(started.elapsed()) {
                thread::sleep(rest);
            }
        }
        self.shutdown();
        faults
    }

    /// Save every live table to the store, if there is one, and drop all
    /// tables.
    pub fn shutdown(&mut self) {
        if let Some(store) = self.store.as_mut() {
            for (table_id, slot) in self.tables.iter().filter(|(_, slot)| slot.health.is_live()) {
                let saved = slot
                    .table
                    .snapshot(self.config.snapshot_encoding)
                    .and_then(|blob| store.save(&blob));
                if let Err(err) = saved {
                    warn!(table = %table_id, error = %err, "failed to save table at shutdown");
                }
            }
        }
        for slot in self.tables.values_mut() {
            slot.table.destroy();
        }
        self.tables.clear();
        info!(cycles = self.cycles, "scheduler stopped");
    }

    fn apply(&mut self, command: Command) -> Option<TickError> {
        let Some(slot) = self.tables.get_mut(command.table_id()) else {
            let table_id = command.table_id().to_string();
            command.refuse(Rejection::UnknownTable(table_id));
            return None;
        };
        if !slot.health.is_live() {
            command.refuse(Rejection::TableFrozen);
            return None;
        }
        if slot.table.is_destroyed() {
            command.refuse(Rejection::TableClosed);
            return None;
        }
        let table = &mut slot.table;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match command {
            Command::Event {
                player, event, reply, ..
            } => send(reply, table.dispatch(&player, event)),
            Command::Join { name, user, reply, .. } => send(reply, Ok(table.join(&name, user))),
            Command::Attach {
                player, user, reply, ..
            } => send(reply, table.attach_user(&player, user)),
            Command::Detach { player, .. } => table.detach_user(&player),
            Command::Leave { player, .. } => table.leave(&player),
        }));
        match outcome {
            Ok(()) => None,
            Err(payload) => {
                let table_id = slot.table.table_id().to_string();
                Some(freeze(&table_id, slot, "command", payload.as_ref()))
            }
        }
    }

    fn save_requested_tables(&mut self) {
        for (table_id, slot) in &mut self.tables {
            if !slot.health.is_live() {
                continue;
            }
            let Some(requester) = slot.table.take_save_request() else {
                continue;
            };
            let Some(store) = self.store.as_mut() else {
                warn!(table = %table_id, player = %requester, "save requested but no store is configured");
                continue;
            };
            let saved = slot
                .table
                .snapshot(self.config.snapshot_encoding)
                .and_then(|blob| store.save(&blob));
            match saved {
                Ok(()) => {
                    info!(table = %table_id, player = %requester, "table saved");
                    slot.table.destroy();
                }
                Err(err) => warn!(table = %table_id, error = %err, "failed to save table"),
            }
        }
    }
}

fn freeze(table_id: &str, slot: &mut TableSlot, phase: &'static str, payload: &(dyn Any + Send)) -> TickError {
    let message = panic_message(payload);
    error!(table = %table_id, phase, message = %message, "table faulted; freezing it");
    slot.health = TableHealth::Frozen {
        reason: message.clone(),
    };
    TickError::Panicked {
        table_id: table_id.to_string(),
        phase,
        message,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
