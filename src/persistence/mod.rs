//! Saving and restoring tables.
//!
//! The whole behavioural state of a table is its game value. Serializing it
//! skips runtime caches; [`restore`] rebuilds them (action sets, keybinds,
//! bot users) and then calls the game's `rebuild_runtime_state` hook.

mod blob;
mod registry;
mod store;

pub use blob::{deserialize, restore, serialize, Encoding, StateBlob, FORMAT_VERSION};
pub use registry::GameRegistry;
pub use store::{MemoryStore, PersistenceStore};
