//! Game types by tag, so tables can be created and restored without the
//! caller naming a concrete game.

use indexmap::IndexMap;

use super::blob::{restore, StateBlob};
use crate::core::PersistError;
use crate::game::Game;
use crate::games::PigGame;
use crate::scheduler::Table;

type CreateFn = fn(&str, u64) -> Box<dyn Table>;
type LoadFn = fn(&StateBlob) -> Result<Box<dyn Table>, PersistError>;

#[derive(Clone, Copy)]
struct Registration {
    name: &'static str,
    create: CreateFn,
    load: LoadFn,
}

fn create_table<G: Game>(table_id: &str, seed: u64) -> Box<dyn Table> {
    Box::new(G::new_table(table_id, seed))
}

fn load_table<G: Game>(blob: &StateBlob) -> Result<Box<dyn Table>, PersistError> {
    Ok(Box::new(restore::<G>(blob)?))
}

/// Registered game types in registration order.
#[derive(Clone, Default)]
pub struct GameRegistry {
    games: IndexMap<&'static str, Registration>,
}

impl GameRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every game shipped in this crate.
    #[must_use]
    pub fn with_builtin_games() -> Self {
        let mut registry = Self::new();
        registry.register::<PigGame>();
        registry
    }

    pub fn register<G: Game>(&mut self) -> &mut Self {
        self.games.insert(
            G::GAME_TYPE,
            Registration {
                name: G::NAME,
                create: create_table::<G>,
                load: load_table::<G>,
            },
        );
        self
    }

    #[must_use]
    pub fn contains(&self, game_type: &str) -> bool {
        self.games.contains_key(game_type)
    }

    pub fn game_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.games.keys().copied()
    }

    /// Display name of a registered game.
    #[must_use]
    pub fn name(&self, game_type: &str) -> Option<&'static str> {
        self.games.get(game_type).map(|r| r.name)
    }

    /// A fresh lobby table of the given type.
    pub fn create(&self, game_type: &str, table_id: &str, seed: u64) -> Result<Box<dyn Table>, PersistError> {
        let registration = self
            .games
            .get(game_type)
            .ok_or_else(|| PersistError::UnknownGameType(game_type.to_string()))?;
        Ok((registration.create)(table_id, seed))
    }

    /// Restore a saved table, dispatching on the blob's game type.
    pub fn load(&self, blob: &StateBlob) -> Result<Box<dyn Table>, PersistError> {
        let registration = self
            .games
            .get(blob.game_type.as_str())
            .ok_or_else(|| PersistError::UnknownGameType(blob.game_type.clone()))?;
        (registration.load)(blob)
    }
}
