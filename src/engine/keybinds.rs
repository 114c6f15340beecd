//! Keyboard shortcuts mapped onto actions.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::core::{GameStatus, Player};

/// Table phases in which a keybind is live.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeybindState {
    Never,
    /// Lobby only.
    Idle,
    /// While the game is running.
    Active,
    Always,
}

impl KeybindState {
    #[must_use]
    pub fn allows(self, status: GameStatus) -> bool {
        match self {
            KeybindState::Never => false,
            KeybindState::Idle => status == GameStatus::Lobby,
            KeybindState::Active => status == GameStatus::Active,
            KeybindState::Always => true,
        }
    }
}

/// A key bound to one or more action ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keybind {
    /// Normalized key, e.g. `shift+b`.
    pub key: String,
    pub name: String,
    pub actions: SmallVec<[String; 2]>,
    pub state: KeybindState,
    pub include_spectators: bool,
    /// Only fires while one of its actions is the focused menu item.
    pub requires_focus: bool,
}

impl Keybind {
    #[must_use]
    pub fn new(key: &str, name: impl Into<String>, actions: &[&str], state: KeybindState) -> Self {
        Self {
            key: key.to_ascii_lowercase(),
            name: name.into(),
            actions: actions.iter().map(|a| (*a).to_string()).collect(),
            state,
            include_spectators: false,
            requires_focus: false,
        }
    }

    #[must_use]
    pub fn with_spectators(mut self) -> Self {
        self.include_spectators = true;
        self
    }

    #[must_use]
    pub fn focused(mut self) -> Self {
        self.requires_focus = true;
        self
    }

    #[must_use]
    pub fn can_player_use(&self, status: GameStatus, player: &Player) -> bool {
        self.state.allows(status) && (self.include_spectators || !player.is_spectator)
    }
}

/// Keybinds by normalized key. Several binds may share a key if they are
/// live in different phases.
#[derive(Clone, Debug, Default)]
pub struct KeybindMap {
    binds: FxHashMap<String, Vec<Keybind>>,
}

impl KeybindMap {
    pub fn define(&mut self, keybind: Keybind) {
        self.binds.entry(keybind.key.clone()).or_default().push(keybind);
    }

    #[must_use]
    pub fn lookup(&self, key: &str) -> &[Keybind] {
        self.binds.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clear(&mut self) {
        self.binds.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.binds.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }
}

/// Lowercase the key and prepend modifier prefixes not already present.
#[must_use]
pub fn normalize_key(key: &str, shift: bool, control: bool, alt: bool) -> String {
    let mut key = key.to_ascii_lowercase();
    if shift && !key.starts_with("shift+") {
        key = format!("shift+{key}");
    }
    if control && !key.starts_with("ctrl+") {
        key = format!("ctrl+{key}");
    }
    if alt && !key.starts_with("alt+") {
        key = format!("alt+{key}");
    }
    key
}
