//! The serialized form of a table.
//!
//! A [`StateBlob`] is a small versioned envelope around the encoded game
//! aggregate. Loading checks the envelope before decoding, and decoding
//! builds a fresh game value, so a failed load never leaves a half-applied
//! table behind.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::PersistError;
use crate::engine::lifecycle;
use crate::game::Game;

/// Bumped whenever the envelope or the engine-owned aggregate changes shape.
pub const FORMAT_VERSION: u32 = 1;

/// Payload encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Structured JSON document; readable and diffable.
    #[default]
    Json,
    /// Compact bincode.
    Binary,
}

/// A saved table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBlob {
    pub version: u32,
    pub game_type: String,
    pub table_id: String,
    pub encoding: Encoding,
    pub payload: Vec<u8>,
}

impl StateBlob {
    /// Encode the whole envelope for a byte-oriented store.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// The payload as text, for JSON blobs.
    #[must_use]
    pub fn payload_text(&self) -> Option<&str> {
        match self.encoding {
            Encoding::Json => std::str::from_utf8(&self.payload).ok(),
            Encoding::Binary => None,
        }
    }
}

/// Encode a table. Runtime state (users, action sets, keybinds, estimates)
/// is not part of the payload.
pub fn serialize<G: Game>(game: &G, encoding: Encoding) -> Result<StateBlob, PersistError> {
    let payload = match encoding {
        Encoding::Json => serde_json::to_vec(game)?,
        Encoding::Binary => bincode::serialize(game)?,
    };
    let core = game.core();
    Ok(StateBlob {
        version: FORMAT_VERSION,
        game_type: G::GAME_TYPE.to_string(),
        table_id: core.table_id.clone(),
        encoding,
        payload,
    })
}

/// Decode a table without rebuilding its runtime state.
pub fn deserialize<G: Game>(blob: &StateBlob) -> Result<G, PersistError> {
    if blob.version != FORMAT_VERSION {
        return Err(PersistError::VersionMismatch {
            found: blob.version,
            expected: FORMAT_VERSION,
        });
    }
    if blob.game_type != G::GAME_TYPE {
        return Err(PersistError::WrongGameType {
            expected: G::GAME_TYPE.to_string(),
            found: blob.game_type.clone(),
        });
    }
    let game: G = match blob.encoding {
        Encoding::Json => serde_json::from_slice(&blob.payload)?,
        Encoding::Binary => bincode::deserialize(&blob.payload)?,
    };
    if game.core().game_type != G::GAME_TYPE {
        return Err(PersistError::WrongGameType {
            expected: G::GAME_TYPE.to_string(),
            found: game.core().game_type.clone(),
        });
    }
    Ok(game)
}

/// Decode a table and rebuild everything serde skipped, ready to tick.
/// Human users are reattached separately.
pub fn restore<G: Game>(blob: &StateBlob) -> Result<G, PersistError> {
    let mut game = deserialize::<G>(blob).inspect_err(|err| {
        warn!(table = %blob.table_id, game = %blob.game_type, error = %err, "failed to restore table");
    })?;
    lifecycle::restore_runtime(&mut game);
    info!(
        table = %blob.table_id,
        game = G::GAME_TYPE,
        tick = game.core().tick,
        "table restored"
    );
    Ok(game)
}
