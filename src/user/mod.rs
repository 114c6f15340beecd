//! The outward boundary: whatever is connected to a seat.
//!
//! The engine only ever talks to players through [`User`]. Transports
//! implement it for network connections; [`BotUser`] is the silent bot
//! implementer and [`RecordingUser`] captures everything for tests and
//! replays.

mod bot;
mod recording;

pub use bot::BotUser;
pub use recording::{Notification, RecordingUser};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handle to a connected user.
pub type UserHandle = Arc<dyn User>;

/// One rendered menu entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub text: String,
}

impl MenuItem {
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// A sound effect with playback parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundCue {
    pub name: String,
    /// 0-100
    pub volume: u8,
    /// -100 (left) to 100 (right)
    pub pan: i8,
    /// 100 is normal speed
    pub pitch: u8,
}

impl SoundCue {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: 100,
            pan: 0,
            pitch: 100,
        }
    }

    pub fn with_volume(mut self, volume: u8) -> Self {
        self.volume = volume.min(100);
        self
    }

    pub fn with_pan(mut self, pan: i8) -> Self {
        self.pan = pan.clamp(-100, 100);
        self
    }

    pub fn with_pitch(mut self, pitch: u8) -> Self {
        self.pitch = pitch;
        self
    }
}

/// A connected participant.
///
/// Methods take `&self`; implementations that buffer output use interior
/// mutability so a handle can be shared between the table and a transport.
pub trait User: Send + Sync {
    /// Stable id; doubles as the seat's [`PlayerId`](crate::core::PlayerId).
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn is_bot(&self) -> bool {
        false
    }

    fn speak(&self, text: &str);

    fn show_menu(&self, menu_id: &str, items: &[MenuItem]);

    fn status_box(&self, lines: &[String]);

    fn show_editbox(&self, input_id: &str, prompt: &str, default: &str);

    fn remove_menu(&self, _menu_id: &str) {}

    fn play_sound(&self, _cue: &SoundCue) {}

    fn play_music(&self, _name: &str) {}
}
