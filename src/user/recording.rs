use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{MenuItem, SoundCue, User};

/// Everything a [`RecordingUser`] was sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Speak(String),
    Menu { menu_id: String, items: Vec<MenuItem> },
    StatusBox(Vec<String>),
    Editbox {
        input_id: String,
        prompt: String,
        default: String,
    },
    RemoveMenu(String),
    Sound(SoundCue),
    Music(String),
}

/// A user that records every notification in order.
#[derive(Debug)]
pub struct RecordingUser {
    id: String,
    name: String,
    log: Mutex<Vec<Notification>>,
}

impl RecordingUser {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            log: Mutex::new(Vec::new()),
        }
    }

    fn log(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn push(&self, notification: Notification) {
        self.log().push(notification);
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.log().clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.log())
    }

    pub fn clear(&self) {
        self.log().clear();
    }

    /// Spoken lines only.
    #[must_use]
    pub fn spoken(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|n| match n {
                Notification::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn last_spoken(&self) -> Option<String> {
        self.spoken().pop()
    }

    /// Items of the most recent rendering of `menu_id`.
    #[must_use]
    pub fn last_menu(&self, menu_id: &str) -> Option<Vec<MenuItem>> {
        self.log().iter().rev().find_map(|n| match n {
            Notification::Menu { menu_id: id, items } if id == menu_id => Some(items.clone()),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_editbox(&self) -> Option<(String, String)> {
        self.log().iter().rev().find_map(|n| match n {
            Notification::Editbox {
                input_id, prompt, ..
            } => Some((input_id.clone(), prompt.clone())),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_status_box(&self) -> Option<Vec<String>> {
        self.log().iter().rev().find_map(|n| match n {
            Notification::StatusBox(lines) => Some(lines.clone()),
            _ => None,
        })
    }
}

impl User for RecordingUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn speak(&self, text: &str) {
        self.push(Notification::Speak(text.to_string()));
    }

    fn show_menu(&self, menu_id: &str, items: &[MenuItem]) {
        self.push(Notification::Menu {
            menu_id: menu_id.to_string(),
            items: items.to_vec(),
        });
    }

    fn status_box(&self, lines: &[String]) {
        self.push(Notification::StatusBox(lines.to_vec()));
    }

    fn show_editbox(&self, input_id: &str, prompt: &str, default: &str) {
        self.push(Notification::Editbox {
            input_id: input_id.to_string(),
            prompt: prompt.to_string(),
            default: default.to_string(),
        });
    }

    fn remove_menu(&self, menu_id: &str) {
        self.push(Notification::RemoveMenu(menu_id.to_string()));
    }

    fn play_sound(&self, cue: &SoundCue) {
        self.push(Notification::Sound(cue.clone()));
    }

    fn play_music(&self, name: &str) {
        self.push(Notification::Music(name.to_string()));
    }
}
