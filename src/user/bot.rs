use super::{MenuItem, User};

/// User implementation for bot seats. Bots read state directly, so every
/// outward call is dropped.
#[derive(Clone, Debug)]
pub struct BotUser {
    id: String,
    name: String,
}

impl BotUser {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl User for BotUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_bot(&self) -> bool {
        true
    }

    fn speak(&self, _text: &str) {}

    fn show_menu(&self, _menu_id: &str, _items: &[MenuItem]) {}

    fn status_box(&self, _lines: &[String]) {}

    fn show_editbox(&self, _input_id: &str, _prompt: &str, _default: &str) {}
}
