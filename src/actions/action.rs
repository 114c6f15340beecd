//! A single named operation a player may invoke.
//!
//! Callbacks are plain function pointers over the game type. They borrow
//! the game for exactly the duration of the call and capture nothing, so an
//! action set can be rebuilt from the aggregate at any time.

use std::borrow::Cow;
use std::fmt;

use crate::core::{Player, PlayerId, Reason};

/// Whether an action is drawn in the turn menu.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    #[must_use]
    pub fn hidden_if(condition: bool) -> Self {
        if condition {
            Visibility::Hidden
        } else {
            Visibility::Visible
        }
    }

    #[must_use]
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

/// Where an invocation came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Origin {
    /// A selection in the turn menu.
    Menu,
    /// A selection in the full actions menu.
    ActionsMenu,
    Keybind,
    Bot,
    /// A scheduled effect firing.
    Timer,
    /// The answer to an earlier input request.
    InputResponse,
    /// A raw `(player, action, input)` submission from a transport.
    #[default]
    Direct,
}

impl Origin {
    /// Hidden actions may only be run from surfaces that list them.
    #[must_use]
    pub fn may_run_hidden(self) -> bool {
        !matches!(self, Origin::Menu | Origin::Direct)
    }
}

/// Details of how an action was triggered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionContext {
    pub origin: Origin,
    /// Menu item focused when the action was triggered.
    pub menu_item_id: Option<String>,
    pub menu_index: Option<usize>,
}

impl ActionContext {
    #[must_use]
    pub fn new(origin: Origin) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn menu(item_id: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            origin: Origin::Menu,
            menu_item_id: Some(item_id.into()),
            menu_index: index,
        }
    }

    #[must_use]
    pub fn keybind(menu_item_id: Option<String>, menu_index: Option<usize>) -> Self {
        Self {
            origin: Origin::Keybind,
            menu_item_id,
            menu_index,
        }
    }

    #[must_use]
    pub fn bot() -> Self {
        Self::new(Origin::Bot)
    }

    #[must_use]
    pub fn timer() -> Self {
        Self::new(Origin::Timer)
    }

    #[must_use]
    pub fn from_keybind(&self) -> bool {
        self.origin == Origin::Keybind
    }
}

/// Arguments handed to an action effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionCall {
    pub action_id: String,
    pub input: Option<String>,
    pub context: ActionContext,
}

pub type EffectFn<G> = fn(&mut G, &PlayerId, &ActionCall);
pub type EnabledFn<G> = fn(&G, &Player) -> Result<(), Reason>;
pub type VisibilityFn<G> = fn(&G, &Player) -> Visibility;
/// Receives the action id so one function can label a family of actions.
pub type LabelFn<G> = fn(&G, &Player, &str) -> String;
pub type MenuOptionsFn<G> = fn(&G, &Player, &str) -> Vec<String>;
pub type BotSelectFn<G> = fn(&G, &Player, &[String]) -> Option<String>;
pub type BotInputFn<G> = fn(&G, &Player, &str) -> Option<String>;
pub type ValidateFn<G> = fn(&G, &Player, &str, &str) -> Result<(), Reason>;

/// Extra input an action needs before its effect can run.
pub enum InputRequest<G> {
    /// Pick one of a computed list of options.
    Menu {
        prompt: Cow<'static, str>,
        options: MenuOptionsFn<G>,
        bot_select: Option<BotSelectFn<G>>,
    },
    /// Free text.
    Editbox {
        prompt: Cow<'static, str>,
        default: Cow<'static, str>,
        bot_input: Option<BotInputFn<G>>,
        validate: Option<ValidateFn<G>>,
    },
}

impl<G> Clone for InputRequest<G> {
    fn clone(&self) -> Self {
        match self {
            InputRequest::Menu {
                prompt,
                options,
                bot_select,
            } => InputRequest::Menu {
                prompt: prompt.clone(),
                options: *options,
                bot_select: *bot_select,
            },
            InputRequest::Editbox {
                prompt,
                default,
                bot_input,
                validate,
            } => InputRequest::Editbox {
                prompt: prompt.clone(),
                default: default.clone(),
                bot_input: *bot_input,
                validate: *validate,
            },
        }
    }
}

impl<G> fmt::Debug for InputRequest<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputRequest::Menu { prompt, .. } => f.debug_struct("Menu").field("prompt", prompt).finish(),
            InputRequest::Editbox { prompt, default, .. } => f
                .debug_struct("Editbox")
                .field("prompt", prompt)
                .field("default", default)
                .finish(),
        }
    }
}

impl<G> InputRequest<G> {
    #[must_use]
    pub fn menu(prompt: impl Into<Cow<'static, str>>, options: MenuOptionsFn<G>) -> Self {
        InputRequest::Menu {
            prompt: prompt.into(),
            options,
            bot_select: None,
        }
    }

    #[must_use]
    pub fn editbox(prompt: impl Into<Cow<'static, str>>, default: impl Into<Cow<'static, str>>) -> Self {
        InputRequest::Editbox {
            prompt: prompt.into(),
            default: default.into(),
            bot_input: None,
            validate: None,
        }
    }

    /// Attach a bot selector (menu) or generator (editbox).
    #[must_use]
    pub fn with_bot_select(self, select: BotSelectFn<G>) -> Self {
        match self {
            InputRequest::Menu { prompt, options, .. } => InputRequest::Menu {
                prompt,
                options,
                bot_select: Some(select),
            },
            other => other,
        }
    }

    #[must_use]
    pub fn with_bot_input(self, generate: BotInputFn<G>) -> Self {
        match self {
            InputRequest::Editbox {
                prompt,
                default,
                validate,
                ..
            } => InputRequest::Editbox {
                prompt,
                default,
                bot_input: Some(generate),
                validate,
            },
            other => other,
        }
    }

    #[must_use]
    pub fn with_validator(self, check: ValidateFn<G>) -> Self {
        match self {
            InputRequest::Editbox {
                prompt,
                default,
                bot_input,
                ..
            } => InputRequest::Editbox {
                prompt,
                default,
                bot_input,
                validate: Some(check),
            },
            other => other,
        }
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            InputRequest::Menu { prompt, .. } | InputRequest::Editbox { prompt, .. } => prompt,
        }
    }
}

fn always_enabled<G>(_game: &G, _player: &Player) -> Result<(), Reason> {
    Ok(())
}

fn always_visible<G>(_game: &G, _player: &Player) -> Visibility {
    Visibility::Visible
}

/// A named operation.
pub struct Action<G> {
    pub id: String,
    pub label: String,
    pub effect: EffectFn<G>,
    pub is_enabled: EnabledFn<G>,
    pub is_hidden: VisibilityFn<G>,
    pub get_label: Option<LabelFn<G>>,
    pub input: Option<InputRequest<G>>,
}

impl<G> Clone for Action<G> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            label: self.label.clone(),
            effect: self.effect,
            is_enabled: self.is_enabled,
            is_hidden: self.is_hidden,
            get_label: self.get_label,
            input: self.input.clone(),
        }
    }
}

impl<G> fmt::Debug for Action<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}

impl<G> Action<G> {
    /// An always-enabled, always-visible action.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, effect: EffectFn<G>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            effect,
            is_enabled: always_enabled::<G>,
            is_hidden: always_visible::<G>,
            get_label: None,
            input: None,
        }
    }

    #[must_use]
    pub fn enabled_when(mut self, is_enabled: EnabledFn<G>) -> Self {
        self.is_enabled = is_enabled;
        self
    }

    #[must_use]
    pub fn hidden_when(mut self, is_hidden: VisibilityFn<G>) -> Self {
        self.is_hidden = is_hidden;
        self
    }

    #[must_use]
    pub fn with_label(mut self, get_label: LabelFn<G>) -> Self {
        self.get_label = Some(get_label);
        self
    }

    #[must_use]
    pub fn with_input(mut self, input: InputRequest<G>) -> Self {
        self.input = Some(input);
        self
    }
}

/// Point-in-time view of an action for one player.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedAction {
    pub id: String,
    pub label: String,
    pub enabled: bool,
    pub disabled_reason: Option<Reason>,
    /// `enabled && !hidden`: whether the action belongs in the turn menu.
    pub visible: bool,
}
