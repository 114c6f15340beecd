//! Actions, action sets and their resolution.
//!
//! An [`Action`] is a named operation with callbacks deciding whether it is
//! enabled, hidden and how it is labelled. Actions are grouped into named
//! [`ActionSet`]s registered per player in an [`ActionRegistry`]; lookups
//! walk the sets in registration order and the first match wins.

mod action;
mod registry;
mod resolve;
mod set;

pub use action::{
    Action, ActionCall, ActionContext, BotInputFn, BotSelectFn, EffectFn, EnabledFn, InputRequest, LabelFn,
    MenuOptionsFn, Origin, ResolvedAction, ValidateFn, Visibility, VisibilityFn,
};
pub use registry::ActionRegistry;
pub use resolve::{
    find_action, get_all_enabled_actions, get_all_visible_actions, resolve_action, resolve_action_by_id,
};
pub use set::ActionSet;
