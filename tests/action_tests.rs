//! Action resolution and execution tests.
//!
//! Tests cover:
//! - Resolution is a pure read
//! - Unknown, stale and disabled actions are rejected without mutation
//! - Hidden actions run from keybinds and the actions menu only
//! - Focused keybinds fire only on their own menu item
//! - Editbox and menu input, including validation and cancel
//! - Bots answering input synchronously

mod common;

use common::{started_counter, state_json, CounterGame};
use tabletop_engine::engine::lifecycle;
use tabletop_engine::engine::menus::{ACTIONS_MENU, CANCEL_ID, INPUT_EDITBOX, INPUT_MENU, TURN_MENU};
use tabletop_engine::{
    execute_action, get_all_enabled_actions, get_all_visible_actions, handle_event, ActionContext, Dispatch, Game,
    PlayerEvent, Rejection,
};

// =============================================================================
// Resolution
// =============================================================================

/// Test that resolving actions twice gives the same answer and leaves the
/// table untouched.
#[test]
fn test_resolution_is_idempotent() {
    let (game, seats) = started_counter(&["Ann", "Bo"]);
    let (ann, _) = &seats[0];
    let before = state_json(&game);

    let first = get_all_visible_actions(&game, ann);
    let second = get_all_visible_actions(&game, ann);
    assert_eq!(first, second);
    assert_eq!(get_all_enabled_actions(&game, ann), get_all_enabled_actions(&game, ann));
    assert_eq!(state_json(&game), before);
}

/// Test that the turn menu lists visible actions only, with the bump
/// enabled for the turn holder and disabled for everyone else.
#[test]
fn test_visible_actions_follow_turn() {
    let (game, seats) = started_counter(&["Ann", "Bo"]);
    let (ann, _) = &seats[0];
    let (bo, _) = &seats[1];

    let visible: Vec<String> = get_all_visible_actions(&game, ann).into_iter().map(|a| a.id).collect();
    assert!(visible.contains(&"bump".to_string()));
    assert!(!visible.contains(&"secret".to_string()));
    assert!(!visible.contains(&"start_game".to_string()));

    let bump_for_bo = get_all_visible_actions(&game, bo)
        .into_iter()
        .find(|a| a.id == "bump")
        .expect("bump is listed");
    assert!(!bump_for_bo.enabled);
    assert_eq!(bump_for_bo.disabled_reason.as_deref(), Some("It is not your turn."));
}

// =============================================================================
// Rejections
// =============================================================================

/// Test that an unknown action id is refused, spoken, and changes nothing.
#[test]
fn test_unknown_action_is_rejected_without_mutation() {
    let (mut game, seats) = started_counter(&["Ann", "Bo"]);
    let (ann, ann_user) = &seats[0];
    let before = state_json(&game);

    let outcome = execute_action(&mut game, ann, "fly", None, ActionContext::default());
    assert_eq!(
        outcome,
        Err(Rejection::Unavailable {
            action_id: "fly".to_string()
        })
    );
    assert_eq!(state_json(&game), before);
    assert_eq!(
        ann_user.last_spoken().as_deref(),
        Some("That action is not available right now.")
    );
}

/// Test that a disabled action is refused with its reason and changes
/// nothing.
#[test]
fn test_disabled_action_is_rejected_without_mutation() {
    let (mut game, seats) = started_counter(&["Ann", "Bo"]);
    let (bo, bo_user) = &seats[1];
    let before = state_json(&game);

    let outcome = handle_event(&mut game, bo, PlayerEvent::action("bump", None));
    assert!(matches!(outcome, Err(Rejection::Disabled { .. })));
    assert_eq!(game.count, 0);
    assert_eq!(state_json(&game), before);
    assert_eq!(bo_user.last_spoken().as_deref(), Some("It is not your turn."));
}

/// Test that a stale turn-menu selection from an earlier phase is refused.
#[test]
fn test_stale_menu_selection_is_rejected() {
    let (mut game, seats) = started_counter(&["Ann", "Bo"]);
    let (ann, ann_user) = &seats[0];

    // Lobby action picked from a menu drawn before the game started.
    let outcome = handle_event(&mut game, ann, PlayerEvent::select(TURN_MENU, "start_game"));
    assert!(matches!(outcome, Err(Rejection::Disabled { .. })));
    assert_eq!(ann_user.last_spoken().as_deref(), Some("The game has already started."));

    let outcome = handle_event(&mut game, ann, PlayerEvent::select(TURN_MENU, "roll"));
    assert_eq!(
        outcome,
        Err(Rejection::Unavailable {
            action_id: "roll".to_string()
        })
    );
    assert_eq!(game.count, 0);
}

/// Test that events from someone without a seat are refused.
#[test]
fn test_unknown_player_is_rejected() {
    let (mut game, _seats) = started_counter(&["Ann"]);
    let stranger = tabletop_engine::PlayerId::new("stranger");

    let outcome = handle_event(&mut game, &stranger, PlayerEvent::action("bump", None));
    assert_eq!(outcome, Err(Rejection::UnknownPlayer(stranger)));
}

/// Test that a key with nothing bound to it is reported as such.
#[test]
fn test_unbound_key_is_rejected() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, _) = &seats[0];

    let outcome = handle_event(&mut game, ann, PlayerEvent::key("z"));
    assert_eq!(outcome, Err(Rejection::UnknownKey("z".to_string())));
}

// =============================================================================
// Hidden actions
// =============================================================================

/// Test that a hidden action is refused from a direct submission but runs
/// from its keybind.
#[test]
fn test_hidden_action_runs_from_keybind_only() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, _) = &seats[0];

    let outcome = execute_action(&mut game, ann, "secret", None, ActionContext::default());
    assert_eq!(
        outcome,
        Err(Rejection::Hidden {
            action_id: "secret".to_string()
        })
    );
    assert_eq!(game.secrets, 0);

    let outcome = handle_event(&mut game, ann, PlayerEvent::key("X"));
    assert_eq!(outcome, Ok(Dispatch::Executed));
    assert_eq!(game.secrets, 1);
}

/// Test that the actions menu lists hidden actions and runs them.
#[test]
fn test_actions_menu_runs_hidden_actions() {
    let (mut game, seats) = started_counter(&["Ann", "Bo"]);
    let (ann, ann_user) = &seats[0];

    let outcome = handle_event(&mut game, ann, PlayerEvent::key("escape"));
    assert_eq!(outcome, Ok(Dispatch::Executed));
    let items = ann_user.last_menu(ACTIONS_MENU).expect("actions menu shown");
    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    assert!(ids.contains(&"whose_turn"));
    assert!(ids.contains(&"secret"));
    assert!(!ids.contains(&"show_actions"));
    assert_eq!(ids.last(), Some(&"go_back"));

    let outcome = handle_event(&mut game, ann, PlayerEvent::select(ACTIONS_MENU, "whose_turn"));
    assert_eq!(outcome, Ok(Dispatch::Executed));
    assert_eq!(ann_user.last_spoken().as_deref(), Some("It is your turn."));
}

/// Test that an enabled hidden action resolves as enabled but not visible.
#[test]
fn test_visible_means_enabled_and_not_hidden() {
    let (game, seats) = started_counter(&["Ann", "Bo"]);
    let (ann, _) = &seats[0];
    let (bo, _) = &seats[1];

    let enabled = get_all_enabled_actions(&game, ann);
    let secret = enabled.iter().find(|a| a.id == "secret").expect("secret is enabled");
    assert!(!secret.visible);
    let bump = enabled.iter().find(|a| a.id == "bump").expect("bump is enabled");
    assert!(bump.visible);

    // Bo may not bump, so it is neither enabled nor shown.
    assert!(get_all_visible_actions(&game, bo).iter().all(|a| a.id != "bump"));
    assert!(get_all_visible_actions(&game, ann)
        .iter()
        .all(|a| a.enabled && a.id != "secret"));
}

/// Test that a focus-only keybind fires while its action is the focused
/// menu item and is ignored anywhere else.
#[test]
fn test_focused_keybind_needs_its_menu_item() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, _) = &seats[0];
    let press = |focus: Option<&str>| PlayerEvent::Keybind {
        key: "p".to_string(),
        shift: false,
        control: false,
        alt: false,
        menu_item_id: focus.map(str::to_string),
        menu_index: None,
    };

    assert_eq!(handle_event(&mut game, ann, press(None)), Ok(Dispatch::Ignored));
    assert_eq!(handle_event(&mut game, ann, press(Some("bump"))), Ok(Dispatch::Ignored));
    assert!(!game.core().is_pending_input(ann));
    assert_eq!(game.count, 0);

    let outcome = handle_event(&mut game, ann, press(Some("pick_color")));
    assert_eq!(outcome, Ok(Dispatch::AwaitingInput));
    assert!(game.core().is_pending_input(ann));
}

// =============================================================================
// Turn menu
// =============================================================================

/// Test that a turn-menu selection by position runs the listed action.
#[test]
fn test_turn_menu_selection_by_index() {
    let (mut game, seats) = started_counter(&["Ann", "Bo"]);
    let (ann, _) = &seats[0];
    let (bo, bo_user) = &seats[1];

    let position = get_all_visible_actions(&game, ann)
        .iter()
        .position(|a| a.id == "bump")
        .expect("bump is listed");

    let outcome = handle_event(&mut game, ann, PlayerEvent::select_index(TURN_MENU, position + 1));
    assert_eq!(outcome, Ok(Dispatch::Executed));
    assert_eq!(game.count, 1);
    assert!(game.core().is_current(bo));
    assert!(bo_user.spoken().contains(&"It is your turn.".to_string()));
}

// =============================================================================
// Input
// =============================================================================

/// Test the editbox flow: prompt, bad answer re-prompts, good answer runs.
#[test]
fn test_editbox_input_flow() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, ann_user) = &seats[0];

    let outcome = handle_event(&mut game, ann, PlayerEvent::action("bid", None));
    assert_eq!(outcome, Ok(Dispatch::AwaitingInput));
    assert!(game.core().is_pending_input(ann));
    assert_eq!(
        ann_user.last_editbox(),
        Some((INPUT_EDITBOX.to_string(), "Your bid:".to_string()))
    );

    ann_user.clear();
    let outcome = handle_event(&mut game, ann, PlayerEvent::editbox("500"));
    assert!(matches!(outcome, Err(Rejection::InvalidInput { .. })));
    assert!(game.core().is_pending_input(ann));
    assert!(game.bids.is_empty());
    assert_eq!(ann_user.spoken(), vec!["Bid a number from 1 to 100."]);
    assert!(ann_user.last_editbox().is_some());

    let outcome = handle_event(&mut game, ann, PlayerEvent::editbox("42"));
    assert_eq!(outcome, Ok(Dispatch::Executed));
    assert!(!game.core().is_pending_input(ann));
    assert_eq!(game.bids, vec![(ann.clone(), 42)]);
}

/// Test that submitting an empty editbox cancels the pending input.
#[test]
fn test_empty_editbox_cancels() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, _) = &seats[0];

    handle_event(&mut game, ann, PlayerEvent::action("bid", None)).unwrap();
    let outcome = handle_event(&mut game, ann, PlayerEvent::editbox(""));
    assert_eq!(outcome, Ok(Dispatch::Cancelled));
    assert!(!game.core().is_pending_input(ann));
    assert!(game.bids.is_empty());
}

/// Test the menu input flow: options plus cancel, a bad choice is refused,
/// a good one runs.
#[test]
fn test_menu_input_flow() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, ann_user) = &seats[0];

    let outcome = handle_event(&mut game, ann, PlayerEvent::action("pick_color", None));
    assert_eq!(outcome, Ok(Dispatch::AwaitingInput));
    let items = ann_user.last_menu(INPUT_MENU).expect("choices shown");
    let ids: Vec<&str> = items.iter().map(|item| item.id.as_str()).collect();
    assert_eq!(ids, vec!["red", "green", "blue", CANCEL_ID]);

    let outcome = handle_event(&mut game, ann, PlayerEvent::select(INPUT_MENU, "purple"));
    assert!(matches!(outcome, Err(Rejection::InvalidInput { .. })));
    assert!(game.core().is_pending_input(ann));

    let outcome = handle_event(&mut game, ann, PlayerEvent::select(INPUT_MENU, "green"));
    assert_eq!(outcome, Ok(Dispatch::Executed));
    assert_eq!(game.color.as_deref(), Some("green"));
}

/// Test that choosing cancel in an input menu drops the pending action.
#[test]
fn test_menu_input_cancel() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, _) = &seats[0];

    handle_event(&mut game, ann, PlayerEvent::action("pick_color", None)).unwrap();
    let outcome = handle_event(&mut game, ann, PlayerEvent::select(INPUT_MENU, CANCEL_ID));
    assert_eq!(outcome, Ok(Dispatch::Cancelled));
    assert!(!game.core().is_pending_input(ann));
    assert!(game.color.is_none());
}

/// Test that an answer arriving with nothing pending is ignored.
#[test]
fn test_answer_without_pending_input_is_ignored() {
    let (mut game, seats) = started_counter(&["Ann"]);
    let (ann, _) = &seats[0];

    let outcome = handle_event(&mut game, ann, PlayerEvent::editbox("42"));
    assert_eq!(outcome, Ok(Dispatch::Ignored));
    assert!(game.bids.is_empty());
}

/// Test that a bot answers an input request on the spot instead of
/// entering the pending state.
#[test]
fn test_bot_answers_input_synchronously() {
    let mut game = CounterGame::new_table("counter-bot", 3);
    let user = common::recorder("ann", "Ann");
    lifecycle::add_player(&mut game, "Ann", user);
    let bot = lifecycle::add_bot(&mut game, Some("Robo"));
    lifecycle::start_game(&mut game);

    let outcome = execute_action(&mut game, &bot, "bid", None, ActionContext::bot());
    assert!(outcome.is_ok());
    assert!(!game.core().is_pending_input(&bot));
    assert_eq!(game.bids, vec![(bot, 10)]);
}
