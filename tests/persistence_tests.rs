//! Save and restore tests.
//!
//! Tests cover:
//! - A Pig game restored mid-turn plays on exactly like the original
//! - Pending human input survives a restore and is asked for again
//! - A bot restored mid-decision neither repeats nor drops its move
//! - Corrupt, mismatched and foreign blobs are refused

mod common;

use std::sync::Arc;

use common::{lobby, recorder, state_json, CounterGame};
use tabletop_engine::engine::lifecycle;
use tabletop_engine::engine::menus::INPUT_EDITBOX;
use tabletop_engine::persistence::{deserialize, restore, serialize};
use tabletop_engine::{
    handle_event, Dispatch, EngineConfig, Encoding, Game, GameRegistry, PersistError, PigGame, PlayerEvent,
    PlayerId, RecordingUser, StateBlob, Table, FORMAT_VERSION,
};

// =============================================================================
// Helpers
// =============================================================================

/// A started two-player Pig game where Ann has just rolled a 1.
fn pig_after_bust() -> (PigGame, Vec<(PlayerId, Arc<RecordingUser>)>) {
    let (mut game, seats) = lobby::<PigGame>("pig-1", 11, &["Ann", "Bea"]);
    lifecycle::start_game(&mut game);
    let ann = seats[0].0.clone();

    let mut rolls = 0;
    while game.core().is_current(&ann) {
        handle_event(&mut game, &ann, PlayerEvent::key("r")).expect("Ann may roll on her turn");
        rolls += 1;
        assert!(rolls < 500, "Ann never rolled a 1");
    }
    (game, seats)
}

/// Reattach fresh recorders to a restored table, in seat order.
fn reattach<G: Game>(game: &mut G, seats: &[(PlayerId, Arc<RecordingUser>)]) -> Vec<Arc<RecordingUser>> {
    seats
        .iter()
        .map(|(id, _)| {
            let user = recorder(id.as_str(), id.as_str());
            lifecycle::attach_user(game, id, user.clone()).expect("seat survives restore");
            user
        })
        .collect()
}

/// Bea rolls up to three times, then banks if she still can.
fn bea_plays(game: &mut PigGame, bea: &PlayerId) {
    for _ in 0..3 {
        if game.core().is_current(bea) {
            let _ = handle_event(game, bea, PlayerEvent::key("r"));
        }
    }
    if game.core().is_current(bea) {
        let _ = handle_event(game, bea, PlayerEvent::key("b"));
    }
    for _ in 0..5 {
        lifecycle::run_tick(game);
    }
}

// =============================================================================
// Equivalence after restore
// =============================================================================

/// Test that after Ann busts it is Bea's turn and Ann's turn points are gone.
#[test]
fn test_pig_bust_passes_turn() {
    let (game, seats) = pig_after_bust();
    let (ann, ann_user) = &seats[0];
    let (bea, _) = &seats[1];

    assert!(game.core().is_current(bea));
    assert_eq!(game.round_score(ann), 0);
    assert_eq!(game.total(ann), 0);
    assert!(ann_user
        .spoken()
        .iter()
        .any(|line| line.starts_with("Ann rolled a 1 and lost")));
}

/// Test that a restored table continues exactly like the original, in
/// both encodings.
#[test]
fn test_restored_pig_plays_on_identically() {
    common::init_tracing();
    for encoding in [Encoding::Json, Encoding::Binary] {
        let (mut game, seats) = pig_after_bust();
        let bea = seats[1].0.clone();

        let blob = serialize(&game, encoding).unwrap();
        let mut restored: PigGame = restore(&blob).unwrap();
        assert_eq!(state_json(&restored), state_json(&game));

        let restored_users = reattach(&mut restored, &seats);
        for (_, user) in &seats {
            user.clear();
        }
        for user in &restored_users {
            user.clear();
        }

        bea_plays(&mut game, &bea);
        bea_plays(&mut restored, &bea);

        assert_eq!(state_json(&restored), state_json(&game), "{encoding:?}");
        for ((_, original), copy) in seats.iter().zip(&restored_users) {
            assert_eq!(copy.spoken(), original.spoken(), "{encoding:?}");
        }
    }
}

/// Test that the JSON payload is readable text and the binary one is not.
#[test]
fn test_payload_encodings() {
    let (game, _seats) = lobby::<PigGame>("pig-2", 1, &["Ann"]);

    let json = serialize(&game, Encoding::Json).unwrap();
    let text = json.payload_text().expect("JSON payload is text");
    assert!(text.contains("\"table_id\":\"pig-2\""));

    let binary = serialize(&game, Encoding::Binary).unwrap();
    assert!(binary.payload_text().is_none());
    assert_eq!(binary.version, FORMAT_VERSION);
    assert_eq!(binary.game_type, "pig");

    let bytes = binary.to_bytes().unwrap();
    assert_eq!(StateBlob::from_bytes(&bytes).unwrap(), binary);
}

// =============================================================================
// Pending input and bots
// =============================================================================

/// Test that the host's half-finished "add bot" survives a restore: the
/// name is asked for again and answering it adds exactly one bot.
#[test]
fn test_pending_add_bot_survives_restore() {
    let (mut game, seats) = lobby::<PigGame>("pig-3", 4, &["Ann"]);
    let (ann, _) = &seats[0];
    lifecycle::add_bot(&mut game, None);
    lifecycle::add_bot(&mut game, None);

    let outcome = handle_event(&mut game, ann, PlayerEvent::key("b"));
    assert_eq!(outcome, Ok(Dispatch::AwaitingInput));

    let blob = serialize(&game, Encoding::Json).unwrap();
    let mut restored: PigGame = restore(&blob).unwrap();
    assert!(restored.core().is_pending_input(ann));

    let user = recorder("ann", "Ann");
    lifecycle::attach_user(&mut restored, ann, user.clone()).unwrap();
    assert_eq!(
        user.last_editbox(),
        Some((INPUT_EDITBOX.to_string(), "Enter a name for the bot:".to_string()))
    );

    let outcome = handle_event(&mut restored, ann, PlayerEvent::editbox("Robo"));
    assert_eq!(outcome, Ok(Dispatch::Executed));
    assert!(!restored.core().is_pending_input(ann));
    assert_eq!(restored.core().players.len(), 4);
    assert_eq!(restored.core().players.iter().filter(|p| p.name == "Robo").count(), 1);
    assert!(restored.core().player_by_name("Robo").is_some_and(|p| p.is_bot));
}

/// Test that a bot restored between deciding and acting carries on exactly
/// like the original.
#[test]
fn test_bot_mid_decision_survives_restore() {
    let config = EngineConfig::default().with_bot_think_ticks(3);
    let mut game = PigGame::new_table("pig-4", 21);
    game.core_mut().set_config(config.clone());
    let watcher = recorder("ann", "Ann");
    let ann = lifecycle::add_player(&mut game, "Ann", watcher.clone());
    if let Some(seat) = game.core_mut().player_mut(&ann) {
        seat.is_spectator = true;
    }
    lifecycle::add_bot(&mut game, None);
    lifecycle::add_bot(&mut game, None);
    lifecycle::start_game(&mut game);

    let mut ticks = 0;
    while !game.core().players.iter().any(|p| p.bot.pending_action.is_some()) {
        lifecycle::run_tick(&mut game);
        ticks += 1;
        assert!(ticks < 100, "no bot ever decided");
    }

    let blob = serialize(&game, Encoding::Binary).unwrap();
    let mut restored: PigGame = restore(&blob).unwrap();
    restored.core_mut().set_config(config);
    let copy = recorder("ann", "Ann");
    lifecycle::attach_user(&mut restored, &ann, copy.clone()).unwrap();
    watcher.clear();
    copy.clear();

    for _ in 0..200 {
        lifecycle::run_tick(&mut game);
        lifecycle::run_tick(&mut restored);
    }

    assert_eq!(state_json(&restored), state_json(&game));
    assert_eq!(copy.spoken(), watcher.spoken());
    assert!(watcher.spoken().iter().any(|line| line.ends_with("rolls.")));
}

// =============================================================================
// Refused blobs
// =============================================================================

/// Test that undecodable envelope bytes are refused.
#[test]
fn test_corrupt_envelope_is_refused() {
    let outcome = StateBlob::from_bytes(b"definitely not a blob");
    assert!(matches!(outcome, Err(PersistError::Binary(_))));
}

/// Test that a corrupt payload is refused.
#[test]
fn test_corrupt_payload_is_refused() {
    let (game, _seats) = lobby::<PigGame>("pig-5", 1, &["Ann"]);

    let mut json = serialize(&game, Encoding::Json).unwrap();
    json.payload.truncate(json.payload.len() / 2);
    assert!(matches!(restore::<PigGame>(&json), Err(PersistError::Json(_))));

    let mut binary = serialize(&game, Encoding::Binary).unwrap();
    binary.payload.truncate(3);
    assert!(matches!(restore::<PigGame>(&binary), Err(PersistError::Binary(_))));
}

/// Test that a blob from another format version is refused.
#[test]
fn test_version_mismatch_is_refused() {
    let (game, _seats) = lobby::<PigGame>("pig-6", 1, &["Ann"]);
    let mut blob = serialize(&game, Encoding::Json).unwrap();
    blob.version = FORMAT_VERSION + 1;

    match deserialize::<PigGame>(&blob) {
        Err(PersistError::VersionMismatch { found, expected }) => {
            assert_eq!(found, FORMAT_VERSION + 1);
            assert_eq!(expected, FORMAT_VERSION);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("a future version must not load"),
    }
}

/// Test that one game's blob cannot be loaded as another game, even with a
/// forged envelope.
#[test]
fn test_wrong_game_type_is_refused() {
    let (counter, _seats) = lobby::<CounterGame>("counter-2", 1, &["Ann"]);
    let mut blob = serialize(&counter, Encoding::Json).unwrap();
    assert!(matches!(
        restore::<PigGame>(&blob),
        Err(PersistError::WrongGameType { .. })
    ));

    blob.game_type = "pig".to_string();
    assert!(matches!(
        deserialize::<PigGame>(&blob),
        Err(PersistError::WrongGameType { .. }) | Err(PersistError::Json(_))
    ));
}

/// Test that the registry refuses blobs for games it does not know.
#[test]
fn test_registry_refuses_unknown_game() {
    let (counter, _seats) = lobby::<CounterGame>("counter-3", 1, &["Ann"]);
    let blob = serialize(&counter, Encoding::Json).unwrap();

    let registry = GameRegistry::with_builtin_games();
    assert!(matches!(registry.load(&blob), Err(PersistError::UnknownGameType(_))));

    let mut registry = GameRegistry::new();
    registry.register::<CounterGame>();
    let table = registry.load(&blob).ok().expect("counter is registered");
    assert_eq!(table.table_id(), "counter-3");
}
