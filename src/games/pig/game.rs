//! Pig game implementation.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::actions::{Action, ActionCall, ActionSet, Visibility};
use crate::core::{GameCore, GameStatus, OptionSpec, Player, PlayerId, Reason};
use crate::engine::{bots, execution, lifecycle, Keybind, KeybindState};
use crate::game::{Game, GameResult, Outcome, PlayerResult};
use crate::user::SoundCue;

pub const TARGET_SCORE: OptionSpec = OptionSpec::int("target_score", "Target score", 10, 1000, 50);
pub const MIN_BANK_POINTS: OptionSpec = OptionSpec::int("min_bank_points", "Minimum points to bank", 0, 50, 0);
pub const DICE_SIDES: OptionSpec = OptionSpec::int("dice_sides", "Dice sides", 4, 20, 6);

static OPTIONS: [OptionSpec; 3] = [TARGET_SCORE, MIN_BANK_POINTS, DICE_SIDES];

/// Pig table state.
#[derive(Serialize, Deserialize)]
pub struct PigGame {
    core: GameCore<PigGame>,
    /// Points at risk this turn.
    round_scores: IndexMap<PlayerId, i64>,
    /// Banked points.
    totals: IndexMap<PlayerId, i64>,
}

impl PigGame {
    #[must_use]
    pub fn round_score(&self, player: &PlayerId) -> i64 {
        self.round_scores.get(player).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total(&self, player: &PlayerId) -> i64 {
        self.totals.get(player).copied().unwrap_or(0)
    }

    fn target_score(&self) -> i64 {
        self.core.option_int(&TARGET_SCORE)
    }

    fn min_bank(&self) -> i64 {
        self.core.option_int(&MIN_BANK_POINTS).max(1)
    }

    fn name_of(&self, player: &PlayerId) -> String {
        self.core
            .player(player)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| player.to_string())
    }

    fn start_round(&mut self) {
        self.core.round += 1;
        let players = self.core.active_player_ids();
        self.core.turn.set_turn_players(players, true);
        self.core.broadcast_sound(&SoundCue::new("game_pig/roundstart.ogg"));
        self.core.broadcast(&format!("Round {}.", self.core.round));
        self.start_turn();
    }

    fn start_turn(&mut self) {
        let Some(current) = self.core.current_player().cloned() else {
            return;
        };
        self.round_scores.insert(current.id.clone(), 0);
        execution::announce_turn(self);
        if current.is_bot {
            self.setup_bot_target(&current.id);
        }
        self.core.invalidate_menus();
    }

    /// How many points a bot tries to collect before banking this turn.
    fn setup_bot_target(&mut self, bot: &PlayerId) {
        let goal = self.target_score();
        let mine = self.total(bot);
        let at_risk = self.round_score(bot);
        let others: Vec<i64> = self
            .core
            .active_player_ids()
            .iter()
            .filter(|id| *id != bot)
            .map(|id| self.total(id))
            .collect();

        let mut target = self.core.rng.gen_range(10..=25);
        let someone_won = others.iter().any(|&score| score >= goal);
        let leader = others.iter().copied().filter(|&score| score >= goal - 1).max().unwrap_or(0);
        if leader > 0 {
            target = leader + 1 - mine;
        }
        let close_to_goal = mine + at_risk >= goal - 1;
        if close_to_goal && !someone_won && others.iter().all(|&score| score <= mine + at_risk - 8) {
            target = 0;
        }
        if let Some(player) = self.core.player_mut(bot) {
            player.bot.target = Some(target.max(0));
        }
    }

    fn on_turn_end(&mut self) {
        if self.core.turn.is_last_in_round() {
            self.on_round_end();
        } else {
            execution::advance_turn(self);
            self.start_turn();
        }
    }

    fn on_round_end(&mut self) {
        let goal = self.target_score();
        let active = self.core.active_player_ids();
        let best = active.iter().map(|id| self.total(id)).max().unwrap_or(0);
        let winners: Vec<PlayerId> = if best >= goal {
            active.iter().filter(|id| self.total(id) == best).cloned().collect()
        } else {
            Vec::new()
        };

        match winners.as_slice() {
            [] => self.start_round(),
            [winner] => {
                self.core.broadcast_sound(&SoundCue::new("game_pig/win.ogg"));
                self.core.broadcast(&format!("{} wins!", self.name_of(winner)));
                lifecycle::finish_game(self);
            }
            tied => {
                let names: Vec<String> = tied.iter().map(|id| self.name_of(id)).collect();
                self.core.broadcast(&format!("Tiebreaker between {}.", names.join(" and ")));
                for id in active.iter().filter(|id| !tied.contains(id)) {
                    if let Some(player) = self.core.player_mut(id) {
                        player.is_spectator = true;
                    }
                }
                self.start_round();
            }
        }
    }
}

// === Action predicates ===

fn is_turn_holder(game: &PigGame, player: &Player) -> Result<(), Reason> {
    if game.core.status != GameStatus::Active {
        return Err(Cow::Borrowed("The game is not running."));
    }
    if player.is_spectator {
        return Err(Cow::Borrowed("Spectators cannot do that."));
    }
    if !game.core.is_current(&player.id) {
        return Err(Cow::Borrowed("It is not your turn."));
    }
    Ok(())
}

fn roll_hidden(game: &PigGame, player: &Player) -> Visibility {
    Visibility::hidden_if(is_turn_holder(game, player).is_err())
}

fn bank_enabled(game: &PigGame, player: &Player) -> Result<(), Reason> {
    is_turn_holder(game, player)?;
    let needed = game.min_bank();
    if game.round_score(&player.id) < needed {
        return Err(Cow::Owned(format!("You need at least {needed} points to bank.")));
    }
    Ok(())
}

fn bank_hidden(game: &PigGame, player: &Player) -> Visibility {
    Visibility::hidden_if(bank_enabled(game, player).is_err())
}

fn bank_label(game: &PigGame, player: &Player, _action_id: &str) -> String {
    format!("Bank {} points", game.round_score(&player.id))
}

// === Action effects ===

fn roll(game: &mut PigGame, player: &PlayerId, _call: &ActionCall) {
    let name = game.name_of(player);
    game.core.broadcast(&format!("{name} rolls."));
    game.core.broadcast_sound(&SoundCue::new("game_pig/roll.ogg"));
    let pause = game.core.rng.gen_range(10..=20);
    bots::jolt_bot(game, player, u32::try_from(pause).unwrap_or(10));

    let sides = u32::try_from(game.core.option_int(&DICE_SIDES)).unwrap_or(6);
    let value = i64::from(game.core.rng.roll(sides));
    if value == 1 {
        let lost = game.round_score(player);
        game.core.broadcast_sound(&SoundCue::new("game_pig/lose.ogg"));
        game.core.broadcast(&format!("{name} rolled a 1 and lost {lost} points."));
        game.round_scores.insert(player.clone(), 0);
        game.end_turn();
    } else {
        let total = game.round_score(player) + value;
        game.round_scores.insert(player.clone(), total);
        game.core.broadcast(&format!("Rolled a {value}. {total} points this turn."));
    }
}

fn bank(game: &mut PigGame, player: &PlayerId, _call: &ActionCall) {
    let name = game.name_of(player);
    let banked = game.round_score(player);
    let total = game.total(player) + banked;
    game.totals.insert(player.clone(), total);
    game.round_scores.insert(player.clone(), 0);
    game.core.broadcast_sound(&SoundCue::new("game_pig/bank.ogg"));
    game.core
        .broadcast(&format!("{name} banks {banked} points, for a total of {total}."));
    game.end_turn();
}

impl Game for PigGame {
    const GAME_TYPE: &'static str = "pig";
    const NAME: &'static str = "Pig";

    fn new_table(table_id: &str, seed: u64) -> Self {
        Self {
            core: GameCore::new(table_id, Self::GAME_TYPE, seed),
            round_scores: IndexMap::new(),
            totals: IndexMap::new(),
        }
    }

    fn core(&self) -> &GameCore<Self> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut GameCore<Self> {
        &mut self.core
    }

    fn on_start(&mut self) {
        self.core.round = 0;
        self.round_scores.clear();
        self.totals.clear();
        for id in self.core.active_player_ids() {
            self.round_scores.insert(id.clone(), 0);
            self.totals.insert(id, 0);
        }
        self.core.play_music("game_pig/mus.ogg");
        self.start_round();
    }

    fn option_specs() -> &'static [OptionSpec] {
        &OPTIONS
    }

    fn turn_action_set(&self, _player: &Player) -> Option<ActionSet<Self>> {
        Some(
            ActionSet::new("turn")
                .with(
                    Action::new("roll", "Roll", roll)
                        .enabled_when(is_turn_holder)
                        .hidden_when(roll_hidden),
                )
                .with(
                    Action::new("bank", "Bank", bank)
                        .enabled_when(bank_enabled)
                        .hidden_when(bank_hidden)
                        .with_label(bank_label),
                ),
        )
    }

    fn game_keybinds(&self) -> Vec<Keybind> {
        vec![
            Keybind::new("r", "Roll dice", &["roll"], KeybindState::Active),
            Keybind::new("b", "Bank points", &["bank"], KeybindState::Active),
        ]
    }

    fn bot_think(&mut self, player: &PlayerId) -> Option<String> {
        let target = self
            .core
            .player(player)
            .and_then(|p| p.bot.target)
            .unwrap_or(15);
        let at_risk = self.round_score(player);
        if at_risk >= target && at_risk >= self.min_bank() {
            Some("bank".to_string())
        } else {
            Some("roll".to_string())
        }
    }

    fn end_turn(&mut self) {
        bots::jolt_bots(self, 20, 30);
        self.on_turn_end();
    }

    fn score_lines(&self) -> Vec<String> {
        self.totals
            .iter()
            .map(|(id, total)| format!("{}: {total}", self.name_of(id)))
            .collect()
    }

    fn build_result(&self) -> GameResult {
        let mut standings: Vec<(&PlayerId, i64)> = self.totals.iter().map(|(id, total)| (id, *total)).collect();
        standings.sort_by(|a, b| b.1.cmp(&a.1));
        let outcome = match standings.first() {
            Some((leader, _)) => Outcome::Winner((*leader).clone()),
            None => Outcome::Draw,
        };
        GameResult {
            game_type: Self::GAME_TYPE.to_string(),
            outcome,
            duration_ticks: self.core.tick,
            rounds: self.core.round,
            players: standings
                .into_iter()
                .filter_map(|(id, total)| {
                    let player = self.core.player(id)?;
                    Some(PlayerResult {
                        id: id.clone(),
                        name: player.name.clone(),
                        is_bot: player.is_bot,
                        score: Some(total),
                    })
                })
                .collect(),
        }
    }

    fn format_end_screen(&self, result: &GameResult) -> Vec<String> {
        let mut lines = vec!["Final scores:".to_string()];
        for (rank, player) in result.players.iter().enumerate() {
            lines.push(format!(
                "{}. {}: {} points",
                rank + 1,
                player.name,
                player.score.unwrap_or(0)
            ));
        }
        lines
    }
}
