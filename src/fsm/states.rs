//! Per-mode input handlers.
//!
//! Each handler gets the active mode's own data plus the shared
//! [`SessionContext`] and returns a [`Step`]. Handlers never change the
//! mode themselves; the engine in [`super::Fsm`] does that and logs it.

use log::{debug, info};

use super::context::{Clip, SessionContext};
use super::game::{GOOD_GAME_SCORE, Guess, GuessGame, GuessOutcome};
use super::{GameOverChoice, MenuItem, Mode, NameBuffer, Step};
use crate::app::commands::InputEvent;
use crate::pet::FoodKind;
use crate::stats::{self, Entropy};

// ═══════════════════════════════════════════════════════════════════════════
//  MAIN MENU
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn main_menu(
    cursor: &mut MenuItem,
    input: InputEvent,
    ctx: &mut SessionContext,
    rng: &mut impl Entropy,
) -> Step {
    let asleep = ctx.pet.is_asleep();
    match input {
        InputEvent::Char('q') => Step::Quit,
        InputEvent::Char('?') => {
            ctx.view.show_help = !ctx.view.show_help;
            Step::Stay
        }
        InputEvent::ForceGameOver => {
            info!("Debug shortcut: forcing game over");
            ctx.pet.health = 0;
            Step::Stay
        }
        i if i.is_prev() => {
            *cursor = if asleep {
                MenuItem::ToggleLights
            } else {
                cursor.prev()
            };
            Step::Stay
        }
        i if i.is_next() => {
            *cursor = match (asleep, *cursor) {
                (true, MenuItem::ToggleLights | MenuItem::Quit) => MenuItem::Quit,
                (true, _) => MenuItem::ToggleLights,
                (false, item) => item.next(),
            };
            Step::Stay
        }
        i if i.is_confirm() => select(*cursor, ctx, rng),
        _ => Step::Stay,
    }
}

fn select(item: MenuItem, ctx: &mut SessionContext, rng: &mut impl Entropy) -> Step {
    if ctx.pet.is_asleep() && !item.available_while_asleep() {
        debug!("{} ignored while asleep", item.label());
        return Step::Stay;
    }
    ctx.highlight(item);
    let now = ctx.now;
    match item {
        MenuItem::Feed => Step::Enter(Mode::FoodSubmenu {
            cursor: FoodKind::Burger,
        }),
        MenuItem::Clean => {
            stats::clean(&mut ctx.pet, now);
            Step::Stay
        }
        MenuItem::Play => {
            ctx.anim.play(Clip::Playing);
            Step::Enter(Mode::GuessGame(GuessGame::start(rng)))
        }
        MenuItem::Medicine => {
            stats::give_medicine(&mut ctx.pet, now);
            Step::Stay
        }
        MenuItem::Rename => Step::Enter(Mode::Rename {
            buffer: NameBuffer::new(),
        }),
        MenuItem::ToggleLights => {
            stats::toggle_lights(&mut ctx.pet, now);
            Step::Stay
        }
        MenuItem::Quit => Step::Quit,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  FOOD SUBMENU
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn food_submenu(cursor: &mut FoodKind, input: InputEvent, ctx: &mut SessionContext) -> Step {
    match input {
        InputEvent::Escape | InputEvent::Char('b') => Step::Enter(Mode::main_menu_at(MenuItem::Feed)),
        i if i.is_prev() => {
            *cursor = cursor.prev();
            Step::Stay
        }
        i if i.is_next() => {
            *cursor = cursor.next();
            Step::Stay
        }
        i if i.is_confirm() => {
            stats::feed(&mut ctx.pet, *cursor, ctx.now);
            ctx.anim.play(match cursor {
                FoodKind::Cake => Clip::CakeEating,
                FoodKind::Burger => Clip::Eating,
            });
            info!("Fed {}", cursor.label());
            Step::Enter(Mode::main_menu_at(MenuItem::Feed))
        }
        _ => Step::Stay,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  RENAME
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn rename(buffer: &mut NameBuffer, input: InputEvent, ctx: &mut SessionContext) -> Step {
    match input {
        InputEvent::Confirm if buffer.is_empty() => Step::Stay,
        InputEvent::Confirm => {
            info!("Renamed {} -> {}", ctx.pet.name, buffer);
            ctx.pet.name = buffer.as_str().to_owned();
            Step::Enter(Mode::main_menu_at(MenuItem::Rename))
        }
        InputEvent::Escape => Step::Enter(Mode::main_menu_at(MenuItem::Rename)),
        InputEvent::Backspace => {
            buffer.pop();
            Step::Stay
        }
        InputEvent::Char(c) if !c.is_control() => {
            if buffer.push(c).is_err() {
                debug!("Name buffer full, '{}' dropped", c);
            }
            Step::Stay
        }
        _ => Step::Stay,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  DEBUG MENU
// ═══════════════════════════════════════════════════════════════════════════

/// Entries of the debug menu, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugAction {
    ToggleSick,
    ToggleSoiled,
    ToggleLights,
    KillOrRevive,
    FullHealth,
    LowHealth,
    NotHungry,
    Starving,
    VeryHappy,
    VerySad,
    Critical,
    ResetStats,
    Obese,
    NormalWeight,
    Slim,
    Exit,
}

impl DebugAction {
    pub const ALL: [DebugAction; 16] = [
        DebugAction::ToggleSick,
        DebugAction::ToggleSoiled,
        DebugAction::ToggleLights,
        DebugAction::KillOrRevive,
        DebugAction::FullHealth,
        DebugAction::LowHealth,
        DebugAction::NotHungry,
        DebugAction::Starving,
        DebugAction::VeryHappy,
        DebugAction::VerySad,
        DebugAction::Critical,
        DebugAction::ResetStats,
        DebugAction::Obese,
        DebugAction::NormalWeight,
        DebugAction::Slim,
        DebugAction::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ToggleSick => "Toggle sick",
            Self::ToggleSoiled => "Toggle soiled",
            Self::ToggleLights => "Toggle lights",
            Self::KillOrRevive => "Kill / revive",
            Self::FullHealth => "Health 100",
            Self::LowHealth => "Health 30",
            Self::NotHungry => "Hunger 0",
            Self::Starving => "Hunger 90",
            Self::VeryHappy => "Happiness 100",
            Self::VerySad => "Happiness 10",
            Self::Critical => "Critical condition",
            Self::ResetStats => "Reset stats",
            Self::Obese => "Weight 110",
            Self::NormalWeight => "Weight 50",
            Self::Slim => "Weight 20",
            Self::Exit => "Back",
        }
    }

    /// Apply to the live record. Death is not checked while in debug.
    fn apply(self, ctx: &mut SessionContext) {
        let pet = &mut ctx.pet;
        match self {
            Self::ToggleSick => pet.sick = !pet.sick,
            Self::ToggleSoiled => pet.soiled = !pet.soiled,
            Self::ToggleLights => pet.lights_on = !pet.lights_on,
            Self::KillOrRevive => pet.health = if pet.is_dead() { 50 } else { 0 },
            Self::FullHealth => pet.health = 100,
            Self::LowHealth => pet.health = 30,
            Self::NotHungry => pet.hunger = 0,
            Self::Starving => pet.hunger = 90,
            Self::VeryHappy => pet.happiness = 100,
            Self::VerySad => pet.happiness = 10,
            Self::Critical => {
                pet.health = 1;
                pet.hunger = 100;
                pet.happiness = 0;
            }
            Self::ResetStats => {
                pet.health = 100;
                pet.hunger = 0;
                pet.happiness = 100;
                pet.weight = 50;
                pet.sick = false;
                pet.soiled = false;
            }
            Self::Obese => pet.weight = 110,
            Self::NormalWeight => pet.weight = 50,
            Self::Slim => pet.weight = 20,
            Self::Exit => {}
        }
        let floor = ctx.weight_floor();
        ctx.pet.normalize(floor);
    }
}

pub(super) fn debug_menu(cursor: &mut usize, input: InputEvent, ctx: &mut SessionContext) -> Step {
    let last = DebugAction::ALL.len() - 1;
    match input {
        InputEvent::Escape | InputEvent::Char('b' | 'q') => Step::Enter(Mode::main_menu_at(MenuItem::Feed)),
        i if i.is_prev() => {
            *cursor = cursor.saturating_sub(1);
            Step::Stay
        }
        i if i.is_next() => {
            *cursor = (*cursor + 1).min(last);
            Step::Stay
        }
        i if i.is_confirm() => {
            let action = DebugAction::ALL[(*cursor).min(last)];
            if action == DebugAction::Exit {
                return Step::Enter(Mode::main_menu_at(MenuItem::Feed));
            }
            info!("Debug action: {}", action.label());
            action.apply(ctx);
            Step::Stay
        }
        _ => Step::Stay,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  GUESS GAME
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn guess_game(
    game: &mut GuessGame,
    input: InputEvent,
    ctx: &mut SessionContext,
    rng: &mut impl Entropy,
) -> Step {
    let guess = match input {
        InputEvent::Escape | InputEvent::Char('q') => {
            info!("Guess game abandoned at score {}", game.score);
            return Step::Enter(Mode::main_menu_at(MenuItem::Play));
        }
        InputEvent::Right | InputEvent::Char('l') => Guess::Higher,
        InputEvent::Left | InputEvent::Char('h') => Guess::Lower,
        _ => return Step::Stay,
    };
    let floor = ctx.weight_floor();
    let outcome = game.guess(guess, &mut ctx.pet, ctx.now, floor, rng);
    let correct = game.last.is_some_and(|r| r.correct);
    ctx.anim.play(if correct { Clip::Happy } else { Clip::Sad });
    match outcome {
        GuessOutcome::Continue => Step::Stay,
        GuessOutcome::Finished { score } => {
            info!("Guess game finished: {score} point(s)");
            if score >= GOOD_GAME_SCORE {
                ctx.anim.play(Clip::Happy);
            }
            Step::Enter(Mode::main_menu_at(MenuItem::Play))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  GAME OVER
// ═══════════════════════════════════════════════════════════════════════════

pub(super) fn game_over(cursor: &mut GameOverChoice, input: InputEvent) -> Step {
    match input {
        i if i.is_prev() || i.is_next() => {
            *cursor = match cursor {
                GameOverChoice::Restart => GameOverChoice::Quit,
                GameOverChoice::Quit => GameOverChoice::Restart,
            };
            Step::Stay
        }
        i if i.is_confirm() => match cursor {
            GameOverChoice::Restart => Step::Restart,
            GameOverChoice::Quit => Step::Quit,
        },
        _ => Step::Stay,
    }
}
