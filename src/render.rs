//! Read-only snapshot handed to a [`Renderer`], plus a plain-text renderer.
//!
//! The renderer is a pure function of the [`SessionView`]; it never sees
//! the service or the state machine, only what they expose.

use core::fmt::Write;

use chrono::{DateTime, Utc};

use crate::app::ports::Renderer;
use crate::fsm::context::{Animation, Clip, Highlight, ViewPrefs, WANDER_LIMIT};
use crate::fsm::game::GuessGame;
use crate::fsm::states::DebugAction;
use crate::fsm::{GameOverChoice, MenuItem, Mode};
use crate::pet::{FoodKind, PetRecord};

/// Everything a frame is drawn from.
#[derive(Debug, Clone, Copy)]
pub struct SessionView<'a> {
    pub pet: &'a PetRecord,
    pub mode: &'a Mode,
    pub anim: &'a Animation,
    pub view: ViewPrefs,
    pub highlight: Option<Highlight>,
    pub now: DateTime<Utc>,
}

// ───────────────────────────────────────────────────────────────
// PlainRenderer
// ───────────────────────────────────────────────────────────────

/// Unstyled text frames, one line per row.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainRenderer;

const BAR_WIDTH: usize = 20;

impl Renderer for PlainRenderer {
    fn render(&self, v: &SessionView<'_>) -> String {
        let mut out = String::with_capacity(1024);
        let pet = v.pet;

        let _ = writeln!(
            out,
            "{}  ({}, {} pet-years)",
            pet.name,
            pet.life_stage(v.now).label(),
            pet.pet_years(v.now)
        );
        let _ = writeln!(out, "Hunger    {}", bar(pet.hunger));
        let _ = writeln!(out, "Happiness {}", bar(pet.happiness));
        let _ = writeln!(out, "Health    {}", bar(pet.health));
        let _ = writeln!(out, "Weight    {}", pet.weight);
        let _ = writeln!(out, "{}", flags(pet));
        out.push('\n');
        let _ = writeln!(out, "{}", sprite(v.anim));
        out.push('\n');

        match v.mode {
            Mode::MainMenu { cursor } => main_menu(&mut out, *cursor, v),
            Mode::FoodSubmenu { cursor } => food_menu(&mut out, *cursor),
            Mode::Rename { buffer } => {
                let _ = writeln!(out, "New name: {}_", buffer);
                let _ = writeln!(out, "[enter] save  [esc] cancel");
            }
            Mode::Debug { cursor } => debug_menu(&mut out, *cursor),
            Mode::GuessGame(game) => guess_game(&mut out, game),
            Mode::GameOver { cursor } => game_over(&mut out, pet, *cursor),
        }

        if v.view.show_help {
            out.push('\n');
            let _ = writeln!(out, "arrows/hjkl move  enter/space select  q quit  ? help  ctrl+d debug");
        }
        out
    }
}

fn bar(value: u8) -> String {
    let filled = usize::from(value) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        value
    )
}

fn flags(pet: &PetRecord) -> String {
    let mut parts = Vec::new();
    if pet.is_dead() {
        parts.push("dead");
    }
    if pet.sick {
        parts.push("sick");
    }
    if pet.soiled {
        parts.push("needs cleaning");
    }
    if pet.is_asleep() {
        parts.push("asleep");
    }
    if parts.is_empty() {
        String::from("fine")
    } else {
        parts.join(", ")
    }
}

fn sprite(anim: &Animation) -> String {
    let face = match anim.clip {
        Clip::Idle => "(o.o)",
        Clip::Happy => "(^.^)",
        Clip::Sad => "(;.;)",
        Clip::Hungry => "(o.O)",
        Clip::Sick => "(x.x)~",
        Clip::Sleeping => "(-.-) z",
        Clip::Dead => "(X_X)",
        Clip::Eating if anim.frame % 2 == 0 => "(o.o)=",
        Clip::Eating => "(o.o)-",
        Clip::CakeEating => "(*.*)%",
        Clip::Playing if anim.frame % 2 == 0 => "\\(^o^)/",
        Clip::Playing => "/(^o^)\\",
    };
    let offset = usize::try_from(i16::from(anim.position) + i16::from(WANDER_LIMIT)).unwrap_or(0);
    format!("{}{}", " ".repeat(8 + offset), face)
}

fn marker(selected: bool) -> &'static str {
    if selected { "> " } else { "  " }
}

fn main_menu(out: &mut String, cursor: MenuItem, v: &SessionView<'_>) {
    let asleep = v.pet.is_asleep();
    for item in MenuItem::ALL {
        let lit = v.highlight.is_some_and(|h| h.item == item);
        let dim = asleep && !item.available_while_asleep();
        let _ = writeln!(
            out,
            "{}{}{}{}",
            marker(item == cursor),
            item.label(),
            if lit { " *" } else { "" },
            if dim { " (asleep)" } else { "" }
        );
    }
}

fn food_menu(out: &mut String, cursor: FoodKind) {
    let _ = writeln!(out, "Feed what?");
    for food in FoodKind::ALL {
        let _ = writeln!(out, "{}{}", marker(food == cursor), food.label());
    }
}

fn debug_menu(out: &mut String, cursor: usize) {
    let _ = writeln!(out, "DEBUG");
    for (i, action) in DebugAction::ALL.iter().enumerate() {
        let _ = writeln!(out, "{}{}", marker(i == cursor), action.label());
    }
}

fn guess_game(out: &mut String, game: &GuessGame) {
    let _ = writeln!(out, "Higher or lower than {}?", game.target);
    let _ = writeln!(out, "Score {}  Guesses left {}", game.score, game.guesses_left);
    if let Some(result) = game.last {
        let _ = writeln!(
            out,
            "Drew {}: {}",
            result.drawn,
            if result.correct { "correct!" } else { "wrong" }
        );
    }
    let _ = writeln!(out, "[left] lower  [right] higher  [esc] stop");
}

fn game_over(out: &mut String, pet: &PetRecord, cursor: GameOverChoice) {
    let _ = writeln!(out, "{} has passed away.", pet.name);
    let _ = writeln!(out, "{}Start over", marker(cursor == GameOverChoice::Restart));
    let _ = writeln!(out, "{}Quit", marker(cursor == GameOverChoice::Quit));
}
