//! Session state machine.
//!
//! Exactly one [`Mode`] is active per session. Each variant carries only
//! the data that mode needs, so "in the game and in the debug menu at
//! once" cannot be expressed.
//!
//! ```text
//!                 ┌────────────┐  Feed   ┌──────────────┐
//!        ┌───────▶│  MainMenu  │────────▶│ FoodSubmenu  │
//!        │        │            │◀────────│              │
//!        │        └─┬──┬───┬───┘ fed/esc └──────────────┘
//!        │   Rename │  │   │ Play
//!        │          ▼  │   ▼
//!        │  ┌────────┐ │ ┌───────────┐
//!        │  │ Rename │ │ │ GuessGame │
//!        │  └────────┘ │ └───────────┘
//!        │      ctrl+d ▼
//!        │        ┌─────────┐
//!        │        │  Debug  │   (tick decay suspended)
//!        │        └─────────┘
//!        │ Restart
//!  ┌─────┴─────┐
//!  │ GameOver  │◀── any mode except Debug, as soon as health hits 0
//!  └───────────┘
//! ```
//!
//! Handlers in [`states`] receive their mode's data plus the shared
//! [`SessionContext`] and return a [`Step`]; the engine performs the
//! transition and then re-checks for death.

pub mod context;
pub mod game;
pub mod states;

use chrono::Duration;
use log::info;

use crate::app::commands::InputEvent;
use crate::pet::FoodKind;
use crate::stats::{self, Entropy, TickReport};
use context::SessionContext;
use game::GuessGame;

/// Byte capacity of the rename buffer.
pub const NAME_CAPACITY: usize = 20;

pub type NameBuffer = heapless::String<NAME_CAPACITY>;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Data-less discriminant of [`Mode`], for events and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ModeId {
    MainMenu = 0,
    FoodSubmenu = 1,
    Rename = 2,
    Debug = 3,
    GuessGame = 4,
    GameOver = 5,
}

impl ModeId {
    pub fn name(self) -> &'static str {
        match self {
            Self::MainMenu => "MainMenu",
            Self::FoodSubmenu => "FoodSubmenu",
            Self::Rename => "Rename",
            Self::Debug => "Debug",
            Self::GuessGame => "GuessGame",
            Self::GameOver => "GameOver",
        }
    }
}

/// Main menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    Feed,
    Clean,
    Play,
    Medicine,
    Rename,
    ToggleLights,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 7] = [
        MenuItem::Feed,
        MenuItem::Clean,
        MenuItem::Play,
        MenuItem::Medicine,
        MenuItem::Rename,
        MenuItem::ToggleLights,
        MenuItem::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Feed => "Feed",
            Self::Clean => "Clean",
            Self::Play => "Play",
            Self::Medicine => "Medicine",
            Self::Rename => "Rename",
            Self::ToggleLights => "Toggle Lights",
            Self::Quit => "Quit",
        }
    }

    /// Only these can be reached while the pet sleeps.
    pub fn available_while_asleep(self) -> bool {
        matches!(self, Self::ToggleLights | Self::Quit)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1).min(Self::ALL.len() - 1)]
    }

    fn prev(self) -> Self {
        Self::ALL[self.index().saturating_sub(1)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverChoice {
    Restart,
    Quit,
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    MainMenu { cursor: MenuItem },
    FoodSubmenu { cursor: FoodKind },
    Rename { buffer: NameBuffer },
    Debug { cursor: usize },
    GuessGame(GuessGame),
    GameOver { cursor: GameOverChoice },
}

impl Mode {
    pub fn id(&self) -> ModeId {
        match self {
            Self::MainMenu { .. } => ModeId::MainMenu,
            Self::FoodSubmenu { .. } => ModeId::FoodSubmenu,
            Self::Rename { .. } => ModeId::Rename,
            Self::Debug { .. } => ModeId::Debug,
            Self::GuessGame(_) => ModeId::GuessGame,
            Self::GameOver { .. } => ModeId::GameOver,
        }
    }

    pub fn main_menu_at(cursor: MenuItem) -> Self {
        Self::MainMenu { cursor }
    }
}

// ---------------------------------------------------------------------------
// Handler results
// ---------------------------------------------------------------------------

/// What a mode handler asks the engine to do.
#[derive(Debug, PartialEq, Eq)]
pub enum Step {
    Stay,
    Enter(Mode),
    Quit,
    Restart,
}

/// What the engine asks the session service to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    None,
    /// End the session.
    Quit,
    /// Replace the dead pet with a newborn.
    Restart,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    mode: Mode,
    transitions: u64,
}

impl Fsm {
    /// Start in MainMenu, or GameOver when the loaded pet is already dead.
    pub fn new(pet_dead: bool) -> Self {
        let mode = if pet_dead {
            Mode::GameOver {
                cursor: GameOverChoice::Restart,
            }
        } else {
            Mode::main_menu_at(MenuItem::Feed)
        };
        info!("FSM starting in mode: {}", mode.id().name());
        Self {
            mode,
            transitions: 0,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn mode_id(&self) -> ModeId {
        self.mode.id()
    }

    #[cfg(test)]
    fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Route one input event to the active mode.
    pub fn handle_input(
        &mut self,
        input: InputEvent,
        ctx: &mut SessionContext,
        rng: &mut impl Entropy,
    ) -> Directive {
        match input {
            InputEvent::Resize { width, height } => {
                ctx.view.width = width;
                ctx.view.height = height;
                return Directive::None;
            }
            InputEvent::Interrupt => return Directive::Quit,
            InputEvent::ToggleDebug => {
                match self.mode_id() {
                    ModeId::MainMenu | ModeId::FoodSubmenu | ModeId::Rename => {
                        self.transition(Mode::Debug { cursor: 0 });
                    }
                    ModeId::Debug => self.transition(Mode::main_menu_at(MenuItem::Feed)),
                    ModeId::GuessGame | ModeId::GameOver => {}
                }
                self.check_death(ctx);
                return Directive::None;
            }
            _ => {}
        }

        let step = match &mut self.mode {
            Mode::MainMenu { cursor } => states::main_menu(cursor, input, ctx, rng),
            Mode::FoodSubmenu { cursor } => states::food_submenu(cursor, input, ctx),
            Mode::Rename { buffer } => states::rename(buffer, input, ctx),
            Mode::Debug { cursor } => states::debug_menu(cursor, input, ctx),
            Mode::GuessGame(game) => states::guess_game(game, input, ctx, rng),
            Mode::GameOver { cursor } => states::game_over(cursor, input),
        };
        let directive = self.apply(step);
        self.check_death(ctx);
        directive
    }

    /// One stat tick. Decay is suspended in Debug and GameOver.
    pub fn on_logic_tick(&mut self, ctx: &mut SessionContext, rng: &mut impl Entropy) -> TickReport {
        let report = match self.mode_id() {
            ModeId::Debug | ModeId::GameOver => TickReport::default(),
            _ => stats::apply_tick(
                &mut ctx.pet,
                ctx.now,
                &ctx.config.tick,
                ctx.config.weight_floor,
                rng,
            ),
        };
        self.check_death(ctx);
        report
    }

    /// Animation frame: advance the clip and expire timed overlays.
    pub fn on_frame(&mut self, ctx: &mut SessionContext, rng: &mut impl Entropy) {
        ctx.anim.advance(ctx.pet.mood(), rng);
        ctx.expire_highlight();
        if let Mode::GuessGame(game) = &mut self.mode {
            let ttl = Duration::milliseconds(i64::from(ctx.config.result_display_ms));
            game.expire_result(ctx.now, ttl);
        }
    }

    /// The single death signal. Returns `false` when already in GameOver.
    pub fn enter_game_over(&mut self) -> bool {
        if self.mode_id() == ModeId::GameOver {
            return false;
        }
        self.transition(Mode::GameOver {
            cursor: GameOverChoice::Restart,
        });
        true
    }

    /// Back to the main menu after a restart.
    pub fn reset(&mut self) {
        self.transition(Mode::main_menu_at(MenuItem::Feed));
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn apply(&mut self, step: Step) -> Directive {
        match step {
            Step::Stay => Directive::None,
            Step::Enter(next) => {
                self.transition(next);
                Directive::None
            }
            Step::Quit => Directive::Quit,
            Step::Restart => Directive::Restart,
        }
    }

    fn check_death(&mut self, ctx: &SessionContext) {
        if ctx.pet.is_dead() && self.mode_id() != ModeId::Debug {
            self.enter_game_over();
        }
    }

    fn transition(&mut self, next: Mode) {
        self.transitions += 1;
        info!(
            "FSM transition #{}: {} -> {}",
            self.transitions,
            self.mode.id().name(),
            next.id().name()
        );
        self.mode = next;
    }
}
