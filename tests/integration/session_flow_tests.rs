//! Integration tests for the SessionService → Fsm → StatEngine pipeline.
//!
//! Each test opens a session on a seeded in-memory store and drives it
//! with queued events, the same way the runtime's main loop does.

use chrono::{DateTime, Duration, TimeZone, Utc};

use termpet::adapters::memory::MemoryStore;
use termpet::app::commands::InputEvent;
use termpet::app::events::AppEvent;
use termpet::app::ports::{PetRepository, Renderer};
use termpet::app::service::{Flow, SessionService};
use termpet::config::SessionConfig;
use termpet::events::SessionEvent;
use termpet::fsm::{GameOverChoice, MenuItem, Mode, ModeId};
use termpet::pet::{OwnerKey, PetRecord};
use termpet::render::PlainRenderer;

use crate::mock_ports::{FixedEntropy, RecordingSaver, RecordingSink};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 18, 0, 0).unwrap()
}

fn owner() -> OwnerKey {
    OwnerKey::new("SHA256:flow")
}

/// Store a pet last seen at `t0()`, adjusted by `tweak`.
fn seeded(tweak: impl FnOnce(&mut PetRecord)) -> MemoryStore {
    let store = MemoryStore::new();
    let mut pet = PetRecord::newborn(owner(), "Pip", t0() - Duration::days(2));
    pet.last_visit_at = t0();
    pet.weight = 30;
    tweak(&mut pet);
    store.update(&pet).unwrap();
    store
}

struct Harness {
    svc: SessionService,
    sink: RecordingSink,
    saver: RecordingSaver,
    now: DateTime<Utc>,
}

impl Harness {
    fn open(store: &MemoryStore) -> Self {
        let mut sink = RecordingSink::default();
        let svc = SessionService::open(
            owner(),
            "ada",
            store,
            SessionConfig::default(),
            t0(),
            &mut FixedEntropy::never(),
            &mut sink,
        );
        Self {
            svc,
            sink,
            saver: RecordingSaver::default(),
            now: t0(),
        }
    }

    fn send_with(&mut self, event: SessionEvent, rng: &mut FixedEntropy) -> Flow {
        self.now += Duration::milliseconds(100);
        self.svc
            .handle(event, self.now, rng, &mut self.saver, &mut self.sink)
    }

    fn send(&mut self, event: SessionEvent) -> Flow {
        self.send_with(event, &mut FixedEntropy::never())
    }

    fn keys(&mut self, keys: &[InputEvent]) -> Flow {
        let mut flow = Flow::Continue;
        for key in keys {
            flow = self.send(SessionEvent::Input(*key));
        }
        flow
    }

    fn mode(&self) -> ModeId {
        self.svc.mode_id()
    }
}

// ── Opening ──────────────────────────────────────────────────

#[test]
fn new_owner_gets_default_pet() {
    let store = MemoryStore::new();
    let h = Harness::open(&store);
    let pet = h.svc.pet();
    assert!(h.svc.created());
    assert_eq!(pet.name, "ada's pet");
    assert_eq!((pet.hunger, pet.happiness, pet.health), (0, 80, 100));
    assert_eq!(pet.born_at, t0());
    assert_eq!(h.mode(), ModeId::MainMenu);
    assert_eq!(store.len(), 1);
}

// ── Feeding ──────────────────────────────────────────────────

#[test]
fn burger_twice_through_the_menus() {
    let store = seeded(|p| {
        p.hunger = 100;
        p.health = 60;
        p.weight = 20;
    });
    let mut h = Harness::open(&store);

    h.keys(&[InputEvent::Confirm]);
    assert_eq!(h.mode(), ModeId::FoodSubmenu);
    h.keys(&[InputEvent::Confirm]);
    assert_eq!(h.mode(), ModeId::MainMenu);
    assert_eq!(h.svc.pet().hunger, 90);

    h.keys(&[InputEvent::Confirm, InputEvent::Confirm]);
    let pet = h.svc.pet();
    assert_eq!(pet.hunger, 80);
    assert_eq!(pet.health, 80);
    assert_eq!(pet.weight, 26);

    let transitions = h
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::StateChanged { .. }))
        .count();
    assert_eq!(transitions, 4);
}

#[test]
fn overfeeding_costs_health() {
    let store = seeded(|p| p.hunger = 0);
    let mut h = Harness::open(&store);
    h.keys(&[InputEvent::Confirm, InputEvent::Right, InputEvent::Confirm]);
    let pet = h.svc.pet();
    assert_eq!(pet.hunger, 0);
    assert_eq!(pet.health, 98);
    assert_eq!(pet.weight, 45);
}

// ── Sleep ────────────────────────────────────────────────────

#[test]
fn lights_off_restricts_the_menu() {
    let store = seeded(|_| {});
    let mut h = Harness::open(&store);

    // Down to Toggle Lights (index 5) and switch off.
    h.keys(&[InputEvent::Down; 5]);
    h.keys(&[InputEvent::Confirm]);
    assert!(h.svc.pet().is_asleep());

    // Feed is unreachable: moving up snaps back to Toggle Lights.
    h.keys(&[InputEvent::Up, InputEvent::Up]);
    assert_eq!(
        h.svc.view().mode,
        &Mode::MainMenu {
            cursor: MenuItem::ToggleLights
        }
    );
    h.keys(&[InputEvent::Confirm]);
    assert!(!h.svc.pet().is_asleep());
}

// ── Death and restart ────────────────────────────────────────

#[test]
fn starvation_tick_preempts_into_game_over_once() {
    let store = seeded(|p| {
        p.health = 1;
        p.hunger = 95;
    });
    let mut h = Harness::open(&store);
    h.keys(&[InputEvent::Confirm]);
    assert_eq!(h.mode(), ModeId::FoodSubmenu);

    h.send(SessionEvent::LogicTick);
    assert_eq!(h.mode(), ModeId::GameOver);
    assert!(h.svc.pet().is_dead());

    h.send(SessionEvent::LogicTick);
    h.send(SessionEvent::Frame);
    assert_eq!(h.sink.count(&AppEvent::PetDied), 1);
    assert_eq!(
        h.sink.count(&AppEvent::StateChanged {
            from: ModeId::FoodSubmenu,
            to: ModeId::GameOver
        }),
        1
    );
}

#[test]
fn restart_creates_newborn_and_saves_it() {
    let store = seeded(|p| p.health = 0);
    let mut h = Harness::open(&store);
    assert_eq!(h.mode(), ModeId::GameOver);

    h.keys(&[InputEvent::Confirm]);
    assert_eq!(h.mode(), ModeId::MainMenu);
    let pet = h.svc.pet();
    assert_eq!(pet.born_at, h.now);
    assert_eq!(pet.owner, owner());
    assert_eq!(pet.name, "Pip");
    assert_eq!((pet.hunger, pet.happiness, pet.health), (0, 80, 100));
    assert_eq!(h.saver.saves.len(), 1);
    assert_eq!(h.saver.saves[0].born_at, h.now);
    assert_eq!(h.sink.count(&AppEvent::Restarted), 1);
}

#[test]
fn game_over_quit_ends_session() {
    let store = seeded(|p| p.health = 0);
    let mut h = Harness::open(&store);
    assert_eq!(
        h.svc.view().mode,
        &Mode::GameOver {
            cursor: GameOverChoice::Restart
        }
    );
    assert_eq!(h.keys(&[InputEvent::Down, InputEvent::Confirm]), Flow::Quit);
}

// ── Guess game ───────────────────────────────────────────────

#[test]
fn guess_game_ends_after_five_guesses() {
    let store = seeded(|p| p.happiness = 50);
    let mut h = Harness::open(&store);
    h.keys(&[InputEvent::Down, InputEvent::Down, InputEvent::Confirm]);
    assert_eq!(h.mode(), ModeId::GuessGame);

    for _ in 0..4 {
        h.keys(&[InputEvent::Right]);
        assert_eq!(h.mode(), ModeId::GuessGame);
    }
    h.keys(&[InputEvent::Right]);
    assert_eq!(
        h.svc.view().mode,
        &Mode::MainMenu {
            cursor: MenuItem::Play
        }
    );
    assert_eq!(h.svc.pet().weight, 25);
}

#[test]
fn escape_abandons_game_without_bonus() {
    let store = seeded(|p| p.happiness = 50);
    let mut h = Harness::open(&store);
    h.keys(&[InputEvent::Down, InputEvent::Down, InputEvent::Confirm, InputEvent::Escape]);
    assert_eq!(h.mode(), ModeId::MainMenu);
    assert_eq!(h.svc.pet().happiness, 50);
}

// ── Debug, rename, quit ──────────────────────────────────────

#[test]
fn debug_mode_freezes_decay() {
    let store = seeded(|p| p.hunger = 50);
    let mut h = Harness::open(&store);
    h.keys(&[InputEvent::ToggleDebug]);
    assert_eq!(h.mode(), ModeId::Debug);

    let before = h.svc.pet().clone();
    for _ in 0..20 {
        h.send_with(SessionEvent::LogicTick, &mut FixedEntropy::always());
    }
    assert_eq!(h.svc.pet(), &before);

    h.keys(&[InputEvent::Escape]);
    h.send_with(SessionEvent::LogicTick, &mut FixedEntropy::always());
    assert_ne!(h.svc.pet(), &before);
}

#[test]
fn rename_through_the_menu() {
    let store = seeded(|_| {});
    let mut h = Harness::open(&store);
    h.keys(&[InputEvent::Down; 4]);
    h.keys(&[InputEvent::Confirm]);
    assert_eq!(h.mode(), ModeId::Rename);
    let typed: Vec<_> = "Biscuit".chars().map(InputEvent::Char).collect();
    h.keys(&typed);
    h.keys(&[InputEvent::Confirm]);
    assert_eq!(h.svc.pet().name, "Biscuit");
}

#[test]
fn interrupt_quits_from_any_mode() {
    let store = seeded(|_| {});
    let mut h = Harness::open(&store);
    h.keys(&[InputEvent::ToggleDebug]);
    assert_eq!(h.keys(&[InputEvent::Interrupt]), Flow::Quit);
}

#[test]
fn autosave_stamps_last_visit() {
    let store = seeded(|_| {});
    let mut h = Harness::open(&store);
    h.send(SessionEvent::Autosave);
    assert_eq!(h.saver.saves.len(), 1);
    assert_eq!(h.saver.saves[0].last_visit_at, h.now);
    assert_eq!(h.sink.count(&AppEvent::Saved), 1);
}

#[test]
fn every_mode_renders() {
    let store = seeded(|_| {});
    let mut h = Harness::open(&store);
    let keys = [
        InputEvent::Confirm,
        InputEvent::Escape,
        InputEvent::ToggleDebug,
        InputEvent::ToggleDebug,
        InputEvent::Char('?'),
    ];
    for key in keys {
        h.keys(&[key]);
        let frame = PlainRenderer.render(&h.svc.view());
        assert!(frame.contains("Pip"));
    }
    assert!(PlainRenderer.render(&h.svc.view()).contains("help"));
}
