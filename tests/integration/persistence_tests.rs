//! Integration tests for loading, offline catch-up and saving.
//!
//! Covers the repository paths of a session: catch-up on open, fallback
//! when storage is broken, queued autosaves through the writer thread and
//! the single final save.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use termpet::adapters::json_store::JsonFileStore;
use termpet::adapters::memory::MemoryStore;
use termpet::adapters::save_queue::PersistenceWorker;
use termpet::app::events::AppEvent;
use termpet::app::ports::{PetRepository, StorageError};
use termpet::app::service::{Flow, SessionService};
use termpet::config::SessionConfig;
use termpet::events::SessionEvent;
use termpet::fsm::ModeId;
use termpet::pet::{OwnerKey, PetRecord};

use crate::mock_ports::{
    BrokenRepo, CountingRepo, FixedEntropy, FlakyRepo, RecordingSaver, RecordingSink,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 20, 7, 0, 0).unwrap()
}

fn owner() -> OwnerKey {
    OwnerKey::new("SHA256:persist")
}

fn stored(repo: &impl PetRepository, hunger: u8, health: u8, happiness: u8) {
    let mut pet = PetRecord::newborn(owner(), "Tamago", t0() - Duration::days(3));
    pet.hunger = hunger;
    pet.health = health;
    pet.happiness = happiness;
    pet.last_visit_at = t0();
    repo.update(&pet).unwrap();
}

fn open_at(
    repo: &(impl PetRepository + ?Sized),
    now: DateTime<Utc>,
    sink: &mut RecordingSink,
) -> SessionService {
    SessionService::open(
        owner(),
        "ada",
        repo,
        SessionConfig::default(),
        now,
        &mut FixedEntropy::never(),
        sink,
    )
}

// ── Offline catch-up ─────────────────────────────────────────

#[test]
fn thirty_hours_away_on_reconnect() {
    let store = MemoryStore::new();
    stored(&store, 95, 50, 40);

    let mut sink = RecordingSink::default();
    let later = t0() + Duration::hours(30);
    let svc = open_at(&store, later, &mut sink);

    let pet = svc.pet();
    assert!(!svc.created());
    assert_eq!(pet.hunger, 100);
    assert_eq!(pet.happiness, 0);
    assert_eq!(pet.health, 6);
    assert!(!pet.soiled && !pet.sick);
    assert_eq!(pet.last_visit_at, later);
    assert_eq!(svc.mode_id(), ModeId::MainMenu);
    assert_eq!(
        sink.count(&AppEvent::CaughtUp {
            minutes: 30 * 60,
            tier: 1
        }),
        1
    );
    assert_eq!(sink.count(&AppEvent::PetDied), 0);
}

#[test]
fn a_week_away_is_fatal() {
    let store = MemoryStore::new();
    stored(&store, 0, 100, 100);

    let mut sink = RecordingSink::default();
    let svc = open_at(&store, t0() + Duration::hours(168), &mut sink);
    assert!(svc.pet().is_dead());
    assert_eq!(svc.mode_id(), ModeId::GameOver);
    assert_eq!(sink.count(&AppEvent::PetDied), 1);
}

#[test]
fn dead_pet_is_not_caught_up() {
    let store = MemoryStore::new();
    stored(&store, 40, 0, 40);

    let mut sink = RecordingSink::default();
    let svc = open_at(&store, t0() + Duration::hours(10), &mut sink);
    assert_eq!(svc.pet().hunger, 40);
    assert_eq!(svc.mode_id(), ModeId::GameOver);
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::CaughtUp { .. })));
    assert_eq!(sink.count(&AppEvent::PetDied), 0);
}

#[test]
fn clock_skew_skips_catch_up() {
    let store = MemoryStore::new();
    stored(&store, 20, 90, 60);

    let mut sink = RecordingSink::default();
    let svc = open_at(&store, t0() - Duration::hours(2), &mut sink);
    let pet = svc.pet();
    assert_eq!((pet.hunger, pet.health, pet.happiness), (20, 90, 60));
}

// ── Storage failures ─────────────────────────────────────────

#[test]
fn broken_store_still_opens_a_session() {
    let mut sink = RecordingSink::default();
    let mut svc = open_at(&BrokenRepo, t0(), &mut sink);
    assert!(!svc.created());
    assert!(!svc.can_save());
    assert_eq!(svc.pet().name, "ada's pet");
    assert_eq!(svc.mode_id(), ModeId::MainMenu);

    assert!(svc.shutdown(&BrokenRepo, t0(), &mut sink));
    assert_eq!(
        sink.count(&AppEvent::SaveFailed(StorageError::Io(
            std::io::ErrorKind::PermissionDenied
        ))),
        1
    );
    assert_eq!(sink.count(&AppEvent::SessionEnded), 1);
}

#[test]
fn load_recovers_after_one_failure() {
    let repo = FlakyRepo::failing(1);
    stored(&repo.inner, 70, 80, 60);

    let mut sink = RecordingSink::default();
    let mut svc = open_at(&repo, t0(), &mut sink);
    assert!(svc.can_save());
    assert!(!svc.created());
    assert_eq!(svc.pet().name, "Tamago");
    assert_eq!(svc.pet().hunger, 70);

    assert!(svc.shutdown(&repo, t0() + Duration::minutes(3), &mut sink));
    assert_eq!(repo.inner.updates(), 2);
    let saved = repo.inner.find_by_owner(&owner()).unwrap().unwrap();
    assert_eq!(saved.name, "Tamago");
    assert_eq!(saved.born_at, t0() - Duration::days(3));
}

#[test]
fn unreadable_store_never_replaces_the_pet() {
    let repo = FlakyRepo::failing(u32::MAX);
    stored(&repo.inner, 70, 80, 60);
    let original = repo.inner.find_by_owner(&owner()).unwrap().unwrap();

    let mut sink = RecordingSink::default();
    let mut svc = open_at(&repo, t0(), &mut sink);
    assert!(!svc.can_save());
    assert_eq!(svc.pet().name, "ada's pet");

    let mut saver = RecordingSaver::default();
    svc.handle(
        SessionEvent::Autosave,
        t0() + Duration::minutes(1),
        &mut FixedEntropy::never(),
        &mut saver,
        &mut sink,
    );
    assert!(saver.saves.is_empty());
    assert!(svc.shutdown(&repo, t0() + Duration::minutes(2), &mut sink));

    let interrupted = AppEvent::SaveFailed(StorageError::Io(std::io::ErrorKind::Interrupted));
    assert_eq!(sink.count(&interrupted), 2);
    assert_eq!(sink.count(&AppEvent::SessionEnded), 1);
    // Only the seeding write reached the store.
    assert_eq!(repo.inner.updates(), 1);

    let mut sink = RecordingSink::default();
    let again = open_at(&repo.inner, t0() + Duration::minutes(4), &mut sink);
    assert_eq!(again.pet().name, "Tamago");
    assert_eq!(again.pet().born_at, original.born_at);
    assert_eq!(again.pet().id, original.id);
}

#[test]
fn failed_autosave_is_reported_and_session_continues() {
    let store = MemoryStore::new();
    let mut sink = RecordingSink::default();
    let mut svc = open_at(&store, t0(), &mut sink);
    let mut saver = RecordingSaver {
        fail_with: Some(StorageError::QueueFull),
        ..RecordingSaver::default()
    };

    let flow = svc.handle(
        SessionEvent::Autosave,
        t0(),
        &mut FixedEntropy::never(),
        &mut saver,
        &mut sink,
    );
    assert_eq!(flow, Flow::Continue);
    assert_eq!(sink.count(&AppEvent::SaveFailed(StorageError::QueueFull)), 1);
    assert!(saver.saves.is_empty());
}

// ── Saving ───────────────────────────────────────────────────

#[test]
fn shutdown_writes_exactly_once() {
    let repo = CountingRepo::default();
    let mut sink = RecordingSink::default();
    let mut svc = open_at(&repo, t0(), &mut sink);
    let end = t0() + Duration::minutes(12);

    assert!(svc.shutdown(&repo, end, &mut sink));
    assert!(!svc.shutdown(&repo, end, &mut sink));
    assert_eq!(repo.updates(), 1);

    let saved = repo.inner.find_by_owner(&owner()).unwrap().unwrap();
    assert_eq!(saved.last_visit_at, end);
}

#[test]
fn autosave_through_worker_reaches_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("pets.json");
    let store: Arc<dyn PetRepository> = Arc::new(JsonFileStore::open(&path).unwrap());

    let mut sink = RecordingSink::default();
    let mut svc = open_at(store.as_ref(), t0(), &mut sink);
    let mut worker = PersistenceWorker::spawn(Arc::clone(&store), "persist-test").unwrap();
    let mut saver = worker.saver();

    let later = t0() + Duration::minutes(5);
    svc.handle(
        SessionEvent::Input(termpet::app::commands::InputEvent::Confirm),
        later,
        &mut FixedEntropy::never(),
        &mut saver,
        &mut sink,
    );
    svc.handle(
        SessionEvent::Autosave,
        later,
        &mut FixedEntropy::never(),
        &mut saver,
        &mut sink,
    );
    let stats = worker.stop();
    assert_eq!(stats.written, 1);
    assert_eq!(stats.failed, 0);
    assert_eq!(sink.count(&AppEvent::Saved), 1);

    let reopened = JsonFileStore::open(&path).unwrap();
    let found = reopened.find_by_owner(&owner()).unwrap().unwrap();
    assert_eq!(found.last_visit_at, later);
    assert_eq!(found.name, "ada's pet");
}

#[test]
fn saver_refuses_after_worker_stops() {
    let store: Arc<dyn PetRepository> = Arc::new(MemoryStore::new());
    let mut sink = RecordingSink::default();
    let mut svc = open_at(store.as_ref(), t0(), &mut sink);
    let mut worker = PersistenceWorker::spawn(Arc::clone(&store), "stopped").unwrap();
    let mut saver = worker.saver();
    worker.stop();

    svc.handle(
        SessionEvent::Autosave,
        t0(),
        &mut FixedEntropy::never(),
        &mut saver,
        &mut sink,
    );
    assert_eq!(sink.count(&AppEvent::SaveFailed(StorageError::Closed)), 1);
}

#[test]
fn reconnect_picks_up_saved_state() {
    let store = MemoryStore::new();
    let mut sink = RecordingSink::default();
    let mut svc = open_at(&store, t0(), &mut sink);
    let mut saver = RecordingSaver::default();
    // Main menu -> Rename, type a name, confirm.
    for key in ["down", "down", "down", "down", "enter", "N", "i", "x", "enter"] {
        let input = termpet::app::commands::InputEvent::from_key(key).unwrap();
        svc.handle(
            SessionEvent::Input(input),
            t0(),
            &mut FixedEntropy::never(),
            &mut saver,
            &mut sink,
        );
    }
    assert_eq!(svc.pet().name, "Nix");
    svc.shutdown(&store, t0(), &mut sink);

    let mut sink = RecordingSink::default();
    let again = open_at(&store, t0(), &mut sink);
    assert_eq!(again.pet().name, "Nix");
    assert!(!again.created());
}
