//! Integration tests for the per-session runtime: executor, clock,
//! teardown and the single final save.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{TimeZone, Utc};

use termpet::adapters::memory::MemoryStore;
use termpet::adapters::time::{ManualClock, SystemClock};
use termpet::app::commands::InputEvent;
use termpet::app::ports::{Clock, PetRepository};
use termpet::app::service::Flow;
use termpet::config::SessionConfig;
use termpet::error::Error;
use termpet::pet::OwnerKey;
use termpet::render::PlainRenderer;
use termpet::runtime::{SessionHandle, SessionRequest, run_session};

use crate::mock_ports::{BrokenRepo, CaptureOutput, CountingRepo, FixedEntropy};

fn request() -> SessionRequest<'static> {
    SessionRequest {
        public_key: Some("SHA256:runtime"),
        username: "ada",
    }
}

fn fast_config() -> SessionConfig {
    SessionConfig {
        clock_resolution_ms: 10,
        frame_interval_ms: 10,
        logic_interval_ms: 20,
        autosave_interval_secs: 1,
        ..SessionConfig::default()
    }
}

#[test]
fn queued_quit_ends_with_one_final_save() {
    let repo = Arc::new(CountingRepo::default());
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 3, 12, 0, 0).unwrap());
    let handle = SessionHandle::new();
    assert!(handle.send_input(InputEvent::Down));
    assert!(handle.send_input(InputEvent::Char('q')));
    let mut output = CaptureOutput::default();

    let summary = run_session(
        request(),
        &handle,
        repo.clone(),
        SessionConfig::default(),
        &clock,
        &PlainRenderer,
        &mut output,
        &mut FixedEntropy::never(),
    )
    .unwrap();

    assert_eq!(summary.ended_by, Flow::Quit);
    assert_eq!(summary.owner, OwnerKey::new("SHA256:runtime"));
    assert!(summary.final_save);
    assert_eq!(repo.updates(), 1);
    // First frame, then one after the Down key.
    assert_eq!(output.frame_count(), 2);

    let saved = repo.inner.find_by_owner(&summary.owner).unwrap().unwrap();
    assert_eq!(saved.last_visit_at, clock.now());
}

#[test]
fn closed_transport_still_saves() {
    let repo = Arc::new(CountingRepo::default());
    let handle = SessionHandle::new();
    handle.close();
    let mut output = CaptureOutput::default();

    let summary = run_session(
        request(),
        &handle,
        repo.clone(),
        SessionConfig::default(),
        &SystemClock,
        &PlainRenderer,
        &mut output,
        &mut FixedEntropy::never(),
    )
    .unwrap();

    assert_eq!(summary.ended_by, Flow::Closed);
    assert!(summary.final_save);
    assert!(summary.storage_ok);
    assert_eq!(repo.updates(), 1);
}

#[test]
fn unreadable_store_runs_unsaved() {
    let handle = SessionHandle::new();
    handle.close();

    let summary = run_session(
        request(),
        &handle,
        Arc::new(BrokenRepo),
        SessionConfig::default(),
        &SystemClock,
        &PlainRenderer,
        &mut CaptureOutput::default(),
        &mut FixedEntropy::never(),
    )
    .unwrap();

    assert_eq!(summary.ended_by, Flow::Closed);
    assert!(!summary.storage_ok);
    assert_eq!(summary.background.written, 0);
}

#[test]
fn lost_output_closes_session() {
    let repo = Arc::new(CountingRepo::default());
    let handle = SessionHandle::new();
    let mut output = CaptureOutput {
        fail_after: Some(0),
        ..CaptureOutput::default()
    };

    let summary = run_session(
        request(),
        &handle,
        repo.clone(),
        SessionConfig::default(),
        &SystemClock,
        &PlainRenderer,
        &mut output,
        &mut FixedEntropy::never(),
    )
    .unwrap();

    assert_eq!(summary.ended_by, Flow::Closed);
    assert_eq!(repo.updates(), 1);
    assert_eq!(output.frame_count(), 0);
}

#[test]
fn clock_drives_frames_until_close() {
    let repo = Arc::new(CountingRepo::default());
    let handle = SessionHandle::new();
    let closer = handle.clone();
    let timer = std::thread::spawn(move || {
        std::thread::sleep(StdDuration::from_millis(300));
        closer.close();
    });
    let mut output = CaptureOutput::default();

    let summary = run_session(
        request(),
        &handle,
        repo.clone(),
        fast_config(),
        &SystemClock,
        &PlainRenderer,
        &mut output,
        &mut FixedEntropy::never(),
    )
    .unwrap();
    timer.join().unwrap();

    assert_eq!(summary.ended_by, Flow::Closed);
    assert!(output.frame_count() > 1);
    assert!(output.last_frame().unwrap().contains("ada's pet"));
    assert_eq!(repo.updates(), 1 + summary.background.written);
}

#[test]
fn invalid_config_is_rejected_before_loading() {
    let repo = Arc::new(MemoryStore::new());
    let handle = SessionHandle::new();
    let config = SessionConfig {
        clock_resolution_ms: 1,
        ..SessionConfig::default()
    };

    let result = run_session(
        request(),
        &handle,
        repo.clone(),
        config,
        &SystemClock,
        &PlainRenderer,
        &mut CaptureOutput::default(),
        &mut FixedEntropy::never(),
    );
    assert!(matches!(result, Err(Error::Config(_))));
    assert!(repo.is_empty());
}

#[test]
fn anonymous_owner_falls_back_to_username() {
    let repo = Arc::new(MemoryStore::new());
    let handle = SessionHandle::new();
    handle.close();

    let summary = run_session(
        SessionRequest {
            public_key: None,
            username: "grace",
        },
        &handle,
        repo.clone(),
        SessionConfig::default(),
        &SystemClock,
        &PlainRenderer,
        &mut CaptureOutput::default(),
        &mut FixedEntropy::never(),
    )
    .unwrap();
    assert_eq!(summary.owner, OwnerKey::new("user-grace"));
    let pet = repo.find_by_owner(&summary.owner).unwrap().unwrap();
    assert_eq!(pet.name, "grace's pet");
}
