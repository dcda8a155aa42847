//! Termpet: local terminal host.
//!
//! Runs one session over stdin/stdout: each stdin line is a key name
//! (`up`, `enter`, `ctrl+d`, `q`, ...), each rendered frame goes to
//! stdout, logs go to stderr.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  stdin reader    StdoutSink     JsonFileStore   SystemClock    │
//! │  (SessionHandle) (OutputSink)   (PetRepository) (Clock)        │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            SessionService (pure logic)                 │    │
//! │  │  Fsm · StatEngine                                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · PersistenceWorker               │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Environment:
//! - `TERMPET_CONFIG`: session config JSON (defaults when unset/absent)
//! - `TERMPET_DATA`: pet store file (default `termpet-data/pets.json`)
//! - `TERMPET_PUBLIC_KEY`: owner key; falls back to `USER`
//! - `RUST_LOG`: log filter (default `info`)

#![deny(unused_must_use)]

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use termpet::adapters::json_store::JsonFileStore;
use termpet::adapters::time::SystemClock;
use termpet::app::commands::InputEvent;
use termpet::app::ports::OutputSink;
use termpet::config::SessionConfig;
use termpet::render::PlainRenderer;
use termpet::runtime::{SessionHandle, SessionRequest, run_session};

const DEFAULT_DATA_PATH: &str = "termpet-data/pets.json";

// ── Output adapter ────────────────────────────────────────────

/// Clears the terminal and writes each frame to stdout.
struct StdoutSink {
    out: std::io::Stdout,
}

impl OutputSink for StdoutSink {
    fn write_frame(&mut self, frame: &str) -> std::io::Result<()> {
        let mut lock = self.out.lock();
        lock.write_all(b"\x1b[2J\x1b[H")?;
        lock.write_all(frame.as_bytes())?;
        lock.flush()
    }
}

// ── Input thread ──────────────────────────────────────────────

fn spawn_stdin_reader(handle: SessionHandle) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new().name("stdin".into()).spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match InputEvent::from_key(line.trim()) {
                Some(input) => {
                    if !handle.send_input(input) {
                        warn!("Input '{}' dropped", line.trim());
                    }
                }
                None => log::debug!("Ignoring unknown key '{}'", line.trim()),
            }
            if handle.is_closed() {
                return;
            }
        }
        handle.close();
    })
}

// ── Entry point ───────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::var_os("TERMPET_CONFIG") {
        Some(path) => {
            let path = PathBuf::from(path);
            SessionConfig::load(&path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => SessionConfig::default(),
    };
    let data_path = std::env::var_os("TERMPET_DATA").map_or_else(|| PathBuf::from(DEFAULT_DATA_PATH), PathBuf::from);
    let store = JsonFileStore::open(&data_path).with_context(|| format!("opening store {}", data_path.display()))?;

    let username = std::env::var("USER").unwrap_or_default();
    let public_key = std::env::var("TERMPET_PUBLIC_KEY").ok();

    let handle = SessionHandle::new();
    spawn_stdin_reader(handle.clone()).context("spawning stdin reader")?;

    info!("termpet starting, store at {}", data_path.display());
    let summary = run_session(
        SessionRequest {
            public_key: public_key.as_deref(),
            username: &username,
        },
        &handle,
        Arc::new(store),
        config,
        &SystemClock,
        &PlainRenderer,
        &mut StdoutSink { out: std::io::stdout() },
        &mut StdRng::from_entropy(),
    )
    .context("running session")?;
    handle.close();

    info!(
        "Goodbye {} ({:?}, {} background saves)",
        summary.owner, summary.ended_by, summary.background.written
    );
    Ok(())
}
