//! Session service: the hexagonal core of one connected session.
//!
//! [`SessionService`] owns the state machine and the shared context.
//! Storage, persistence and event reporting flow through port traits
//! injected at call sites, so the whole service is testable with mock
//! adapters and a scripted entropy source.
//!
//! ```text
//!  PetRepository ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                    │     SessionService      │
//!       SavePort  ◀──│  Fsm · SessionContext   │ ──▶ SessionView
//!                    └────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::config::SessionConfig;
use crate::events::SessionEvent;
use crate::fsm::context::{Animation, SessionContext};
use crate::fsm::{Directive, Fsm, ModeId};
use crate::pet::{OwnerKey, PetRecord};
use crate::render::SessionView;
use crate::stats::{self, Entropy};

use super::events::AppEvent;
use super::ports::{EventSink, PetRepository, SavePort, StorageError};

/// Load attempts before a session gives up on the repository.
const LOAD_ATTEMPTS: u32 = 2;

/// What the main loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The owner asked to leave.
    Quit,
    /// The transport closed, or the session is already shut down.
    Closed,
}

// ───────────────────────────────────────────────────────────────
// SessionService
// ───────────────────────────────────────────────────────────────

pub struct SessionService {
    fsm: Fsm,
    ctx: SessionContext,
    owner: OwnerKey,
    created: bool,
    /// Set when the stored pet could not be read. The session then runs on
    /// an in-memory pet that must never overwrite the stored one.
    load_error: Option<StorageError>,
    events_handled: u64,
    shut_down: bool,
}

impl SessionService {
    /// Load (or create) the owner's pet and bring it up to date.
    ///
    /// A living pet that already existed gets offline catch-up for the
    /// time since its last visit. If the repository keeps failing the
    /// session still opens, on a fresh pet that only lives in memory and
    /// is never written, so the stored record stays untouched.
    pub fn open(
        owner: OwnerKey,
        display_name: &str,
        repo: &(impl PetRepository + ?Sized),
        config: SessionConfig,
        now: DateTime<Utc>,
        rng: &mut impl Entropy,
        sink: &mut impl EventSink,
    ) -> Self {
        let fresh = PetRecord::newborn(owner.clone(), PetRecord::default_name(display_name), now);
        let mut load_error = None;
        let mut loaded = None;
        for attempt in 1..=LOAD_ATTEMPTS {
            match repo.get_or_create(&owner, fresh.clone()) {
                Ok(found) => {
                    loaded = Some(found);
                    break;
                }
                Err(e) => {
                    warn!(
                        "Loading pet for {} failed (attempt {}/{}): {}",
                        owner, attempt, LOAD_ATTEMPTS, e
                    );
                    load_error = Some(e);
                }
            }
        }
        let (mut pet, created) = match loaded {
            Some(found) => {
                load_error = None;
                found
            }
            None => {
                warn!("Pet for {} unavailable, session will not be saved", owner);
                (fresh, false)
            }
        };
        pet.normalize(config.weight_floor);

        let mut died_offline = false;
        if !created && load_error.is_none() && !pet.is_dead() {
            let elapsed = now - pet.last_visit_at;
            let report = stats::apply_offline_catch_up(
                &mut pet,
                elapsed,
                &config.offline,
                config.weight_floor,
                rng,
            );
            if report.minutes > 0 {
                info!(
                    "Caught up {} min for {} (tier {}, {}%): hunger +{}, happiness -{}, health -{}",
                    report.minutes,
                    owner,
                    report.tier,
                    report.multiplier_pct,
                    report.hunger_gained,
                    report.happiness_lost,
                    report.health_lost
                );
                sink.emit(&AppEvent::CaughtUp {
                    minutes: report.minutes,
                    tier: report.tier,
                });
            }
            died_offline = report.died;
        }
        pet.last_visit_at = now;

        let fsm = Fsm::new(pet.is_dead());
        let ctx = SessionContext::new(pet, config, now);
        sink.emit(&AppEvent::Started {
            owner: owner.clone(),
            mode: fsm.mode_id(),
            created,
        });
        if died_offline {
            sink.emit(&AppEvent::PetDied);
        }
        info!(
            "Session opened for {} ({}) in {}",
            owner,
            if created { "new pet" } else { "returning" },
            fsm.mode_id().name()
        );

        Self {
            fsm,
            ctx,
            owner,
            created,
            load_error,
            events_handled: 0,
            shut_down: false,
        }
    }

    // ── Event handling ────────────────────────────────────────

    /// Process one queued event. Every mutation of the pet record
    /// happens inside this call.
    pub fn handle(
        &mut self,
        event: SessionEvent,
        now: DateTime<Utc>,
        rng: &mut impl Entropy,
        saver: &mut impl SavePort,
        sink: &mut impl EventSink,
    ) -> Flow {
        if self.shut_down {
            return Flow::Closed;
        }
        self.events_handled += 1;
        self.ctx.now = now;
        let before = self.fsm.mode_id();
        let was_dead = self.ctx.pet.is_dead();

        let flow = match event {
            SessionEvent::Input(input) => match self.fsm.handle_input(input, &mut self.ctx, rng) {
                Directive::None => Flow::Continue,
                Directive::Quit => Flow::Quit,
                Directive::Restart => {
                    self.restart(saver, sink);
                    Flow::Continue
                }
            },
            SessionEvent::LogicTick => {
                self.fsm.on_logic_tick(&mut self.ctx, rng);
                Flow::Continue
            }
            SessionEvent::Frame => {
                self.fsm.on_frame(&mut self.ctx, rng);
                Flow::Continue
            }
            SessionEvent::Autosave => {
                self.persist(saver, sink);
                Flow::Continue
            }
            SessionEvent::TransportClosed => Flow::Closed,
        };

        if !was_dead && self.ctx.pet.is_dead() {
            info!("{}'s pet {} died", self.owner, self.ctx.pet.name);
            sink.emit(&AppEvent::PetDied);
        }
        let after = self.fsm.mode_id();
        if after != before {
            sink.emit(&AppEvent::StateChanged {
                from: before,
                to: after,
            });
        }
        flow
    }

    /// Hand the current record to the save port. Failures are reported,
    /// never fatal; the next autosave or the shutdown save retries.
    pub fn persist(&mut self, saver: &mut impl SavePort, sink: &mut impl EventSink) -> bool {
        self.ctx.pet.last_visit_at = self.ctx.now;
        if let Some(e) = self.load_error {
            sink.emit(&AppEvent::SaveFailed(e));
            return false;
        }
        match saver.save(&self.ctx.pet) {
            Ok(()) => {
                sink.emit(&AppEvent::Saved);
                true
            }
            Err(e) => {
                warn!("Save for {} failed: {}", self.owner, e);
                sink.emit(&AppEvent::SaveFailed(e));
                false
            }
        }
    }

    /// Final synchronous save. Only the first call writes; later calls
    /// return `false`.
    pub fn shutdown(
        &mut self,
        repo: &(impl PetRepository + ?Sized),
        now: DateTime<Utc>,
        sink: &mut impl EventSink,
    ) -> bool {
        if self.shut_down {
            return false;
        }
        self.shut_down = true;
        self.ctx.now = now;
        self.ctx.pet.last_visit_at = now;
        let saved = match self.load_error {
            Some(e) => Err(e),
            None => repo.update(&self.ctx.pet),
        };
        match saved {
            Ok(()) => info!(
                "Session for {} ended after {} events, pet saved",
                self.owner, self.events_handled
            ),
            Err(e) => {
                warn!("Final save for {} failed: {}", self.owner, e);
                sink.emit(&AppEvent::SaveFailed(e));
            }
        }
        sink.emit(&AppEvent::SessionEnded);
        true
    }

    // ── Queries ───────────────────────────────────────────────

    /// Snapshot for the renderer.
    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            pet: &self.ctx.pet,
            mode: self.fsm.mode(),
            anim: &self.ctx.anim,
            view: self.ctx.view,
            highlight: self.ctx.highlight,
            now: self.ctx.now,
        }
    }

    pub fn pet(&self) -> &PetRecord {
        &self.ctx.pet
    }

    pub fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    pub fn mode_id(&self) -> ModeId {
        self.fsm.mode_id()
    }

    /// `true` when this session created the owner's pet.
    pub fn created(&self) -> bool {
        self.created
    }

    /// `false` when the stored pet could not be loaded and this session
    /// will not write it back.
    pub fn can_save(&self) -> bool {
        self.load_error.is_none()
    }

    // ── Internal ──────────────────────────────────────────────

    /// Replace the dead pet with a newborn of the same owner and name.
    fn restart(&mut self, saver: &mut impl SavePort, sink: &mut impl EventSink) {
        let old = &self.ctx.pet;
        let mut pet = PetRecord::newborn(self.owner.clone(), old.name.clone(), self.ctx.now);
        pet.id = old.id;
        pet.normalize(self.ctx.weight_floor());

        self.ctx.anim = Animation::new(pet.mood());
        self.ctx.highlight = None;
        self.ctx.pet = pet;
        self.fsm.reset();

        info!("{} restarted with a new pet", self.owner);
        sink.emit(&AppEvent::Restarted);
        self.persist(saver, sink);
    }
}
