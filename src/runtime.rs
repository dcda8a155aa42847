//! Per-session runtime: wires the transport, timers, persistence and
//! service together and guarantees one final save.
//!
//! Runs on the calling thread using `edge-executor` for cooperative
//! scheduling and `async-io-mini` for reactor-driven timers. Two
//! background tasks plus the main loop:
//!
//! 1. **Clock**: one reactor timer at `clock_resolution_ms` drives the
//!    [`Scheduler`]; due schedules become queue events.
//! 2. **Teardown**: waits on the transport's closed signal, then
//!    enqueues [`SessionEvent::TransportClosed`].
//! 3. **Main loop**: drains the queue serially into the service and
//!    renders after input, logic and frame events.
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────────┐
//!  │  Session thread                                            │
//!  │  ┌──────────────────────────────────────────────────────┐  │
//!  │  │  futures_lite::block_on (reactor timers + futures)   │  │
//!  │  │  ┌──────────────────────────────────────────────────┐│  │
//!  │  │  │  edge_executor::LocalExecutor                    ││  │
//!  │  │  │                                                  ││  │
//!  │  │  │  ┌─────────┐  ┌──────────┐  ┌────────────────┐   ││  │
//!  │  │  │  │ Clock   │  │ Teardown │  │ Main loop      │   ││  │
//!  │  │  │  │ 250ms ⏱ │  │ on close │  │ queue.receive  │   ││  │
//!  │  │  │  └─────────┘  └──────────┘  └────────────────┘   ││  │
//!  │  │  └──────────────────────────────────────────────────┘│  │
//!  │  └──────────────────────────────────────────────────────┘  │
//!  │  save-<owner> thread: PersistenceWorker                    │
//!  └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Whatever ends the session (quit, transport close, lost output or a
//! panic unwinding through the loop), the same idempotent finish path
//! stops the timers, drains the writer thread and performs exactly one
//! synchronous save.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::{info, warn};

use crate::adapters::identity::resolve_owner;
use crate::adapters::log_sink::LogEventSink;
use crate::adapters::save_queue::{PersistenceWorker, QueuedSaver, WorkerStats};
use crate::app::commands::InputEvent;
use crate::app::ports::{Clock, OutputSink, PetRepository, Renderer, SchedulerDelegate, TimerEvent};
use crate::app::service::{Flow, SessionService};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::events::{EventQueue, SessionEvent, push_event};
use crate::pet::OwnerKey;
use crate::scheduler::Scheduler;
use crate::stats::Entropy;

// ── Transport handle ─────────────────────────────────────────

type CloseSignal = Signal<CriticalSectionRawMutex, ()>;

/// The transport's side of a session: feed input, signal close.
/// Cheap to clone and safe to use from any thread.
#[derive(Clone)]
pub struct SessionHandle {
    queue: Arc<EventQueue>,
    closed: Arc<CloseSignal>,
    closed_flag: Arc<AtomicBool>,
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionHandle {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(EventQueue::new()),
            closed: Arc::new(Signal::new()),
            closed_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Queue one input event. Returns `false` when it was dropped
    /// (queue full or session closed).
    pub fn send_input(&self, input: InputEvent) -> bool {
        !self.is_closed() && push_event(&self.queue, SessionEvent::Input(input))
    }

    /// Signal that the transport is gone. Idempotent.
    pub fn close(&self) {
        if !self.closed_flag.swap(true, Ordering::AcqRel) {
            self.closed.signal(());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed_flag.load(Ordering::Acquire)
    }
}

/// Connection details supplied by the transport.
#[derive(Debug, Clone, Copy)]
pub struct SessionRequest<'a> {
    pub public_key: Option<&'a str>,
    pub username: &'a str,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub owner: OwnerKey,
    pub ended_by: Flow,
    /// The final synchronous save was performed by the normal path.
    pub final_save: bool,
    /// `false` when the stored pet could not be loaded, so nothing was
    /// written for this owner.
    pub storage_ok: bool,
    /// Saves written in the background during the session.
    pub background: WorkerStats,
}

// ── Scheduler → queue bridge ─────────────────────────────────

struct QueueDelegate<'q> {
    queue: &'q EventQueue,
}

impl SchedulerDelegate for QueueDelegate<'_> {
    fn on_schedule_fired(&mut self, _label: &str, event: TimerEvent) {
        push_event(self.queue, event.into());
    }
}

// ── Live session (drop guard) ────────────────────────────────

struct LiveSession<'c, C: Clock + ?Sized> {
    service: SessionService,
    worker: PersistenceWorker,
    saver: QueuedSaver,
    repo: Arc<dyn PetRepository>,
    clock: &'c C,
    sink: LogEventSink,
}

impl<C: Clock + ?Sized> LiveSession<'_, C> {
    /// Stop background work, then save once. Returns `false` if the
    /// session was already finished.
    fn finish(&mut self) -> bool {
        self.worker.stop();
        self.service
            .shutdown(self.repo.as_ref(), self.clock.now(), &mut self.sink)
    }
}

impl<C: Clock + ?Sized> Drop for LiveSession<'_, C> {
    fn drop(&mut self) {
        if self.finish() {
            warn!(
                "Session for {} ended abnormally, saved from drop guard",
                self.service.owner()
            );
        }
    }
}

// ── Entry point ──────────────────────────────────────────────

/// Run one session to completion on the calling thread.
#[allow(clippy::too_many_arguments)]
pub fn run_session<C: Clock + ?Sized>(
    request: SessionRequest<'_>,
    handle: &SessionHandle,
    repo: Arc<dyn PetRepository>,
    config: SessionConfig,
    clock: &C,
    renderer: &impl Renderer,
    output: &mut impl OutputSink,
    rng: &mut impl Entropy,
) -> Result<SessionSummary> {
    config.validate()?;
    let owner = resolve_owner(request.public_key, request.username);
    let mut sink = LogEventSink::new(owner.clone());
    let resolution = Duration::from_millis(u64::from(config.clock_resolution_ms));
    let scheduler = Scheduler::for_session(&config);

    let service = SessionService::open(
        owner.clone(),
        request.username,
        repo.as_ref(),
        config,
        clock.now(),
        rng,
        &mut sink,
    );
    let worker = match PersistenceWorker::spawn(Arc::clone(&repo), owner.as_str()) {
        Ok(worker) => worker,
        Err(e) => {
            warn!("Could not start persistence worker: {}", e);
            return Err(Error::Session("persistence worker failed to start"));
        }
    };
    let saver = worker.saver();
    let storage_ok = service.can_save();
    if !storage_ok {
        warn!("Session for {} runs on an unsaved pet", owner);
    }
    let mut live = LiveSession {
        service,
        worker,
        saver,
        repo,
        clock,
        sink,
    };

    let executor: edge_executor::LocalExecutor<'_, 4> = edge_executor::LocalExecutor::new();
    let clock_task = executor.spawn(clock_loop(Arc::clone(&handle.queue), scheduler, resolution));
    let teardown_task = executor.spawn(teardown(Arc::clone(&handle.queue), Arc::clone(&handle.closed)));

    info!("Session for {} running", owner);
    let ended_by = futures_lite::future::block_on(executor.run(async {
        let flow = main_loop(&mut live, &handle.queue, renderer, output, rng).await;
        clock_task.cancel().await;
        teardown_task.cancel().await;
        flow
    }));

    let background = live.worker.stop();
    let final_save = live.finish();
    info!("Session for {} ended: {:?}", owner, ended_by);
    Ok(SessionSummary {
        owner,
        ended_by,
        final_save,
        storage_ok,
        background,
    })
}

// ── Tasks ────────────────────────────────────────────────────

async fn clock_loop(queue: Arc<EventQueue>, mut scheduler: Scheduler, resolution: Duration) {
    let mut last = Instant::now();
    loop {
        async_io_mini::Timer::after(resolution).await;
        let now = Instant::now();
        let elapsed = u64::try_from(now.duration_since(last).as_millis()).unwrap_or(u64::MAX);
        last = now;
        scheduler.tick(elapsed, &mut QueueDelegate { queue: &queue });
    }
}

async fn teardown(queue: Arc<EventQueue>, closed: Arc<CloseSignal>) {
    closed.wait().await;
    info!("Transport closed");
    queue.send(SessionEvent::TransportClosed).await;
}

async fn main_loop<C: Clock + ?Sized>(
    live: &mut LiveSession<'_, C>,
    queue: &EventQueue,
    renderer: &impl Renderer,
    output: &mut impl OutputSink,
    rng: &mut impl Entropy,
) -> Flow {
    if let Err(e) = output.write_frame(&renderer.render(&live.service.view())) {
        warn!("Output lost before first frame: {}", e);
        return Flow::Closed;
    }
    loop {
        let event = queue.receive().await;
        let now = live.clock.now();
        let flow = live
            .service
            .handle(event, now, rng, &mut live.saver, &mut live.sink);
        if flow != Flow::Continue {
            return flow;
        }
        if matches!(
            event,
            SessionEvent::Input(_) | SessionEvent::LogicTick | SessionEvent::Frame
        ) {
            let frame = renderer.render(&live.service.view());
            if let Err(e) = output.write_frame(&frame) {
                warn!("Output lost: {}", e);
                return Flow::Closed;
            }
        }
    }
}
