//! Periodic signal sources for one session.
//!
//! The scheduler notifies a [`SchedulerDelegate`] when schedules fire;
//! the runtime implements the delegate to push events into the session
//! queue. Schedules never touch the pet record.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  clock task (one reactor Timer)              │
//! │                  tick(elapsed_ms) every resolution           │
//! │                                                              │
//! │    ┌───────────┐     ┌───────────┐     ┌────────────┐        │
//! │    │  frame    │     │  logic    │     │  autosave  │        │
//! │    │  500 ms   │     │  1000 ms  │     │  60 s      │        │
//! │    └─────┬─────┘     └─────┬─────┘     └─────┬──────┘        │
//! │          ▼                 ▼                 ▼               │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  │        (runtime pushes into the event queue)           │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use heapless::Vec;
use log::{debug, info, warn};

use crate::app::ports::{SchedulerDelegate, TimerEvent};
use crate::config::SessionConfig;

/// Frame, logic and autosave, plus one spare.
const MAX_SCHEDULES: usize = 4;

/// A periodic signal and its progress towards the next fire.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub label: &'static str,
    pub interval_ms: u32,
    pub event: TimerEvent,
    /// Milliseconds accumulated since the last fire.
    pending_ms: u64,
}

impl Schedule {
    pub fn periodic(label: &'static str, interval_ms: u32, event: TimerEvent) -> Self {
        Self {
            label,
            interval_ms,
            event,
            pending_ms: 0,
        }
    }

    /// Accumulate `elapsed_ms`; `true` when the interval was reached.
    /// Whole intervals beyond the first are dropped.
    fn advance(&mut self, elapsed_ms: u64) -> bool {
        let interval = u64::from(self.interval_ms.max(1));
        self.pending_ms += elapsed_ms;
        if self.pending_ms < interval {
            return false;
        }
        self.pending_ms %= interval;
        true
    }
}

/// Fixed-capacity set of periodic schedules driven by the clock task.
#[derive(Debug, Default)]
pub struct Scheduler {
    schedules: Vec<Schedule, MAX_SCHEDULES>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard frame / logic / autosave set for a session.
    pub fn for_session(config: &SessionConfig) -> Self {
        let mut sched = Self::new();
        for schedule in [
            Schedule::periodic("frame", config.frame_interval_ms, TimerEvent::Frame),
            Schedule::periodic("logic", config.logic_interval_ms, TimerEvent::Logic),
            Schedule::periodic(
                "autosave",
                config.autosave_interval_secs.saturating_mul(1000),
                TimerEvent::Autosave,
            ),
        ] {
            if let Err(dropped) = sched.add(schedule) {
                warn!("Scheduler: no slot for '{}'", dropped.label);
            }
        }
        sched
    }

    /// Add a schedule. Hands it back when every slot is taken.
    pub fn add(&mut self, schedule: Schedule) -> Result<(), Schedule> {
        info!("Scheduler: '{}' every {} ms", schedule.label, schedule.interval_ms);
        self.schedules.push(schedule)
    }

    /// Advance every schedule by `elapsed_ms` and notify `delegate` of
    /// each one that came due. A stalled caller gets one fire per
    /// schedule, not a replay of every missed interval.
    pub fn tick(&mut self, elapsed_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for schedule in &mut self.schedules {
            if schedule.advance(elapsed_ms) {
                debug!("Scheduler: '{}' fired", schedule.label);
                delegate.on_schedule_fired(schedule.label, schedule.event);
            }
        }
    }
}
