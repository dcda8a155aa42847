//! Per-session event queue.
//!
//! Events are produced by:
//! - the transport (keystrokes, window resizes, disconnect)
//! - the clock task (frame, logic and autosave schedules)
//! - the teardown task (transport closed signal)
//!
//! and consumed one at a time by the session main loop, which is the
//! only place the pet record is mutated.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Transport   │────▶│              │     │              │
//! │ Clock task  │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Teardown    │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::debug;

use crate::app::commands::InputEvent;
use crate::app::ports::TimerEvent;

/// Maximum number of pending events per session.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Everything the session main loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Keystroke or window change from the transport.
    Input(InputEvent),
    /// Animation frame timer fired.
    Frame,
    /// Stat tick timer fired.
    LogicTick,
    /// Periodic save timer fired.
    Autosave,
    /// The transport went away; the session must end.
    TransportClosed,
}

impl From<TimerEvent> for SessionEvent {
    fn from(event: TimerEvent) -> Self {
        match event {
            TimerEvent::Frame => Self::Frame,
            TimerEvent::Logic => Self::LogicTick,
            TimerEvent::Autosave => Self::Autosave,
        }
    }
}

impl From<InputEvent> for SessionEvent {
    fn from(input: InputEvent) -> Self {
        Self::Input(input)
    }
}

/// Bounded multi-producer queue feeding one session's main loop.
pub type EventQueue = Channel<CriticalSectionRawMutex, SessionEvent, EVENT_QUEUE_CAP>;

/// Push without blocking. Returns `false` if the queue is full (event dropped).
pub fn push_event(queue: &EventQueue, event: SessionEvent) -> bool {
    match queue.try_send(event) {
        Ok(()) => true,
        Err(_) => {
            debug!("Event queue full, dropped {:?}", event);
            false
        }
    }
}
