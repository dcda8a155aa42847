//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade, tagged with the session owner. A metrics
//! or audit adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::pet::OwnerKey;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink {
    owner: OwnerKey,
}

impl LogEventSink {
    pub fn new(owner: OwnerKey) -> Self {
        Self { owner }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let who = &self.owner;
        match event {
            AppEvent::Started { owner, mode, created } => {
                info!("START | owner={} mode={} created={}", owner, mode.name(), created);
            }
            AppEvent::CaughtUp { minutes, tier } => {
                info!("CATCHUP | owner={} minutes={} tier={}", who, minutes, tier);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | owner={} {} -> {}", who, from.name(), to.name());
            }
            AppEvent::PetDied => info!("DEATH | owner={}", who),
            AppEvent::Restarted => info!("RESTART | owner={}", who),
            AppEvent::Saved => log::debug!("SAVE | owner={} queued", who),
            AppEvent::SaveFailed(e) => warn!("SAVE | owner={} failed: {}", who, e),
            AppEvent::SessionEnded => info!("END | owner={}", who),
        }
    }
}
