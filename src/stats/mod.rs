//! Stat engine: pure rules over a [`PetRecord`](crate::pet::PetRecord).
//!
//! ```text
//!   actions  ── feed / play / medicine / clean / lights
//!   tick     ── per-second decay and recovery while a session is open
//!   offline  ── one-shot catch-up for the time the owner was away
//! ```
//!
//! Nothing here touches storage, transport or wall-clock time; callers
//! pass `now` and an [`Entropy`] source explicitly so every rule is
//! reproducible under test.

pub mod actions;
pub mod offline;
pub mod tick;

pub use actions::{clean, feed, give_medicine, play, toggle_lights};
pub use offline::{CatchUpReport, CatchUpTable, apply_offline_catch_up};
pub use tick::{TickOdds, TickReport, apply_tick};

/// Source of randomness for every probabilistic rule.
///
/// Blanket-implemented for all [`rand::Rng`] types, so sessions pass a
/// `StdRng` while tests can script exact outcomes.
pub trait Entropy {
    /// Uniform integer in `low..=high`.
    fn pick(&mut self, low: u32, high: u32) -> u32;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// `true` with probability `1/n`. `n <= 1` always succeeds.
    fn one_in(&mut self, n: u32) -> bool {
        n <= 1 || self.pick(1, n) == 1
    }

    /// `true` with probability `p`, clamped to `[0, 1]`.
    fn chance(&mut self, p: f64) -> bool {
        if p >= 1.0 {
            true
        } else if p <= 0.0 {
            false
        } else {
            self.unit() < p
        }
    }
}

impl<R: rand::Rng> Entropy for R {
    fn pick(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        self.gen_range(low..=high)
    }

    fn unit(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}
