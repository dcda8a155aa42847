//! Offline catch-up: one-shot simulation of the owner's absence.
//!
//! Rates are expressed in tenths of a point per hour and scaled by a
//! severity multiplier picked from the elapsed time:
//!
//! ```text
//!   elapsed H      tier   multiplier
//!   H <= 24h        0       100%
//!   24h < H <= 48h  1       120%
//!   48h < H <= 72h  2       150%
//!   72h < H <= 120h 3       200%
//!   H > 120h        4       300%
//! ```
//!
//! All arithmetic is integer over whole elapsed minutes: a rate `r`
//! under multiplier `p` contributes `minutes * r * p / 60_000`.

use chrono::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

use super::Entropy;
use crate::pet::{PetRecord, STAT_MAX};

const MINUTES_PER_HOUR: u64 = 60;

/// One row of the severity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityTier {
    /// The tier applies once elapsed time strictly exceeds this many hours.
    pub after_hours: u32,
    pub multiplier_pct: u32,
}

/// Onset probability for a condition that grows with absence length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnsetCurve {
    /// Absence at which onset becomes certain before escalation.
    pub certain_after_hours: u32,
    /// Past this many hours the probability is scaled by `escalation_pct`.
    pub escalate_after_hours: u32,
    pub escalation_pct: u32,
}

impl OnsetCurve {
    /// Probability in `[0, 1]`; non-decreasing in `hours`.
    pub fn probability(&self, hours: f64) -> f64 {
        if self.certain_after_hours == 0 {
            return 1.0;
        }
        let mut p = hours / f64::from(self.certain_after_hours);
        if hours > f64::from(self.escalate_after_hours) {
            p *= f64::from(self.escalation_pct) / 100.0;
        }
        p.clamp(0.0, 1.0)
    }
}

/// Rates and thresholds for [`apply_offline_catch_up`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchUpTable {
    /// Ascending by `after_hours`; the first row must start at 0.
    pub tiers: [SeverityTier; 5],
    pub hunger_gain_x10: u32,
    pub happiness_loss_x10: u32,
    pub health_baseline_x10: u32,
    /// Excess hunger beyond 100 is divided by this and taken from health.
    pub hunger_overflow_divisor: u32,
    /// Happiness loss beyond 0 is divided by this and taken from health.
    pub pining_divisor: u32,
    pub sick_health_x10: u32,
    /// Applied to both health and happiness while soiled.
    pub soiled_x10: u32,
    pub soil: OnsetCurve,
    pub sickness: OnsetCurve,
    /// Absence that is always fatal.
    pub fatal_after_hours: u32,
}

impl Default for CatchUpTable {
    fn default() -> Self {
        Self {
            tiers: [
                SeverityTier { after_hours: 0, multiplier_pct: 100 },
                SeverityTier { after_hours: 24, multiplier_pct: 120 },
                SeverityTier { after_hours: 48, multiplier_pct: 150 },
                SeverityTier { after_hours: 72, multiplier_pct: 200 },
                SeverityTier { after_hours: 120, multiplier_pct: 300 },
            ],
            hunger_gain_x10: 30,
            happiness_loss_x10: 15,
            health_baseline_x10: 2,
            hunger_overflow_divisor: 3,
            pining_divisor: 4,
            sick_health_x10: 10,
            soiled_x10: 5,
            soil: OnsetCurve {
                certain_after_hours: 48,
                escalate_after_hours: 24,
                escalation_pct: 150,
            },
            sickness: OnsetCurve {
                certain_after_hours: 96,
                escalate_after_hours: 72,
                escalation_pct: 200,
            },
            fatal_after_hours: 168,
        }
    }
}

impl CatchUpTable {
    /// Tier index and multiplier for an absence of `minutes`.
    pub fn tier_for(&self, minutes: u64) -> (usize, u32) {
        let mut picked = (0, self.tiers[0].multiplier_pct);
        for (idx, tier) in self.tiers.iter().enumerate() {
            if minutes > u64::from(tier.after_hours) * MINUTES_PER_HOUR {
                picked = (idx, tier.multiplier_pct);
            }
        }
        picked
    }

    fn scaled(minutes: u64, rate_x10: u32, multiplier_pct: u32) -> u64 {
        minutes * u64::from(rate_x10) * u64::from(multiplier_pct) / (MINUTES_PER_HOUR * 10 * 100)
    }
}

/// What a catch-up did, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatchUpReport {
    pub minutes: u64,
    pub tier: usize,
    pub multiplier_pct: u32,
    pub hunger_gained: u8,
    pub happiness_lost: u8,
    pub health_lost: u8,
    pub became_soiled: bool,
    pub became_sick: bool,
    pub died: bool,
}

/// Simulate `elapsed` of absence. Dead pets and non-positive durations
/// are left untouched.
pub fn apply_offline_catch_up(
    pet: &mut PetRecord,
    elapsed: Duration,
    table: &CatchUpTable,
    weight_floor: u16,
    rng: &mut impl Entropy,
) -> CatchUpReport {
    let minutes = elapsed.num_minutes().max(0) as u64;
    if pet.is_dead() || minutes == 0 {
        return CatchUpReport::default();
    }

    let (tier, pct) = table.tier_for(minutes);
    let before = (pet.hunger, pet.happiness, pet.health);

    let hunger_gain = CatchUpTable::scaled(minutes, table.hunger_gain_x10, pct);
    let happiness_loss = CatchUpTable::scaled(minutes, table.happiness_loss_x10, pct);
    let mut health_loss = CatchUpTable::scaled(minutes, table.health_baseline_x10, pct);

    let raw_hunger = u64::from(pet.hunger) + hunger_gain;
    if raw_hunger > u64::from(STAT_MAX) {
        health_loss += (raw_hunger - u64::from(STAT_MAX)) / u64::from(table.hunger_overflow_divisor.max(1));
        pet.hunger = STAT_MAX;
    } else {
        pet.hunger = raw_hunger as u8;
    }

    let happiness = u64::from(pet.happiness);
    if happiness_loss > happiness {
        health_loss += (happiness_loss - happiness) / u64::from(table.pining_divisor.max(1));
        pet.happiness = 0;
    } else {
        pet.happiness = (happiness - happiness_loss) as u8;
    }

    let hours = minutes as f64 / MINUTES_PER_HOUR as f64;
    let mut report = CatchUpReport {
        minutes,
        tier,
        multiplier_pct: pct,
        ..CatchUpReport::default()
    };
    if !pet.soiled && rng.chance(table.soil.probability(hours)) {
        pet.soiled = true;
        report.became_soiled = true;
    }
    if !pet.sick && rng.chance(table.sickness.probability(hours)) {
        pet.sick = true;
        report.became_sick = true;
    }

    if pet.sick {
        health_loss += CatchUpTable::scaled(minutes, table.sick_health_x10, pct);
    }
    if pet.soiled {
        let penalty = CatchUpTable::scaled(minutes, table.soiled_x10, pct);
        health_loss += penalty;
        pet.happiness = (u64::from(pet.happiness).saturating_sub(penalty)) as u8;
    }

    if minutes >= u64::from(table.fatal_after_hours) * MINUTES_PER_HOUR {
        health_loss = health_loss.max(u64::from(pet.health));
    }
    pet.health = u64::from(pet.health).saturating_sub(health_loss) as u8;
    pet.normalize(weight_floor);

    report.hunger_gained = pet.hunger - before.0;
    report.happiness_lost = before.1 - pet.happiness;
    report.health_lost = before.2 - pet.health;
    report.died = pet.is_dead();
    debug!("catch-up: {:?}", report);
    report
}
