//! Per-interval stat drift while a session is open.
//!
//! Every rule is a "1 in N" roll evaluated in a fixed order, so a given
//! entropy stream always produces the same record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Entropy;
use crate::pet::{LifeStage, PetRecord, STAT_MAX, lower, raise};

/// "1 in N" odds and thresholds for one logic tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickOdds {
    // -- Awake --
    pub hunger_gain: u32,
    /// Hunger above which the pet starves.
    pub starving_above: u8,
    pub starving_health_loss: u32,
    pub happiness_loss: u32,
    /// Hunger below which a healthy pet recovers one health point.
    pub recovery_below_hunger: u8,
    pub baseline_health_loss: u32,
    pub heavy_weight: u16,
    pub heavy_health_loss: u32,
    pub obese_weight: u16,
    pub obese_health_loss: u32,
    pub sickness_onset: u32,
    /// Hunger above which the pet slowly loses weight.
    pub thinning_above: u8,
    pub weight_loss: u32,
    pub sick_health_loss: u32,
    pub soil_base: u32,
    pub soil_child: u32,
    pub soil_baby: u32,
    /// Hunger below which soiling odds double.
    pub recently_fed_below: u8,
    pub soiled_penalty: u32,

    // -- Asleep --
    pub sleep_health_gain: u32,
    pub sleep_happiness_gain: u32,
    pub sleep_hunger_gain: u32,
}

impl Default for TickOdds {
    fn default() -> Self {
        Self {
            hunger_gain: 5,
            starving_above: 90,
            starving_health_loss: 1,
            happiness_loss: 2,
            recovery_below_hunger: 80,
            baseline_health_loss: 180,
            heavy_weight: 75,
            heavy_health_loss: 120,
            obese_weight: 100,
            obese_health_loss: 60,
            sickness_onset: 3600,
            thinning_above: 50,
            weight_loss: 300,
            sick_health_loss: 20,
            soil_base: 1800,
            soil_child: 900,
            soil_baby: 300,
            recently_fed_below: 30,
            soiled_penalty: 30,

            sleep_health_gain: 3,
            sleep_happiness_gain: 5,
            sleep_hunger_gain: 10,
        }
    }
}

impl TickOdds {
    /// Soiling odds for the pet's stage and hunger.
    fn soil_odds(&self, stage: LifeStage, hunger: u8) -> u32 {
        let base = match stage {
            LifeStage::Baby => self.soil_baby,
            LifeStage::Child => self.soil_child,
            _ => self.soil_base,
        };
        if hunger < self.recently_fed_below {
            (base / 2).max(1)
        } else {
            base
        }
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Health crossed zero on this tick.
    pub died: bool,
    pub became_sick: bool,
    pub became_soiled: bool,
}

/// Apply one logic interval. A dead pet is left untouched.
pub fn apply_tick(
    pet: &mut PetRecord,
    now: DateTime<Utc>,
    odds: &TickOdds,
    weight_floor: u16,
    rng: &mut impl Entropy,
) -> TickReport {
    let mut report = TickReport::default();
    if pet.is_dead() {
        return report;
    }

    if pet.is_asleep() {
        if rng.one_in(odds.sleep_health_gain) {
            raise(&mut pet.health, 1);
        }
        if rng.one_in(odds.sleep_happiness_gain) {
            raise(&mut pet.happiness, 1);
        }
        if rng.one_in(odds.sleep_hunger_gain) {
            raise(&mut pet.hunger, 1);
        }
        pet.normalize(weight_floor);
        return report;
    }

    if pet.hunger < STAT_MAX && rng.one_in(odds.hunger_gain) {
        raise(&mut pet.hunger, 1);
    }
    if pet.hunger > odds.starving_above && rng.one_in(odds.starving_health_loss) {
        lower(&mut pet.health, 1);
    }
    if rng.one_in(odds.happiness_loss) {
        lower(&mut pet.happiness, 1);
    }
    if pet.hunger < odds.recovery_below_hunger && pet.health < STAT_MAX && !pet.sick {
        raise(&mut pet.health, 1);
    }
    if rng.one_in(odds.baseline_health_loss) {
        lower(&mut pet.health, 1);
    }

    if pet.weight > odds.obese_weight {
        if rng.one_in(odds.obese_health_loss) {
            lower(&mut pet.health, 1);
        }
    } else if pet.weight > odds.heavy_weight && rng.one_in(odds.heavy_health_loss) {
        lower(&mut pet.health, 1);
    }

    if !pet.sick && !pet.is_dead() && rng.one_in(odds.sickness_onset) {
        pet.sick = true;
        report.became_sick = true;
    }
    if pet.hunger > odds.thinning_above && rng.one_in(odds.weight_loss) {
        pet.lose_weight(1, weight_floor);
    }
    if pet.sick && rng.one_in(odds.sick_health_loss) {
        lower(&mut pet.health, 1);
    }

    if !pet.soiled && rng.one_in(odds.soil_odds(pet.life_stage(now), pet.hunger)) {
        pet.soiled = true;
        report.became_soiled = true;
    }
    if pet.soiled && rng.one_in(odds.soiled_penalty) {
        lower(&mut pet.health, 1);
        lower(&mut pet.happiness, 1);
    }

    pet.normalize(weight_floor);
    report.died = pet.is_dead();
    report
}
