//! Pet record: the persisted entity every session revolves around.
//!
//! One record per owner. The three percentage stats live in `0..=100`,
//! weight never drops below the configured floor, and the pet is dead
//! exactly when health reaches zero. Age and life stage are derived from
//! the birth timestamp; they are never stored.

pub mod food;

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub use food::{FoodKind, FoodProfile};

/// Upper bound of hunger, happiness and health.
pub const STAT_MAX: u8 = 100;

/// Weight of a freshly created pet.
pub const NEWBORN_WEIGHT: u16 = 1;

/// Happiness of a freshly created pet.
pub const NEWBORN_HAPPINESS: u8 = 80;

/// Real days per pet-year.
pub const DAYS_PER_PET_YEAR: i64 = 15;

// ───────────────────────────────────────────────────────────────
// Owner identity
// ───────────────────────────────────────────────────────────────

/// Stable per-owner identity supplied by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerKey(String);

impl OwnerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Derived views
// ───────────────────────────────────────────────────────────────

/// Age bucket, a monotonic step function of pet-years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifeStage {
    Baby,
    Child,
    Teen,
    Adult,
    Senior,
}

impl LifeStage {
    /// Stage for an age expressed in whole pet-years.
    pub fn from_pet_years(years: i64) -> Self {
        match years {
            ..1 => Self::Baby,
            1..3 => Self::Child,
            3..6 => Self::Teen,
            6..12 => Self::Adult,
            _ => Self::Senior,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Baby => "Baby",
            Self::Child => "Child",
            Self::Teen => "Teen",
            Self::Adult => "Adult",
            Self::Senior => "Senior",
        }
    }
}

/// Dominant condition, used to pick the idle animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Dead,
    Sleeping,
    Sick,
    Hungry,
    Sad,
    Happy,
    Idle,
}

// ───────────────────────────────────────────────────────────────
// PetRecord
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRecord {
    /// Store-assigned id; `None` until the record is first created.
    pub id: Option<u64>,
    pub owner: OwnerKey,
    pub name: String,
    pub born_at: DateTime<Utc>,
    pub hunger: u8,
    pub happiness: u8,
    pub health: u8,
    pub weight: u16,
    pub sick: bool,
    pub soiled: bool,
    pub lights_on: bool,
    pub last_action_at: DateTime<Utc>,
    /// When the owner was last seen; offline catch-up measures from here.
    pub last_visit_at: DateTime<Utc>,
}

impl PetRecord {
    /// A brand-new pet with default stats, born at `now`.
    pub fn newborn(owner: OwnerKey, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: None,
            owner,
            name: name.into(),
            born_at: now,
            hunger: 0,
            happiness: NEWBORN_HAPPINESS,
            health: STAT_MAX,
            weight: NEWBORN_WEIGHT,
            sick: false,
            soiled: false,
            lights_on: true,
            last_action_at: now,
            last_visit_at: now,
        }
    }

    /// Default pet name for a transport username.
    pub fn default_name(username: &str) -> String {
        format!("{username}'s pet")
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn is_asleep(&self) -> bool {
        !self.lights_on
    }

    /// Real time since birth, never negative.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.born_at).max(Duration::zero())
    }

    pub fn pet_years(&self, now: DateTime<Utc>) -> i64 {
        self.age(now).num_hours() / 24 / DAYS_PER_PET_YEAR
    }

    pub fn life_stage(&self, now: DateTime<Utc>) -> LifeStage {
        LifeStage::from_pet_years(self.pet_years(now))
    }

    pub fn mood(&self) -> Mood {
        if self.is_dead() {
            Mood::Dead
        } else if self.is_asleep() {
            Mood::Sleeping
        } else if self.sick || self.health < 50 {
            Mood::Sick
        } else if self.hunger > 70 {
            Mood::Hungry
        } else if self.happiness < 30 {
            Mood::Sad
        } else if self.happiness >= 80 {
            Mood::Happy
        } else {
            Mood::Idle
        }
    }

    /// Pull every stat back into its valid range.
    pub fn normalize(&mut self, weight_floor: u16) {
        self.hunger = self.hunger.min(STAT_MAX);
        self.happiness = self.happiness.min(STAT_MAX);
        self.health = self.health.min(STAT_MAX);
        self.weight = self.weight.max(weight_floor);
    }

    /// Reduce weight without crossing `floor`.
    pub fn lose_weight(&mut self, amount: u16, floor: u16) {
        self.weight = self.weight.saturating_sub(amount).max(floor);
    }

    pub fn gain_weight(&mut self, amount: u16) {
        self.weight = self.weight.saturating_add(amount);
    }
}

/// Raise a percentage stat, capped at [`STAT_MAX`].
pub fn raise(stat: &mut u8, amount: u8) {
    *stat = stat.saturating_add(amount).min(STAT_MAX);
}

/// Lower a percentage stat, floored at zero.
pub fn lower(stat: &mut u8, amount: u8) {
    *stat = stat.saturating_sub(amount);
}
