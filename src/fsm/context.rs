//! Shared mutable context threaded through every mode handler.
//!
//! `SessionContext` is the blackboard the handlers read from and write
//! to: the live pet record, configuration, the current time, animation
//! bookkeeping and view preferences. Mode-specific data (cursors, the
//! rename buffer, the guess game) lives in [`Mode`](super::Mode) instead.

use chrono::{DateTime, Duration, Utc};

use crate::config::SessionConfig;
use crate::pet::{Mood, PetRecord};
use crate::stats::Entropy;

use super::MenuItem;

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Which animation the renderer should play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    Idle,
    Happy,
    Sad,
    Hungry,
    Sick,
    Sleeping,
    Dead,
    Eating,
    CakeEating,
    Playing,
}

impl Clip {
    pub fn for_mood(mood: Mood) -> Self {
        match mood {
            Mood::Dead => Self::Dead,
            Mood::Sleeping => Self::Sleeping,
            Mood::Sick => Self::Sick,
            Mood::Hungry => Self::Hungry,
            Mood::Sad => Self::Sad,
            Mood::Happy => Self::Happy,
            Mood::Idle => Self::Idle,
        }
    }

    /// Frames a one-shot clip runs before falling back to the mood clip.
    fn one_shot_frames(self) -> Option<u32> {
        match self {
            Self::Eating | Self::CakeEating => Some(4),
            Self::Playing => Some(6),
            Self::Happy | Self::Sad => Some(8),
            _ => None,
        }
    }

    fn wanders(self) -> bool {
        matches!(self, Self::Idle | Self::Happy)
    }
}

/// Horizontal wander range either side of centre.
pub const WANDER_LIMIT: i8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    pub clip: Clip,
    /// Frames since the clip started.
    pub frame: u32,
    /// Offset from centre, within `-WANDER_LIMIT..=WANDER_LIMIT`.
    pub position: i8,
    direction: i8,
    one_shot_left: u32,
}

impl Animation {
    pub fn new(mood: Mood) -> Self {
        Self {
            clip: Clip::for_mood(mood),
            frame: 0,
            position: 0,
            direction: 1,
            one_shot_left: 0,
        }
    }

    /// Start a one-shot clip: eating, playing, or a happy/sad reaction.
    /// Other clips are ignored.
    pub fn play(&mut self, clip: Clip) {
        if let Some(frames) = clip.one_shot_frames() {
            self.clip = clip;
            self.frame = 0;
            self.one_shot_left = frames;
        }
    }

    /// Advance one frame.
    pub fn advance(&mut self, mood: Mood, rng: &mut impl Entropy) {
        self.frame = self.frame.wrapping_add(1);

        if self.one_shot_left > 0 {
            self.one_shot_left -= 1;
            if self.one_shot_left > 0 {
                return;
            }
        }

        let clip = Clip::for_mood(mood);
        if clip != self.clip {
            self.clip = clip;
            self.frame = 0;
        }

        if !self.clip.wanders() {
            self.position = 0;
            return;
        }
        if self.frame % 3 == 0 {
            if rng.one_in(10) {
                self.direction = -self.direction;
            }
            let next = self.position + self.direction;
            if next.abs() > WANDER_LIMIT {
                self.direction = -self.direction;
            } else {
                self.position = next;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// View preferences
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewPrefs {
    pub width: u16,
    pub height: u16,
    pub show_help: bool,
}

impl Default for ViewPrefs {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
            show_help: false,
        }
    }
}

/// A menu item recently selected, drawn highlighted until it expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub item: MenuItem,
    pub since: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

/// The shared context passed to every mode handler.
pub struct SessionContext {
    pub pet: PetRecord,
    pub config: SessionConfig,
    /// Time of the event being handled.
    pub now: DateTime<Utc>,
    pub anim: Animation,
    pub view: ViewPrefs,
    pub highlight: Option<Highlight>,
}

impl SessionContext {
    pub fn new(pet: PetRecord, config: SessionConfig, now: DateTime<Utc>) -> Self {
        let anim = Animation::new(pet.mood());
        Self {
            pet,
            config,
            now,
            anim,
            view: ViewPrefs::default(),
            highlight: None,
        }
    }

    pub fn weight_floor(&self) -> u16 {
        self.config.weight_floor
    }

    pub fn highlight(&mut self, item: MenuItem) {
        self.highlight = Some(Highlight {
            item,
            since: self.now,
        });
    }

    /// Drop the highlight once it has been visible long enough.
    pub fn expire_highlight(&mut self) {
        let ttl = Duration::milliseconds(i64::from(self.config.highlight_ms));
        if self.highlight.is_some_and(|h| self.now - h.since >= ttl) {
            self.highlight = None;
        }
    }
}
