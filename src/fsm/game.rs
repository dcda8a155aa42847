//! Higher-or-lower guessing game played from the Play menu item.
//!
//! The pet holds a number in `1..=9`. Each guess reveals a different
//! number; the owner scores when it lies on the side they called. At the
//! edges only one direction is possible, so 1 + higher and 9 + lower
//! always score.

use chrono::{DateTime, Duration, Utc};

use crate::pet::{PetRecord, raise};
use crate::stats::Entropy;

pub const ROUNDS: u8 = 5;
pub const WINNING_SCORE: u8 = 5;
/// A finished game at or above this score ends on a happy clip.
pub const GOOD_GAME_SCORE: u8 = 3;
/// Happiness bonus per point when the game ends.
pub const BONUS_PER_POINT: u8 = 5;

const LOWEST: u32 = 1;
const HIGHEST: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guess {
    Higher,
    Lower,
}

/// The most recent guess, kept on screen for a short while.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuessResult {
    pub drawn: u8,
    pub correct: bool,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Continue,
    Finished { score: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessGame {
    pub target: u8,
    pub score: u8,
    pub guesses_left: u8,
    pub last: Option<GuessResult>,
}

impl GuessGame {
    pub fn start(rng: &mut impl Entropy) -> Self {
        Self {
            target: rng.pick(LOWEST, HIGHEST) as u8,
            score: 0,
            guesses_left: ROUNDS,
            last: None,
        }
    }

    /// Resolve one guess against `pet`. On the final guess the score
    /// bonus is applied before returning [`GuessOutcome::Finished`].
    pub fn guess(
        &mut self,
        guess: Guess,
        pet: &mut PetRecord,
        now: DateTime<Utc>,
        weight_floor: u16,
        rng: &mut impl Entropy,
    ) -> GuessOutcome {
        let drawn = self.draw_other(rng);
        let correct = match guess {
            Guess::Higher => self.target == LOWEST as u8 || drawn > self.target,
            Guess::Lower => self.target == HIGHEST as u8 || drawn < self.target,
        };

        pet.lose_weight(1, weight_floor);
        if correct {
            self.score += 1;
            raise(&mut pet.happiness, 2);
        } else {
            pet.happiness = pet.happiness.saturating_sub(1);
        }
        pet.last_action_at = now;

        self.guesses_left = self.guesses_left.saturating_sub(1);
        self.last = Some(GuessResult { drawn, correct, at: now });

        if self.guesses_left == 0 || self.score >= WINNING_SCORE {
            raise(&mut pet.happiness, self.score * BONUS_PER_POINT);
            return GuessOutcome::Finished { score: self.score };
        }
        self.target = drawn;
        GuessOutcome::Continue
    }

    /// Hide the last result once `ttl` has passed.
    pub fn expire_result(&mut self, now: DateTime<Utc>, ttl: Duration) {
        if self.last.is_some_and(|r| now - r.at >= ttl) {
            self.last = None;
        }
    }

    /// Uniform over `1..=9` without the current target.
    fn draw_other(&self, rng: &mut impl Entropy) -> u8 {
        let raw = rng.pick(LOWEST, HIGHEST - 1) as u8;
        if raw >= self.target { raw + 1 } else { raw }
    }
}
