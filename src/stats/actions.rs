//! Owner actions. Each one stamps `last_action_at` and leaves the record
//! normalised.

use chrono::{DateTime, Utc};

use crate::pet::{FoodKind, PetRecord, lower, raise};

/// Health lost when feeding a pet that is not hungry at all.
pub const OVERFEED_HEALTH_PENALTY: u8 = 2;

/// Feed one serving of `food`.
///
/// A pet at hunger 0 is overfed: it loses health and still gains the
/// food's weight, while hunger stays at 0.
pub fn feed(pet: &mut PetRecord, food: FoodKind, now: DateTime<Utc>) {
    let profile = food.profile();
    if pet.hunger == 0 {
        lower(&mut pet.health, OVERFEED_HEALTH_PENALTY);
    } else {
        lower(&mut pet.hunger, profile.hunger_relief);
        raise(&mut pet.health, profile.health_delta);
    }
    pet.gain_weight(profile.weight_gain);
    pet.last_action_at = now;
}

/// Play with the pet: happier, hungrier, a little lighter.
pub fn play(pet: &mut PetRecord, now: DateTime<Utc>, weight_floor: u16) {
    raise(&mut pet.happiness, 10);
    raise(&mut pet.hunger, 5);
    pet.lose_weight(1, weight_floor);
    pet.last_action_at = now;
}

/// Medicine cures a sick pet; a healthy one only suffers for it.
pub fn give_medicine(pet: &mut PetRecord, now: DateTime<Utc>) {
    if pet.sick {
        pet.sick = false;
        raise(&mut pet.health, 20);
        lower(&mut pet.happiness, 5);
    } else {
        lower(&mut pet.health, 10);
        lower(&mut pet.happiness, 10);
    }
    pet.last_action_at = now;
}

/// Clean up after the pet. No effect unless soiled.
pub fn clean(pet: &mut PetRecord, now: DateTime<Utc>) {
    if pet.soiled {
        pet.soiled = false;
        raise(&mut pet.health, 5);
        raise(&mut pet.happiness, 5);
    }
    pet.last_action_at = now;
}

pub fn toggle_lights(pet: &mut PetRecord, now: DateTime<Utc>) {
    pet.lights_on = !pet.lights_on;
    pet.last_action_at = now;
}
