//! Fuzz target: stored pet record decoding
//!
//! Decodes arbitrary bytes as a postcard blob (memory store) and as JSON
//! (file store). Whatever decodes must come out of `normalize` with every
//! stat in range.
//!
//! cargo fuzz run fuzz_record_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use termpet::pet::{PetRecord, STAT_MAX};

fn check(mut pet: PetRecord) {
    pet.normalize(1);
    assert!(pet.hunger <= STAT_MAX);
    assert!(pet.happiness <= STAT_MAX);
    assert!(pet.health <= STAT_MAX);
    assert!(pet.weight >= 1);
    let _ = pet.life_stage(pet.last_visit_at);
    let _ = pet.mood();
}

fuzz_target!(|data: &[u8]| {
    if let Ok(pet) = postcard::from_bytes::<PetRecord>(data) {
        check(pet);
    }
    if let Ok(pet) = serde_json::from_slice::<PetRecord>(data) {
        check(pet);
    }
});
