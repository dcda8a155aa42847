//! Fuzz target: `InputEvent::from_key`
//!
//! Feeds arbitrary key names from the transport into the key parser and
//! asserts that it never panics and only yields printable characters.
//!
//! cargo fuzz run fuzz_input_keys

#![no_main]

use libfuzzer_sys::fuzz_target;
use termpet::app::commands::InputEvent;

fuzz_target!(|data: &[u8]| {
    let Ok(key) = core::str::from_utf8(data) else {
        return;
    };
    if let Some(InputEvent::Char(c)) = InputEvent::from_key(key) {
        assert!(!c.is_control(), "control character leaked through: {c:?}");
        assert_eq!(key.chars().count(), 1);
    }
});
