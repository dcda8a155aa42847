//! Application core: pure domain orchestration, zero I/O.
//!
//! Input decoding, outbound events, the session service and the port
//! traits it is written against. All interaction with storage, clocks
//! and terminals happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without a real transport.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
