//! Termpet library.
//!
//! A persistent virtual pet per owner, simulated by a pure stat engine
//! and driven by a per-session interaction state machine. The transport,
//! storage and rendering layers plug in through the port traits in
//! [`app::ports`]; the host binary in `main.rs` wires the local terminal
//! adapters together.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod events;
pub mod fsm;
pub mod pet;
pub mod render;
pub mod runtime;
pub mod scheduler;
pub mod stats;

pub mod error;
