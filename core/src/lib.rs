//! Hourglass simulation engine.
//!
//! A set of independent countdown glasses sharing one clock. Emptied glasses
//! force an auto-pause until acknowledged; an optional goal stops the whole
//! simulation once reached. The engine is headless: hosts feed clock samples
//! and user intents, observers read snapshots.

pub mod clock;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod flip_log;
pub mod format;
pub mod glass;
pub mod invariants;
pub mod observer;
pub mod rng;
pub mod snapshot;
pub mod soak;
pub mod types;
pub mod validate;

pub use engine::SimEngine;
pub use error::{SimError, SimResult};
