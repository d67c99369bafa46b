//! # Teledrive Control Library
//!
//! Converts a remote operator's joystick axes into vehicle actuation
//! requests at a fixed 100 Hz, while guarding three safety conditions:
//!
//! 1. **Link loss**: the joystick going quiet starts a bounded graceful
//!    stop (−1.0 m/s² for 2 s, then one −3.0 m/s² hard-stop tick).
//! 2. **Local override**: brake or gas pressed in the vehicle revokes
//!    remote authority until a cruise button is pressed.
//! 3. **Re-engagement**: the cruise button only re-engages while the
//!    joystick is live.
//!
//! ## Tick Pipeline
//!
//! ```text
//! ingest ─► liveness ─► engagement ─► command ─► status ─► publish
//! ```
//!
//! [`engagement::EngagementMachine`] owns the only state that survives a
//! tick. Everything downstream of it is a pure function of that state and
//! the tick's inputs.

pub mod command;
pub mod config;
pub mod cycle;
pub mod engagement;
pub mod error;
pub mod ingest;
pub mod liveness;
pub mod status;
