//! Teledrive Common Library
//!
//! Shared vocabulary for the teledriving workspace: the typed payloads that
//! travel over the message bus, system-wide constants, TOML configuration
//! loading, and the in-process latest-value topics the control loop polls.
//!
//! # Module Structure
//!
//! - [`messages`] - Vehicle, joystick, actuation and status payloads
//! - [`bus`] - Latest-value topics with heartbeat staleness detection
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Rates, timeouts and fixed display values
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use teledrive_common::prelude::*;
//!
//! let (writer, mut reader) = Topic::<JoystickMessage>::new("testJoystick", 10);
//! writer.publish(JoystickMessage { axes: [0.5, 0.0] }, true);
//! let polled = reader.poll();
//! assert!(polled.updated && polled.alive && polled.valid);
//! ```

pub mod bus;
pub mod config;
pub mod consts;
pub mod messages;
pub mod prelude;
