//! Core types for calclock.
//!
//! This crate provides the pieces of the clock that need no I/O:
//! - `Event` and `EventTime` for calendar entries
//! - `ticker` for building the scrolling display line
//! - `marquee` for the scroll position state machine

pub mod error;
pub mod event;
pub mod marquee;
pub mod ticker;

pub use error::{ClockError, ClockResult};
pub use event::{Event, EventTime};
