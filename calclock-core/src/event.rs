//! Provider-neutral event types.
//!
//! Providers convert their API responses into these types; the ticker and
//! render code work exclusively with them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event, reduced to what the display needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub summary: String,
    pub start: EventTime,
}

/// Start of an event: a concrete instant, or a whole day for all-day events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}
