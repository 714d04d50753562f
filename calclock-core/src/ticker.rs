//! Builds the scrolling ticker line from a day's events.
//!
//! Events arrive in chronological order (the calendar API sorts them) and
//! the line preserves that order. Each entry is a time label plus the event
//! summary, joined with `" | "`.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::event::{Event, EventTime};

/// Separator between ticker entries.
const SEPARATOR: &str = " | ";

/// Time label for date-only (all-day) events.
pub const ALL_DAY_LABEL: &str = "All day";

/// Fallback line when the whole-day policy has nothing to show.
pub const NO_EVENTS_TODAY: &str = "No events today";

/// Fallback line when the active-only policy has nothing to show.
pub const NO_CURRENT_EVENTS: &str = "No current events";

/// Which of today's events make it into the ticker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventPolicy {
    /// Every remaining event of the day.
    #[default]
    WholeDay,
    /// Only events whose validity window has not yet elapsed.
    Active,
}

/// One published ticker state. Replaced wholesale on every successful fetch.
#[derive(Debug, Clone, Default)]
pub struct TickerSnapshot {
    /// Bumped on every publish so the render loop can reset the marquee.
    pub generation: u64,
    pub line: String,
}

/// How long an event counts as active after its start.
pub fn active_window() -> Duration {
    Duration::hours(1)
}

/// Format the time column for a ticker entry.
///
/// Date-only starts have no clock time to show; they get a fixed label
/// instead of a slice of the date.
pub fn time_label(start: &EventTime) -> String {
    match start {
        EventTime::DateTime(dt) => dt.format("%H:%M").to_string(),
        EventTime::Date(_) => ALL_DAY_LABEL.to_string(),
    }
}

/// Whether an event still counts as active at `now`.
///
/// An event is active until one hour past its start; one whose window ends
/// exactly at `now` is still active. All-day events are active all day.
pub fn is_active(event: &Event, now: DateTime<Utc>) -> bool {
    match event.start {
        EventTime::DateTime(start) => start + active_window() >= now,
        EventTime::Date(_) => true,
    }
}

/// Keep the events still worth showing under the active-only policy.
pub fn active_events(events: &[Event], now: DateTime<Utc>) -> Vec<&Event> {
    events.iter().filter(|e| is_active(e, now)).collect()
}

/// Join events into the marquee line, preserving their input order.
///
/// Returns the policy's fallback message when nothing qualifies.
pub fn ticker_line(events: &[Event], policy: EventPolicy, now: DateTime<Utc>) -> String {
    let entries: Vec<String> = match policy {
        EventPolicy::WholeDay => events.iter().map(entry).collect(),
        EventPolicy::Active => active_events(events, now).into_iter().map(entry).collect(),
    };

    if entries.is_empty() {
        return match policy {
            EventPolicy::WholeDay => NO_EVENTS_TODAY.to_string(),
            EventPolicy::Active => NO_CURRENT_EVENTS.to_string(),
        };
    }

    entries.join(SEPARATOR)
}

fn entry(event: &Event) -> String {
    format!("{} {}", time_label(&event.start), event.summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn timed(h: u32, m: u32, summary: &str) -> Event {
        Event {
            summary: summary.to_string(),
            start: EventTime::DateTime(Utc.with_ymd_and_hms(2025, 3, 20, h, m, 0).unwrap()),
        }
    }

    fn all_day(summary: &str) -> Event {
        Event {
            summary: summary.to_string(),
            start: EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()),
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 20, h, m, 0).unwrap()
    }

    #[test]
    fn test_line_preserves_order_with_pipe_separator() {
        let events = vec![timed(9, 0, "Standup"), timed(14, 0, "Review")];
        assert_eq!(
            ticker_line(&events, EventPolicy::WholeDay, at(8, 0)),
            "09:00 Standup | 14:00 Review"
        );
    }

    #[test]
    fn test_all_day_event_uses_sentinel_label() {
        let events = vec![all_day("Conference")];
        assert_eq!(
            ticker_line(&events, EventPolicy::WholeDay, at(8, 0)),
            "All day Conference"
        );
    }

    #[test]
    fn test_active_policy_drops_expired_events() {
        // Standup's window expired at 10:00, so at 10:30 only Review remains.
        let events = vec![timed(9, 0, "Standup"), timed(14, 0, "Review")];
        assert_eq!(
            ticker_line(&events, EventPolicy::Active, at(10, 30)),
            "14:00 Review"
        );
        assert_eq!(
            ticker_line(&events, EventPolicy::WholeDay, at(10, 30)),
            "09:00 Standup | 14:00 Review"
        );
    }

    #[test]
    fn test_event_ending_exactly_now_is_still_active() {
        let event = timed(9, 0, "Standup");
        assert!(is_active(&event, at(10, 0)));
        assert!(!is_active(&event, at(10, 0) + Duration::seconds(1)));
    }

    #[test]
    fn test_all_day_event_survives_active_filter() {
        let events = vec![all_day("Conference")];
        assert_eq!(
            ticker_line(&events, EventPolicy::Active, at(23, 30)),
            "All day Conference"
        );
    }

    #[test]
    fn test_empty_list_falls_back_per_policy() {
        assert_eq!(
            ticker_line(&[], EventPolicy::WholeDay, at(8, 0)),
            NO_EVENTS_TODAY
        );
        assert_eq!(
            ticker_line(&[], EventPolicy::Active, at(8, 0)),
            NO_CURRENT_EVENTS
        );
    }

    #[test]
    fn test_active_policy_falls_back_when_everything_expired() {
        let events = vec![timed(6, 0, "Breakfast")];
        assert_eq!(
            ticker_line(&events, EventPolicy::Active, at(22, 0)),
            NO_CURRENT_EVENTS
        );
    }
}
