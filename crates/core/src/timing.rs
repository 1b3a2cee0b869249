//! Auto-close evaluation for timed sessions.
//!
//! All functions are pure: they take the session's start time, its configured
//! auto-close duration and the current instant, and never mutate anything.
//! Callers re-evaluate on their own polling or timer schedule.

use chrono::{DateTime, Duration, Utc};

/// Computes the instant at which a session auto-closes.
///
/// Returns `None` when auto-close is not configured: no start time, no
/// duration, or a duration of zero or less. A zero duration means "never
/// auto-close", not "close immediately".
#[must_use]
pub fn auto_close_deadline(
    started_at: Option<DateTime<Utc>>,
    auto_close_duration_minutes: Option<i64>,
) -> Option<DateTime<Utc>> {
    let started_at = started_at?;
    let minutes = auto_close_duration_minutes.filter(|m| *m > 0)?;
    let window = Duration::try_minutes(minutes)?;
    started_at.checked_add_signed(window)
}

/// Returns `true` once `now` has reached the session's auto-close deadline.
#[must_use]
pub fn has_auto_closed(
    started_at: Option<DateTime<Utc>>,
    auto_close_duration_minutes: Option<i64>,
    now: DateTime<Utc>,
) -> bool {
    auto_close_deadline(started_at, auto_close_duration_minutes)
        .is_some_and(|deadline| now >= deadline)
}

/// Time left until auto-close, clamped at zero once the deadline has passed.
///
/// Returns `None` under the same "not configured" conditions as
/// [`auto_close_deadline`].
#[must_use]
pub fn remaining_time(
    started_at: Option<DateTime<Utc>>,
    auto_close_duration_minutes: Option<i64>,
    now: DateTime<Utc>,
) -> Option<Duration> {
    let deadline = auto_close_deadline(started_at, auto_close_duration_minutes)?;
    Some((deadline - now).max(Duration::zero()))
}

/// Formats a countdown as `MM:SS`, or `H:MM:SS` from one hour upwards.
///
/// Negative durations render as `00:00`.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}
