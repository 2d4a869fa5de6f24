use chrono::{DateTime, Duration, Utc};
use utoipa::ToSchema;

/// Time left until launch, split into calendar-style units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, ToSchema)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub done: bool,
}

impl Countdown {
    /// Remaining time from `now` until `target`, clamped at zero once the
    /// target has passed.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (target - now).max(Duration::zero());

        Self {
            days: remaining.num_days(),
            hours: remaining.num_hours() % 24,
            minutes: remaining.num_minutes() % 60,
            seconds: remaining.num_seconds() % 60,
            done: remaining.num_milliseconds() == 0,
        }
    }
}
