use chrono::{DateTime, Duration, Utc};

/// Where the study flow reads "now" from: quiz deadlines, progress stamps and
/// section records all go through it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    /// A clock that always reports `at`.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(at) => *at,
        }
    }

    /// The same clock shifted by `delta`; a system clock is returned unchanged.
    #[must_use]
    pub fn later(self, delta: Duration) -> Self {
        match self {
            Self::System => Self::System,
            Self::Fixed(at) => Self::Fixed(at + delta),
        }
    }
}

/// Seconds after the Unix epoch used as the pinned test instant.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Pinned instant for deterministic tests (2023-11-14T22:13:20Z).
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(FIXED_TEST_TIMESTAMP)
}
