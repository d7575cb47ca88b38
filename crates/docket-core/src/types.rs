//! Common types used throughout Docket.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Highest timestamp (microseconds since the epoch) handed out so far.
static LAST_MICROS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Timestamp wrapper for consistent handling throughout Docket.
///
/// Precision is one microsecond, which is what the relational store keeps.
/// [`Timestamp::now`] is monotonically non-decreasing within a process even
/// if the wall clock steps backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Get the current timestamp.
    #[must_use]
    pub fn now() -> Self {
        let wall = Utc::now().timestamp_micros();
        let previous = LAST_MICROS.fetch_max(wall, Ordering::SeqCst);
        let micros = previous.max(wall);
        Self::from_micros(micros).unwrap_or_else(|| Self(Utc::now()))
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Create a timestamp from microseconds since the Unix epoch.
    ///
    /// Returns `None` if the value is outside chrono's representable range.
    #[must_use]
    pub fn from_micros(micros: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp_micros(micros).map(Self)
    }

    /// Microseconds since the Unix epoch.
    #[must_use]
    pub fn as_micros(&self) -> i64 {
        self.0.timestamp_micros()
    }

    /// Check if this timestamp is in the past.
    #[must_use]
    pub fn is_past(&self) -> bool {
        self.0 < Utc::now()
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.6fZ"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// The identity a mutation is attributed to.
///
/// Handlers resolve the authenticated user from their own request state and
/// pass it explicitly. When no identity is available, [`Actor::system`] is
/// used and the sentinel name [`Actor::SENTINEL`] is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Name recorded when the acting user is unknown.
    pub const SENTINEL: &'static str = "System";

    /// Create an actor from a user name.
    ///
    /// Blank names resolve to the sentinel.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self::system()
        } else if trimmed.len() == name.len() {
            Self(name)
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// The sentinel actor used when no identity is available.
    #[must_use]
    pub fn system() -> Self {
        Self(Self::SENTINEL.to_owned())
    }

    /// Resolve an optional user name, falling back to the sentinel.
    #[must_use]
    pub fn from_optional(name: Option<&str>) -> Self {
        name.map_or_else(Self::system, Self::new)
    }

    /// Whether this is the sentinel actor.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.0 == Self::SENTINEL
    }

    /// The recorded user name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Actor {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Actor {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Role string attached to a user account.
///
/// Authorization is a plain string comparison; [`Role::ADMIN`] satisfies
/// every role check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// The administrator role.
    pub const ADMIN: &'static str = "admin";

    /// Create a role from a string (surrounding whitespace is removed).
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self(role.into().trim().to_owned())
    }

    /// The administrator role.
    #[must_use]
    pub fn admin() -> Self {
        Self(Self::ADMIN.to_owned())
    }

    /// Whether this is the administrator role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.eq_ignore_ascii_case(Self::ADMIN)
    }

    /// Whether this role satisfies `required`.
    #[must_use]
    pub fn satisfies(&self, required: &str) -> bool {
        self.is_admin() || self.0.eq_ignore_ascii_case(required.trim())
    }

    /// The role string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the role string is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
