//! Domain types shared across the lending core.
//!
//! Identifiers are newtypes so that item names, request ids and requester keys
//! cannot be confused with each other at call sites.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque key into the availability ledger.
///
/// The core does not interpret the contents; `"Breadboard"` and
/// `"Resistors (10 Ω – 1 kΩ)"` are equally valid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Creates an `ItemId` from anything string-like
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// Ordered item list carried by requests and undo records.
///
/// Most borrow requests hold a handful of items, so four inline slots avoid a
/// heap allocation in the common case.
pub type ItemList = SmallVec<[ItemId; 4]>;

/// Unique identifier for a borrow request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `RequestId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Requester
// ============================================================================

/// Authenticated requester as supplied by the identity provider.
///
/// Read-only from the core's point of view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    /// Display name
    pub name: String,
    /// Student identifier (e.g. `2026-00001`)
    pub student_id: String,
    /// Contact email
    pub email: String,
}

impl Requester {
    /// Creates a new requester reference
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        student_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            student_id: student_id.into(),
            email: email.into(),
        }
    }

    /// Key under which this requester's history is filed.
    ///
    /// Falls back to the name when the identity provider supplied no student id.
    #[must_use]
    pub fn key(&self) -> RequesterKey {
        if self.student_id.is_empty() {
            RequesterKey(self.name.clone())
        } else {
            RequesterKey(self.student_id.clone())
        }
    }
}

/// Key identifying a requester's history log
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequesterKey(String);

impl fmt::Display for RequesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Reason and priority
// ============================================================================

/// Urgency tier derived from a reason code. Lower is more urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PriorityClass(u8);

impl PriorityClass {
    /// Most urgent tier
    pub const EMERGENCY: Self = Self(0);
    /// Second tier
    pub const URGENT: Self = Self(1);
    /// Default tier, also used for unrecognized reasons
    pub const NORMAL: Self = Self(2);
    /// Least urgent tier
    pub const LOW: Self = Self(3);

    /// Creates a priority class from a raw tier value
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    /// Returns the raw tier value
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl Default for PriorityClass {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller-supplied category for a borrow request
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReasonCode {
    /// Equipment is needed immediately
    Emergency,
    /// Equipment is needed soon
    Urgent,
    /// Regular lab use
    #[default]
    Normal,
    /// Can wait
    Low,
    /// Any reason outside the fixed set, kept verbatim
    Other(String),
}

impl ReasonCode {
    /// Parses a reason code, ignoring case and surrounding whitespace.
    ///
    /// Unknown text is preserved as [`ReasonCode::Other`] and classified as
    /// normal priority.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "emergency" => Self::Emergency,
            "urgent" => Self::Urgent,
            "normal" | "" => Self::Normal,
            "low" => Self::Low,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Fixed reason → priority mapping
    #[must_use]
    pub const fn priority(&self) -> PriorityClass {
        match self {
            Self::Emergency => PriorityClass::EMERGENCY,
            Self::Urgent => PriorityClass::URGENT,
            Self::Normal | Self::Other(_) => PriorityClass::NORMAL,
            Self::Low => PriorityClass::LOW,
        }
    }

    /// Returns the textual form of the reason
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Emergency => "emergency",
            Self::Urgent => "urgent",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Other(text) => text,
        }
    }
}

impl From<&str> for ReasonCode {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
