/*!
 * Core Types
 * Common types used across the scheduler
 */

use super::errors::{SchedulerError, SchedulerResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Work item identifier (assigned in arrival order)
pub type WorkId = u64;

/// Scheduling priority class
///
/// Lower rank = more urgent. `Ord` follows rank, so `Immediate` is the minimum.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Must run to completion without yielding
    Immediate = 1,
    /// Result of user interaction, short expiration
    UserBlocking = 2,
    /// Default class for ordinary work
    Normal = 3,
    /// Can be deferred but should eventually complete
    Low = 4,
    /// Runs only when nothing else is pending
    Idle = 5,
}

impl Priority {
    /// All priority classes, most urgent first
    pub const ALL: [Priority; 5] = [
        Priority::Immediate,
        Priority::UserBlocking,
        Priority::Normal,
        Priority::Low,
        Priority::Idle,
    ];

    /// Numeric rank (1 = most urgent)
    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Convert a raw level into a priority class
    pub fn from_level(level: u8) -> SchedulerResult<Self> {
        match level {
            1 => Ok(Self::Immediate),
            2 => Ok(Self::UserBlocking),
            3 => Ok(Self::Normal),
            4 => Ok(Self::Low),
            5 => Ok(Self::Idle),
            other => Err(SchedulerError::InvalidPriority(format!(
                "level {} is outside 1..=5",
                other
            ))),
        }
    }

    /// Convert to string representation
    ///
    /// # Performance
    /// Hot path - used by the sub-step trace and serialization
    #[inline(always)]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::UserBlocking => "user_blocking",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for Priority {
    type Error = SchedulerError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_level(level)
    }
}

impl FromStr for Priority {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "immediate" | "sync" => Ok(Self::Immediate),
            "user_blocking" | "userblocking" | "user-blocking" => Ok(Self::UserBlocking),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            "idle" => Ok(Self::Idle),
            other => match other.parse::<u8>() {
                Ok(level) => Self::from_level(level),
                Err(_) => Err(SchedulerError::InvalidPriority(format!(
                    "'{}'. Valid: immediate, user_blocking, normal, low, idle",
                    s
                ))),
            },
        }
    }
}

impl Serialize for Priority {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
