//! Unix timestamps in whole seconds.
//!
//! Deadlines travel on the wire as 256-bit integers, but every clock the relayer
//! or client reads fits in a `u64`. [`UnixTimestamp`] is the local representation;
//! conversion to [`U256`] happens at the encoding boundary.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnixTimestamp(u64);

impl UnixTimestamp {
    /// Creates a timestamp from a number of seconds since the epoch.
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Returns the number of seconds since the epoch.
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Reads the wall clock.
    ///
    /// A clock set before 1970 reads as the epoch itself.
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self(secs)
    }

    /// Widens the timestamp to the 256-bit form used on-chain.
    pub fn to_u256(&self) -> U256 {
        U256::from(self.0)
    }

    /// Adds `secs`, saturating at `u64::MAX`.
    pub fn saturating_add(self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

impl Add<u64> for UnixTimestamp {
    type Output = UnixTimestamp;

    fn add(self, rhs: u64) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl fmt::Display for UnixTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_saturates() {
        let ts = UnixTimestamp::from_secs(u64::MAX - 1);
        assert_eq!((ts + 10).as_secs(), u64::MAX);
    }

    #[test]
    fn test_widens_to_u256() {
        let ts = UnixTimestamp::from_secs(1_700_000_300);
        assert_eq!(ts.to_u256(), U256::from(1_700_000_300u64));
    }

    #[test]
    fn test_serializes_as_number() {
        let ts = UnixTimestamp::from_secs(42);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "42");
    }
}
