//! Snowflake ID - time-ordered 64-bit identifier
//!
//! Layout:
//! - Bits 63-22: milliseconds since [`Snowflake::EPOCH`]
//! - Bits 21-12: worker ID (0-1023)
//! - Bits 11-0:  per-millisecond sequence (0-4095)
//!
//! Ordering by id is ordering by creation time, which is what thread
//! pagination relies on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const WORKER_BITS: i64 = 10;
const SEQUENCE_BITS: i64 = 12;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const TIMESTAMP_SHIFT: i64 = WORKER_BITS + SEQUENCE_BITS;

/// 64-bit unique identifier used for users, messages and attachments
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// Custom epoch: 2024-01-01 00:00:00 UTC (milliseconds)
    pub const EPOCH: i64 = 1_704_067_200_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which this id was minted
    #[inline]
    pub fn timestamp_millis(&self) -> i64 {
        (self.0 >> TIMESTAMP_SHIFT) + Self::EPOCH
    }

    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & ((1 << WORKER_BITS) - 1)) as u16
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .map(Snowflake)
            .map_err(|_| SnowflakeParseError::InvalidFormat(s.to_string()))
    }
}

/// Error when parsing a Snowflake from a string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid id: {0:?}")]
    InvalidFormat(String),
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl std::str::FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Snowflake::parse(s)
    }
}

// Strings on the wire: browsers lose precision past 2^53.
impl Serialize for Snowflake {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Snowflake(n)),
            Raw::Text(s) => Snowflake::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Lock-free id generator for one worker
///
/// Keeps the last issued id; a new id is the current-millisecond base or,
/// if that would not be strictly greater, the last id plus one. When the
/// sequence field is exhausted the id rolls into the next millisecond.
#[derive(Debug)]
pub struct SnowflakeGenerator {
    worker_bits: i64,
    last: AtomicI64,
}

impl SnowflakeGenerator {
    /// # Panics
    /// Panics if `worker_id >= 1024`
    pub fn new(worker_id: u16) -> Self {
        assert!(worker_id < 1024, "worker id must be < 1024");
        Self {
            worker_bits: i64::from(worker_id) << SEQUENCE_BITS,
            last: AtomicI64::new(0),
        }
    }

    pub fn generate(&self) -> Snowflake {
        let base = ((now_millis() - Snowflake::EPOCH) << TIMESTAMP_SHIFT) | self.worker_bits;

        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(self.successor(last, base))
            })
            .unwrap_or_else(|last| last);

        Snowflake(self.successor(previous, base))
    }

    fn successor(&self, last: i64, base: i64) -> i64 {
        if base > last {
            return base;
        }
        if last & SEQUENCE_MASK == SEQUENCE_MASK {
            (((last >> TIMESTAMP_SHIFT) + 1) << TIMESTAMP_SHIFT) | self.worker_bits
        } else {
            last + 1
        }
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(Snowflake::EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_ids_are_unique_and_increasing() {
        let generator = SnowflakeGenerator::new(3);
        let ids: Vec<Snowflake> = (0..10_000).map(|_| generator.generate()).collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| id.worker_id() == 3));
    }

    #[test]
    fn test_timestamp_is_recent() {
        let id = SnowflakeGenerator::default().generate();
        let drift = (now_millis() - id.timestamp_millis()).abs();
        assert!(drift < 5_000);
    }

    #[test]
    fn test_sequence_rollover_moves_to_next_millisecond() {
        let generator = SnowflakeGenerator::new(1);
        let last = (5 << TIMESTAMP_SHIFT) | (1 << SEQUENCE_BITS) | SEQUENCE_MASK;
        let next = generator.successor(last, 0);
        assert_eq!(next >> TIMESTAMP_SHIFT, 6);
        assert_eq!(next & SEQUENCE_MASK, 0);
    }

    #[test]
    fn test_serde_string_and_number() {
        let id = Snowflake::new(1234567890123);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234567890123\"");

        let from_str: Snowflake = serde_json::from_str("\"42\"").unwrap();
        let from_num: Snowflake = serde_json::from_str("42").unwrap();
        assert_eq!(from_str, from_num);

        assert!(serde_json::from_str::<Snowflake>("\"abc\"").is_err());
    }
}
