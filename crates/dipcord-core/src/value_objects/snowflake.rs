//! Snowflake identifiers.
//!
//! Every Dipcord row (users, channels, messages, tasks, polls...) is keyed by a
//! 64-bit id laid out as:
//! - bits 63-22: milliseconds since [`Snowflake::EPOCH`]
//! - bits 21-12: worker id (0-1023)
//! - bits 11-0:  per-millisecond sequence (0-4095)
//!
//! Because the timestamp sits in the high bits, ids sort by creation time, which
//! is what cursor pagination over messages relies on.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const WORKER_BITS: i64 = 10;
const SEQUENCE_BITS: i64 = 12;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_WORKER_ID: u16 = 1 << WORKER_BITS;

/// 64-bit time-ordered identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// 2024-01-01T00:00:00Z in Unix milliseconds
    pub const EPOCH: i64 = 1_704_067_200_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    /// Unix milliseconds at which this id was minted
    #[inline]
    pub fn timestamp(&self) -> i64 {
        (self.0 >> (WORKER_BITS + SEQUENCE_BITS)) + Self::EPOCH
    }

    #[inline]
    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & i64::from(MAX_WORKER_ID - 1)) as u16
    }

    /// Creation time as a UTC datetime (falls back to the Unix epoch for garbage ids)
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.timestamp()).unwrap_or_default()
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id >= 0)
            .map(Snowflake)
            .ok_or(SnowflakeParseError::InvalidFormat)
    }
}

/// Error when parsing a Snowflake from a string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("invalid snowflake format")]
    InvalidFormat,
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

// Browsers lose precision above 2^53, so ids travel as JSON strings.
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
        use serde::de::{self, Visitor};

        struct SnowflakeVisitor;

        impl Visitor<'_> for SnowflakeVisitor {
            type Value = Snowflake;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a snowflake id as a string or integer")
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Snowflake, E> {
                Ok(Snowflake(value))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Snowflake, E> {
                i64::try_from(value)
                    .map(Snowflake)
                    .map_err(|_| E::custom("snowflake out of range"))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Snowflake, E> {
                Snowflake::parse(value).map_err(|_| E::custom("invalid snowflake string"))
            }
        }

        deserializer.deserialize_any(SnowflakeVisitor)
    }
}

/// Lock-free snowflake generator, one per process (worker).
pub struct SnowflakeGenerator {
    worker_id: u16,
    /// Packed `(timestamp << SEQUENCE_BITS) | sequence` of the last id handed out
    state: AtomicI64,
}

impl SnowflakeGenerator {
    /// # Panics
    /// Panics if `worker_id` does not fit in 10 bits.
    pub fn new(worker_id: u16) -> Self {
        assert!(worker_id < MAX_WORKER_ID, "Worker ID must be < 1024");
        Self {
            worker_id,
            state: AtomicI64::new(0),
        }
    }

    pub fn generate(&self) -> Snowflake {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let last_ts = current >> SEQUENCE_BITS;
            let last_seq = current & SEQUENCE_MASK;
            let now = Self::now_millis().max(last_ts);

            let (ts, seq) = if now > last_ts {
                (now, 0)
            } else if last_seq < SEQUENCE_MASK {
                (last_ts, last_seq + 1)
            } else {
                // Sequence exhausted for this millisecond; borrow the next one.
                (last_ts + 1, 0)
            };

            let next = (ts << SEQUENCE_BITS) | seq;
            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let id = ((ts - Snowflake::EPOCH) << (WORKER_BITS + SEQUENCE_BITS))
                        | (i64::from(self.worker_id) << SEQUENCE_BITS)
                        | seq;
                    return Snowflake(id);
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }

    fn now_millis() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(Snowflake::EPOCH)
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
