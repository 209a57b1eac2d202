//! Nanosecond-precision timestamps.
//!
//! The ledger orders everything by `(seconds, nanos)` since the Unix epoch,
//! and a transaction id is literally "payer account + timestamp", so two
//! transactions generated in the same nanosecond by the same payer collide.
//! [`Timestamp::generate`] exists to make that unlikely:
//!
//! - with jitter, the wall clock is backdated by a random 3–8 seconds (nodes
//!   reject valid-start times in their future, and clocks drift) and a random
//!   sub-millisecond nanosecond offset is mixed in;
//! - without jitter, timestamps are strictly monotonic within the process.

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::{JITTER_BACKDATE_MAX_MS, JITTER_BACKDATE_MIN_MS};
use crate::error::{Error, Result};
use crate::wire::WireTimestamp;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;

/// Last value handed out by the non-jittered generator, as Unix nanos.
static LAST_MONOTONIC_NANOS: AtomicU64 = AtomicU64::new(0);

/// A point in time: whole seconds since the epoch plus `[0, 1e9)` nanos.
///
/// Field order matters: the derived `Ord` compares `seconds` first, then
/// `nanos`, which is exactly lexicographic time order. `Eq` and `Hash` are
/// derived from the same two fields, so they agree with `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    seconds: i64,
    nanos: i32,
}

impl Timestamp {
    /// Builds a timestamp, rejecting negative fields and `nanos >= 1e9`.
    pub fn new(seconds: i64, nanos: i32) -> Result<Self> {
        if seconds < 0 || nanos < 0 || i64::from(nanos) >= NANOS_PER_SECOND {
            return Err(Error::InvalidArgument(format!(
                "invalid timestamp: seconds={seconds}, nanos={nanos}"
            )));
        }
        Ok(Self { seconds, nanos })
    }

    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    pub fn nanos(&self) -> i32 {
        self.nanos
    }

    /// The current wall-clock time, no jitter.
    pub fn now() -> Self {
        Self::from_unix_nanos(unix_nanos_now())
    }

    /// Generates a timestamp suitable for a transaction valid-start.
    pub fn generate(jitter: bool) -> Self {
        if !jitter {
            return Self::from_unix_nanos(next_monotonic_nanos());
        }
        let mut rng = rand::thread_rng();
        let backdate_ms = rng.gen_range(JITTER_BACKDATE_MIN_MS..=JITTER_BACKDATE_MAX_MS);
        let sub_milli = rng.gen_range(0..NANOS_PER_MILLI);
        let nanos = unix_nanos_now() as i64 - backdate_ms * NANOS_PER_MILLI + sub_milli;
        Self::from_unix_nanos(nanos.max(0) as u64)
    }

    /// Adds `nanos`, carrying whole seconds. Saturates at `i64::MAX` seconds.
    pub fn plus_nanos(self, nanos: u64) -> Self {
        let total = self.nanos as u128 + u128::from(nanos);
        let carry = i64::try_from(total / NANOS_PER_SECOND as u128).unwrap_or(i64::MAX);
        Self {
            seconds: self.seconds.saturating_add(carry),
            nanos: (total % NANOS_PER_SECOND as u128) as i32,
        }
    }

    /// Converts from a UTC date-time. Pre-epoch instants are rejected.
    pub fn from_date_time(date_time: DateTime<Utc>) -> Result<Self> {
        // chrono reports a leap second as nanos >= 1e9; fold it into the next second
        let subsec = i64::from(date_time.timestamp_subsec_nanos());
        Self::new(date_time.timestamp(), 0).map(|ts| ts.plus_nanos(subsec as u64))
    }

    /// Converts whole Unix seconds.
    pub fn from_unix_seconds(seconds: i64) -> Result<Self> {
        Self::new(seconds, 0)
    }

    /// Parses an RFC 3339 / ISO 8601 date-time string. Without an offset
    /// (`2024-01-15T12:30:45.123456`) the time is taken as UTC.
    pub fn parse_rfc3339(s: &str) -> Result<Self> {
        let date_time = match DateTime::parse_from_rfc3339(s) {
            Ok(date_time) => date_time.with_timezone(&Utc),
            Err(e) => s
                .parse::<NaiveDateTime>()
                .map(|naive| naive.and_utc())
                .map_err(|_| Error::InvalidArgument(format!("invalid date-time {s:?}: {e}")))?,
        };
        Self::from_date_time(date_time)
    }

    /// Converts to a UTC date-time.
    pub fn to_date_time(&self) -> Result<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos as u32)
            .ok_or_else(|| Error::InvalidArgument(format!("timestamp {self} out of range")))
    }

    pub fn to_wire(&self) -> WireTimestamp {
        WireTimestamp {
            seconds: self.seconds,
            nanos: self.nanos,
        }
    }

    /// Validates and converts a decoded wire timestamp.
    pub fn from_wire(wire: &WireTimestamp) -> Result<Self> {
        Self::new(wire.seconds, wire.nanos)
    }

    fn from_unix_nanos(nanos: u64) -> Self {
        Self {
            seconds: (nanos / NANOS_PER_SECOND as u64) as i64,
            nanos: (nanos % NANOS_PER_SECOND as u64) as i32,
        }
    }
}

fn unix_nanos_now() -> u64 {
    Utc::now()
        .timestamp_nanos_opt()
        .map_or(0, |nanos| nanos.max(0) as u64)
}

fn next_monotonic_nanos() -> u64 {
    let now = unix_nanos_now();
    let mut last = LAST_MONOTONIC_NANOS.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_MONOTONIC_NANOS.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.seconds, self.nanos)
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    /// Parses the `Display` form, `"<seconds>.<nanos>"`. A fraction shorter
    /// than nine digits is right-padded, so `"1.5"` is half a second.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidArgument(format!("invalid timestamp: {s:?}"));
        let (secs, frac) = s.split_once('.').unwrap_or((s, ""));
        if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let seconds = secs.parse::<i64>().map_err(|_| invalid())?;
        let nanos = if frac.is_empty() {
            0
        } else {
            format!("{frac:0<9}").parse::<i32>().map_err(|_| invalid())?
        };
        Self::new(seconds, nanos)
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = Error;

    fn try_from(date_time: DateTime<Utc>) -> Result<Self> {
        Self::from_date_time(date_time)
    }
}
