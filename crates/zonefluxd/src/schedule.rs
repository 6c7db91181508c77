//! Minute-aligned fire times.
//!
//! The first fire lands just after the next wall-clock minute
//! boundary: aligning to the boundary keeps the destination's
//! minute buckets populated promptly, and the random offset spreads
//! load when many collectors start at once. Every later fire is
//! exactly one period after the previous one, however long the cycle
//! body took, so the cadence never drifts.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Fire-time bookkeeping for the collection loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    next_fire_ms: u64,
}

impl Schedule {
    /// One minute, the fixed collection cadence.
    pub const PERIOD_MS: u64 = 60_000;

    /// First fire: start of the next minute plus the given offset.
    /// A `now` exactly on a boundary still schedules the *next*
    /// minute, keeping the offset strictly after a boundary.
    pub fn aligned(now_ms: u64, offset_ms: u64) -> Self {
        let boundary = (now_ms / Self::PERIOD_MS + 1) * Self::PERIOD_MS;
        Self {
            next_fire_ms: boundary + offset_ms,
        }
    }

    /// The next fire time, epoch milliseconds.
    pub fn next_fire_ms(&self) -> u64 {
        self.next_fire_ms
    }

    /// Consume the pending fire time and re-arm exactly one period
    /// later. Called before the cycle body runs, so a slow cycle
    /// delays but never shifts subsequent fires.
    pub fn advance(&mut self) -> u64 {
        let fired = self.next_fire_ms;
        self.next_fire_ms += Self::PERIOD_MS;
        fired
    }
}

/// Draw a random offset in `[0, range_secs)` seconds, in milliseconds.
pub fn jitter_ms(range_secs: u64) -> u64 {
    if range_secs == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..range_secs * 1000)
}

/// Wall clock as epoch milliseconds.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Wall clock as epoch seconds.
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
