use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Instant;
use time::{OffsetDateTime, UtcOffset};

#[derive(Clone, Copy)]
struct Anchor {
    unix_ms: u64,
    at: Instant,
}

/// Wall clock, set from the companion and advanced by the monotonic timer.
pub struct Clock<M: RawMutex> {
    anchor: Mutex<M, Cell<Anchor>>,
}

impl<M: RawMutex> Clock<M> {
    pub const fn new() -> Self {
        Self {
            anchor: Mutex::new(Cell::new(Anchor {
                unix_ms: 0,
                at: Instant::from_ticks(0),
            })),
        }
    }

    /// Set the current time, in milliseconds since the unix epoch.
    pub fn set(&self, unix_ms: u64) {
        let anchor = Anchor {
            unix_ms,
            at: Instant::now(),
        };
        self.anchor.lock(|a| a.set(anchor));
    }

    pub fn now_millis(&self) -> u64 {
        let anchor = self.anchor.lock(|a| a.get());
        anchor.unix_ms + Instant::now().duration_since(anchor.at).as_millis()
    }

    pub fn now(&self, offset: UtcOffset) -> OffsetDateTime {
        local(self.now_millis(), offset)
    }
}

impl<M: RawMutex> Default for Clock<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Local date and time at `unix_ms` in a zone `offset` from UTC.
pub fn local(unix_ms: u64, offset: UtcOffset) -> OffsetDateTime {
    let nanos = i128::from(unix_ms) * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(offset)
}
