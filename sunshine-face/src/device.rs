//! Collaborators owned by the watch, not the face.

use heapless::String;
use time::UtcOffset;

use crate::config::WatchFaceStyle;
use crate::error::FetchError;
use crate::sync::Asset;

/// The watch face hosting environment.
pub trait Host {
    /// Ask for a repaint at the next opportunity.
    fn invalidate(&mut self);

    fn set_style(&mut self, style: WatchFaceStyle);
}

/// Time-zone change broadcast and the current zone.
pub trait TimeZones {
    fn register(&mut self);
    fn unregister(&mut self);
    fn current(&self) -> TimeZone;
}

/// Data sync client for the companion device.
///
/// `connect` completes asynchronously; the host reports success with
/// [`FaceEvent::SyncConnected`](crate::FaceEvent::SyncConnected) and a lost connection with
/// [`FaceEvent::SyncSuspended`](crate::FaceEvent::SyncSuspended).
pub trait DataLayer {
    fn connect(&mut self);
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
    fn add_listener(&mut self);
    fn remove_listener(&mut self);
}

/// Reads synced assets.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    type Error;

    /// Read the whole asset into `buf`, returning its length.
    async fn open_asset(&mut self, asset: &Asset, buf: &mut [u8]) -> Result<usize, FetchError<Self::Error>>;
}

pub const ZONE_ID_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeZone {
    pub id: String<ZONE_ID_LEN>,
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    pub offset: UtcOffset,
}

impl TimeZone {
    pub fn utc() -> Self {
        let mut id = String::new();
        let _ = id.push_str("UTC");
        Self {
            id,
            offset: UtcOffset::UTC,
        }
    }

    /// A zone named `id`, truncated to `ZONE_ID_LEN` bytes.
    pub fn new(id: &str, offset: UtcOffset) -> Self {
        let mut end = id.len().min(ZONE_ID_LEN);
        while !id.is_char_boundary(end) {
            end -= 1;
        }
        let mut zone = Self {
            id: String::new(),
            offset,
        };
        let _ = zone.id.push_str(&id[..end]);
        zone
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::utc()
    }
}
