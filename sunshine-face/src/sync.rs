//! Data items synced from the companion and the weather listener reading them.

use heapless::{String, Vec};
use sunshine_ui::RenderState;

use crate::config::FaceConfig;
use crate::error::CodecError;

pub const PATH_LEN: usize = 32;
pub const KEY_LEN: usize = 16;
pub const TEXT_LEN: usize = 32;
pub const DIGEST_LEN: usize = 64;
pub const MAX_ENTRIES: usize = 8;
pub const MAX_EVENTS: usize = 4;

pub type DataEventBatch = Vec<DataEvent, MAX_EVENTS>;

/// Opaque reference to a binary blob held by the data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Asset {
    digest: String<DIGEST_LEN>,
}

impl Asset {
    pub fn new(digest: &str) -> Result<Self, CodecError> {
        Ok(Self {
            digest: string(digest)?,
        })
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataValue {
    Text(String<TEXT_LEN>),
    Asset(Asset),
    Int(i32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataMap {
    entries: Vec<(String<KEY_LEN>, DataValue), MAX_ENTRIES>,
}

impl DataMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value under `key`.
    pub fn put(&mut self, key: &str, value: DataValue) -> Result<(), CodecError> {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            entry.1 = value;
            return Ok(());
        }
        self.entries
            .push((string(key)?, value))
            .map_err(|_| CodecError::Capacity)
    }

    pub fn put_text(&mut self, key: &str, text: &str) -> Result<(), CodecError> {
        self.put(key, DataValue::Text(string(text)?))
    }

    pub fn put_asset(&mut self, key: &str, asset: Asset) -> Result<(), CodecError> {
        self.put(key, DataValue::Asset(asset))
    }

    pub fn get(&self, key: &str) -> Option<&DataValue> {
        self.entries.iter().find(|(k, _)| k.as_str() == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(DataValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventKind {
    Changed,
    Deleted,
}

/// One change notification from the data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataEvent {
    pub kind: EventKind,
    pub path: String<PATH_LEN>,
    pub map: DataMap,
}

impl DataEvent {
    pub fn changed(path: &str, map: DataMap) -> Result<Self, CodecError> {
        Ok(Self {
            kind: EventKind::Changed,
            path: string(path)?,
            map,
        })
    }

    pub fn deleted(path: &str) -> Result<Self, CodecError> {
        Ok(Self {
            kind: EventKind::Deleted,
            path: string(path)?,
            map: DataMap::new(),
        })
    }
}

/// Outcome of applying one weather data item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum IconUpdate {
    None,
    Fetch(Asset),
    Unusable,
}

/// Copy the temperatures of a weather item into `render` and report what to do about the icon.
pub(crate) fn apply_weather(config: &FaceConfig, map: &DataMap, render: &mut RenderState) -> IconUpdate {
    match map.get(config.high_key) {
        Some(DataValue::Text(high)) => {
            debug!("high = {}", high.as_str());
            render.set_high(high);
        }
        Some(_) => warn!("key {} is not text", config.high_key),
        None => debug!("key {} not found", config.high_key),
    }

    match map.get(config.low_key) {
        Some(DataValue::Text(low)) => {
            debug!("low = {}", low.as_str());
            render.set_low(low);
        }
        Some(_) => warn!("key {} is not text", config.low_key),
        None => debug!("key {} not found", config.low_key),
    }

    match map.get(config.icon_key) {
        Some(DataValue::Asset(asset)) => IconUpdate::Fetch(asset.clone()),
        Some(_) => {
            warn!("key {} is not an asset", config.icon_key);
            IconUpdate::Unusable
        }
        None => {
            debug!("key {} not found", config.icon_key);
            IconUpdate::None
        }
    }
}

pub(crate) fn string<const N: usize>(s: &str) -> Result<String<N>, CodecError> {
    let mut out = String::new();
    out.push_str(s).map_err(|_| CodecError::Capacity)?;
    Ok(out)
}

/// `s` cut to at most `N` bytes at a char boundary.
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    let _ = out.push_str(&s[..end]);
    out
}
