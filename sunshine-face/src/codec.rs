//! Wire format of data items written by the companion.
//!
//! All integers are little endian.
//!
//! ```text
//! batch  := count:u8 event*
//! event  := kind:u8 path_len:u8 path count:u8 entry*
//! entry  := key_len:u8 key tag:u8 value_len:u16 value
//! ```
//!
//! Event kinds are `1` (changed) and `2` (deleted). Value tags are `1` (UTF-8 text), `2` (asset, the
//! UTF-8 digest) and `3` (i32).

use crate::error::CodecError;
use crate::sync::{string, truncated, Asset, DataEvent, DataEventBatch, DataMap, DataValue, EventKind};

const KIND_CHANGED: u8 = 0x01;
const KIND_DELETED: u8 = 0x02;

const TAG_TEXT: u8 = 0x01;
const TAG_ASSET: u8 = 0x02;
const TAG_INT: u8 = 0x03;

struct ReadBuf<'m> {
    data: &'m [u8],
    pos: usize,
}

impl<'m> ReadBuf<'m> {
    fn new(data: &'m [u8]) -> ReadBuf<'m> {
        Self { data, pos: 0 }
    }

    fn decode_u8(&mut self) -> Result<u8, CodecError> {
        let b = *self.data.get(self.pos).ok_or(CodecError::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn decode_u16(&mut self) -> Result<u16, CodecError> {
        let b = self.slice(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn slice(&mut self, len: usize) -> Result<&'m [u8], CodecError> {
        let end = self.pos.checked_add(len).ok_or(CodecError::Truncated)?;
        let s = self.data.get(self.pos..end).ok_or(CodecError::Truncated)?;
        self.pos = end;
        Ok(s)
    }

    fn decode_str(&mut self, len: usize) -> Result<&'m str, CodecError> {
        core::str::from_utf8(self.slice(len)?).map_err(|_| CodecError::InvalidUtf8)
    }

    fn release(self) -> &'m [u8] {
        &self.data[self.pos..]
    }
}

struct WriteBuf<'m> {
    data: &'m mut [u8],
    pos: usize,
}

impl<'m> WriteBuf<'m> {
    fn new(data: &'m mut [u8]) -> WriteBuf<'m> {
        Self { data, pos: 0 }
    }

    fn encode_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.encode_slice(&[value])
    }

    fn encode_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.encode_slice(&value.to_le_bytes())
    }

    fn encode_slice(&mut self, value: &[u8]) -> Result<(), CodecError> {
        let end = self.pos + value.len();
        let dst = self.data.get_mut(self.pos..end).ok_or(CodecError::Capacity)?;
        dst.copy_from_slice(value);
        self.pos = end;
        Ok(())
    }

    /// Length prefixed with a single byte.
    fn encode_short(&mut self, value: &[u8]) -> Result<(), CodecError> {
        let len = u8::try_from(value.len()).map_err(|_| CodecError::Capacity)?;
        self.encode_u8(len)?;
        self.encode_slice(value)
    }

    fn release(self) -> usize {
        self.pos
    }
}

/// Decode every event of a payload.
///
/// Events beyond `MAX_EVENTS` are dropped. See [`decode_event`] for what happens to fields that do
/// not fit.
pub fn decode_batch(data: &[u8]) -> Result<DataEventBatch, CodecError> {
    decode_filtered(data, |_| true)
}

/// Decode the changes made at `path`, skipping every other event.
///
/// Unrelated events take no room in the batch, so any number of them can precede the item.
pub fn decode_changes(data: &[u8], path: &str) -> Result<DataEventBatch, CodecError> {
    decode_filtered(data, |event| event.kind == EventKind::Changed && event.path.as_str() == path)
}

fn decode_filtered(data: &[u8], keep: impl Fn(&DataEvent) -> bool) -> Result<DataEventBatch, CodecError> {
    let mut buf = ReadBuf::new(data);
    let count = buf.decode_u8()?;
    let mut batch = DataEventBatch::new();
    for _ in 0..count {
        let Some(event) = decode_one(&mut buf)? else {
            continue;
        };
        if !keep(&event) {
            continue;
        }
        if let Err(event) = batch.push(event) {
            warn!("batch full, dropping event at {}", event.path.as_str());
        }
    }
    Ok(batch)
}

/// Decode a single event, returning the bytes after it.
///
/// Only framing errors fail: a truncated payload, an unknown kind or tag, or invalid UTF-8. Fields
/// that overflow their buffers are dealt with in place: text values are cut at a char boundary,
/// entries with an oversized key or asset digest and entries past `MAX_ENTRIES` are dropped. An
/// event whose path does not fit is consumed and returned as `None`.
pub fn decode_event(data: &[u8]) -> Result<(Option<DataEvent>, &[u8]), CodecError> {
    let mut buf = ReadBuf::new(data);
    let event = decode_one(&mut buf)?;
    Ok((event, buf.release()))
}

fn decode_one(buf: &mut ReadBuf<'_>) -> Result<Option<DataEvent>, CodecError> {
    let kind = match buf.decode_u8()? {
        KIND_CHANGED => EventKind::Changed,
        KIND_DELETED => EventKind::Deleted,
        other => return Err(CodecError::UnknownEventKind(other)),
    };
    let path_len = buf.decode_u8()? as usize;
    let path = string(buf.decode_str(path_len)?);

    let mut map = DataMap::new();
    let count = buf.decode_u8()?;
    for _ in 0..count {
        let key_len = buf.decode_u8()? as usize;
        let key = buf.decode_str(key_len)?;
        let tag = buf.decode_u8()?;
        let len = buf.decode_u16()? as usize;
        let value = match tag {
            TAG_TEXT => Some(DataValue::Text(truncated(buf.decode_str(len)?))),
            TAG_ASSET => Asset::new(buf.decode_str(len)?).ok().map(DataValue::Asset),
            TAG_INT => {
                let b = buf.slice(len)?;
                let b: [u8; 4] = b.try_into().map_err(|_| CodecError::Truncated)?;
                Some(DataValue::Int(i32::from_le_bytes(b)))
            }
            other => return Err(CodecError::UnknownTag(other)),
        };
        let Some(value) = value else {
            warn!("asset digest under {} too long, entry dropped", key);
            continue;
        };
        if map.put(key, value).is_err() {
            warn!("entry {} does not fit, dropped", key);
        }
    }

    match path {
        Ok(path) => Ok(Some(DataEvent { kind, path, map })),
        Err(_) => {
            debug!("skipping event with a {} byte path", path_len);
            Ok(None)
        }
    }
}

/// Encode one event, returning the number of bytes written.
pub fn encode_event(event: &DataEvent, out: &mut [u8]) -> Result<usize, CodecError> {
    let mut buf = WriteBuf::new(out);
    write_event(&mut buf, event)?;
    Ok(buf.release())
}

/// Encode a whole batch, returning the number of bytes written.
pub fn encode_batch(events: &[DataEvent], out: &mut [u8]) -> Result<usize, CodecError> {
    let mut buf = WriteBuf::new(out);
    buf.encode_u8(u8::try_from(events.len()).map_err(|_| CodecError::Capacity)?)?;
    for event in events {
        write_event(&mut buf, event)?;
    }
    Ok(buf.release())
}

fn write_event(buf: &mut WriteBuf<'_>, event: &DataEvent) -> Result<(), CodecError> {
    buf.encode_u8(match event.kind {
        EventKind::Changed => KIND_CHANGED,
        EventKind::Deleted => KIND_DELETED,
    })?;
    buf.encode_short(event.path.as_bytes())?;
    buf.encode_u8(event.map.len() as u8)?;
    for (key, value) in event.map.iter() {
        buf.encode_short(key.as_bytes())?;
        let (tag, bytes): (u8, &[u8]) = match value {
            DataValue::Text(text) => (TAG_TEXT, text.as_bytes()),
            DataValue::Asset(asset) => (TAG_ASSET, asset.digest().as_bytes()),
            DataValue::Int(v) => {
                buf.encode_u8(TAG_INT)?;
                buf.encode_u16(4)?;
                buf.encode_slice(&v.to_le_bytes())?;
                continue;
            }
        };
        buf.encode_u8(tag)?;
        buf.encode_u16(bytes.len() as u16)?;
        buf.encode_slice(bytes)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{MAX_ENTRIES, MAX_EVENTS, TEXT_LEN};

    fn raw_event(path: &str, entries: &[(&str, u8, &str)]) -> Vec<u8> {
        let mut out = vec![KIND_CHANGED, path.len() as u8];
        out.extend_from_slice(path.as_bytes());
        out.push(entries.len() as u8);
        for (key, tag, value) in entries {
            out.push(key.len() as u8);
            out.extend_from_slice(key.as_bytes());
            out.push(*tag);
            out.extend_from_slice(&(value.len() as u16).to_le_bytes());
            out.extend_from_slice(value.as_bytes());
        }
        out
    }

    fn raw_batch(events: &[Vec<u8>]) -> Vec<u8> {
        let mut out = vec![events.len() as u8];
        for event in events {
            out.extend_from_slice(event);
        }
        out
    }

    fn weather_item() -> Vec<u8> {
        raw_event("/weather", &[("HIGH", TAG_TEXT, "75"), ("LOW", TAG_TEXT, "52")])
    }

    #[test]
    fn unrelated_event_with_a_long_path_is_skipped() {
        let long = "/companion/settings/units/temperature";
        assert!(long.len() > 32);
        let data = raw_batch(&[raw_event(long, &[("UNIT", TAG_TEXT, "F")]), weather_item()]);

        let batch = decode_batch(&data).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].path.as_str(), "/weather");
        assert_eq!(batch[0].map.text("HIGH"), Some("75"));
    }

    #[test]
    fn entry_with_a_long_key_is_dropped() {
        let data = raw_batch(&[raw_event(
            "/weather",
            &[
                ("LOCATION_DESCRIPTION", TAG_TEXT, "Mountain View"),
                ("HIGH", TAG_TEXT, "75"),
                ("LOW", TAG_TEXT, "52"),
            ],
        )]);

        let batch = decode_batch(&data).unwrap();
        let map = &batch[0].map;
        assert_eq!(map.len(), 2);
        assert_eq!(map.text("HIGH"), Some("75"));
        assert_eq!(map.text("LOW"), Some("52"));
    }

    #[test]
    fn long_text_is_cut_at_a_char_boundary() {
        let high = "°".repeat(17);
        let data = raw_batch(&[raw_event(
            "/weather",
            &[("HIGH", TAG_TEXT, high.as_str()), ("LOW", TAG_TEXT, "52")],
        )]);

        let batch = decode_batch(&data).unwrap();
        let map = &batch[0].map;
        assert_eq!(map.text("HIGH"), Some("°".repeat(TEXT_LEN / 2).as_str()));
        assert_eq!(map.text("LOW"), Some("52"));
    }

    #[test]
    fn long_asset_digest_is_dropped() {
        let digest = "a".repeat(65);
        let data = raw_batch(&[raw_event(
            "/weather",
            &[("ICON", TAG_ASSET, digest.as_str()), ("HIGH", TAG_TEXT, "75")],
        )]);

        let batch = decode_batch(&data).unwrap();
        assert_eq!(batch[0].map.get("ICON"), None);
        assert_eq!(batch[0].map.text("HIGH"), Some("75"));
    }

    #[test]
    fn entries_past_capacity_are_dropped() {
        let keys = ["HIGH", "LOW", "k2", "k3", "k4", "k5", "k6", "k7", "k8", "k9"];
        let entries: Vec<(&str, u8, &str)> = keys.iter().map(|k| (*k, TAG_TEXT, "1")).collect();
        let data = raw_batch(&[raw_event("/weather", &entries)]);

        let batch = decode_batch(&data).unwrap();
        let map = &batch[0].map;
        assert_eq!(map.len(), MAX_ENTRIES);
        assert!(map.contains_key("HIGH"));
        assert!(!map.contains_key("k9"));
    }

    #[test]
    fn events_past_capacity_are_dropped() {
        let mut events: Vec<Vec<u8>> = (0..6).map(|_| raw_event("/other", &[])).collect();
        events.push(weather_item());
        let data = raw_batch(&events);

        assert_eq!(decode_batch(&data).unwrap().len(), MAX_EVENTS);

        let changes = decode_changes(&data, "/weather").unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].map.text("LOW"), Some("52"));
    }

    #[test]
    fn decodes_weather_item() {
        #[rustfmt::skip]
        let data = [
            1,
            KIND_CHANGED, 8, b'/', b'w', b'e', b'a', b't', b'h', b'e', b'r',
            3,
            4, b'H', b'I', b'G', b'H', TAG_TEXT, 4, 0, b'7', b'5', 0xC2, 0xB0,
            3, b'L', b'O', b'W', TAG_TEXT, 2, 0, b'5', b'2',
            4, b'I', b'C', b'O', b'N', TAG_ASSET, 3, 0, b'a', b'b', b'c',
        ];

        let batch = decode_batch(&data).unwrap();
        assert_eq!(batch.len(), 1);
        let event = &batch[0];
        assert_eq!(event.kind, EventKind::Changed);
        assert_eq!(event.path.as_str(), "/weather");
        assert_eq!(event.map.text("HIGH"), Some("75°"));
        assert_eq!(event.map.text("LOW"), Some("52"));
        assert_eq!(event.map.get("ICON"), Some(&DataValue::Asset(Asset::new("abc").unwrap())));
    }

    #[test]
    fn encoded_event_decodes_to_the_same_event() {
        let mut map = DataMap::new();
        map.put_text("HIGH", "21°").unwrap();
        map.put("CODE", DataValue::Int(-800)).unwrap();
        map.put_asset("ICON", Asset::new("d1g3st").unwrap()).unwrap();
        let event = DataEvent::changed("/weather", map).unwrap();

        let mut out = [0; 128];
        let len = encode_event(&event, &mut out).unwrap();
        let (decoded, rest) = decode_event(&out[..len]).unwrap();
        assert_eq!(decoded, Some(event));
        assert!(rest.is_empty());
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let event = DataEvent::deleted("/weather").unwrap();
        let mut out = [0; 32];
        let len = encode_batch(&[event], &mut out).unwrap();
        for cut in 0..len {
            assert_eq!(decode_batch(&out[..cut]), Err(CodecError::Truncated), "cut at {cut}");
        }
    }

    #[test]
    fn unknown_kind_and_tag_are_rejected() {
        assert_eq!(decode_batch(&[1, 9, 0, 0]), Err(CodecError::UnknownEventKind(9)));
        assert_eq!(
            decode_batch(&[1, KIND_CHANGED, 0, 1, 1, b'K', 7, 0, 0]),
            Err(CodecError::UnknownTag(7))
        );
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(
            decode_batch(&[1, KIND_CHANGED, 1, 0xFF, 0]),
            Err(CodecError::InvalidUtf8)
        );
    }

    #[test]
    fn output_buffer_too_small() {
        let event = DataEvent::deleted("/weather").unwrap();
        let mut out = [0; 4];
        assert_eq!(encode_event(&event, &mut out), Err(CodecError::Capacity));
    }
}
