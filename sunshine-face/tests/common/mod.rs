#![allow(dead_code)]

use core::cell::Cell;
use core::convert::Infallible;
use std::collections::HashMap;

use embedded_graphics::pixelcolor::Rgb565 as Rgb;
use embedded_graphics::prelude::*;
use sunshine_face::{
    Asset, AssetSource, DataEvent, DataLayer, DataMap, FaceConfig, FetchError, Host, TimeZone, TimeZones,
    WatchFaceStyle, WeatherFace,
};
use time::macros::offset;

#[derive(Default)]
pub struct FakeHost {
    pub invalidated: usize,
    pub style: Option<WatchFaceStyle>,
}

impl Host for FakeHost {
    fn invalidate(&mut self) {
        self.invalidated += 1;
    }

    fn set_style(&mut self, style: WatchFaceStyle) {
        self.style = Some(style);
    }
}

pub struct FakeZones {
    pub registered: usize,
    pub unregistered: usize,
    pub queried: Cell<usize>,
    pub zone: TimeZone,
}

impl Default for FakeZones {
    fn default() -> Self {
        Self {
            registered: 0,
            unregistered: 0,
            queried: Cell::new(0),
            zone: TimeZone::new("America/Los_Angeles", offset!(-8)),
        }
    }
}

impl TimeZones for FakeZones {
    fn register(&mut self) {
        self.registered += 1;
    }

    fn unregister(&mut self) {
        self.unregistered += 1;
    }

    fn current(&self) -> TimeZone {
        self.queried.set(self.queried.get() + 1);
        self.zone.clone()
    }
}

#[derive(Default)]
pub struct FakeData {
    pub connected: bool,
    pub connects: usize,
    pub disconnects: usize,
    pub listeners_added: usize,
    pub listeners_removed: usize,
}

impl DataLayer for FakeData {
    fn connect(&mut self) {
        self.connects += 1;
        self.connected = true;
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn add_listener(&mut self) {
        self.listeners_added += 1;
    }

    fn remove_listener(&mut self) {
        self.listeners_removed += 1;
    }
}

pub type Face = WeatherFace<FakeHost, FakeZones, FakeData>;

pub fn face() -> Face {
    WeatherFace::new(
        FakeHost::default(),
        FakeZones::default(),
        FakeData::default(),
        FaceConfig::default(),
    )
}

/// A face that is on screen, interactive and receiving data.
pub fn listening_face() -> Face {
    let mut face = face();
    face.on_create();
    face.on_visibility_changed(true);
    face.on_connected();
    while face.take_timer_command().is_some() {}
    face.take_redraw();
    face
}

pub fn weather(text: &[(&str, &str)], icon: Option<&str>) -> DataEvent {
    let mut map = DataMap::new();
    for (k, v) in text {
        map.put_text(k, v).unwrap();
    }
    if let Some(digest) = icon {
        map.put_asset("ICON", Asset::new(digest).unwrap()).unwrap();
    }
    DataEvent::changed("/weather", map).unwrap()
}

#[derive(Default)]
pub struct FakeAssets {
    pub blobs: HashMap<String, Vec<u8>>,
    pub reads: usize,
}

impl FakeAssets {
    pub fn with(digest: &str, data: Vec<u8>) -> Self {
        let mut assets = Self::default();
        assets.blobs.insert(digest.to_string(), data);
        assets
    }
}

impl AssetSource for FakeAssets {
    type Error = Infallible;

    async fn open_asset(&mut self, asset: &Asset, buf: &mut [u8]) -> Result<usize, FetchError<Infallible>> {
        self.reads += 1;
        let data = self.blobs.get(asset.digest()).ok_or(FetchError::UnknownAsset)?;
        let dst = buf.get_mut(..data.len()).ok_or(FetchError::TooLarge)?;
        dst.copy_from_slice(data);
        Ok(data.len())
    }
}

/// Uncompressed 24 bit BMP of a single colour.
pub fn solid_bmp(width: u32, height: u32, [r, g, b]: [u8; 3]) -> Vec<u8> {
    let stride = (width * 3 + 3) & !3;
    let image_len = stride * height;
    let mut out = Vec::new();
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(54 + image_len).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&54u32.to_le_bytes());

    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&image_len.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    for _ in 0..height {
        let mut row = Vec::new();
        for _ in 0..width {
            row.extend_from_slice(&[b, g, r]);
        }
        row.resize(stride as usize, 0);
        out.extend_from_slice(&row);
    }
    out
}

pub struct Framebuffer {
    pub pixels: Vec<Rgb>,
    pub size: Size,
}

impl Framebuffer {
    pub fn new(size: Size) -> Self {
        Self {
            pixels: vec![Rgb::BLACK; (size.width * size.height) as usize],
            size,
        }
    }

    pub fn at(&self, x: i32, y: i32) -> Rgb {
        self.pixels[(y as u32 * self.size.width + x as u32) as usize]
    }

    pub fn count(&self, color: Rgb) -> usize {
        self.pixels.iter().filter(|&&c| c == color).count()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if p.x >= 0 && p.y >= 0 && (p.x as u32) < self.size.width && (p.y as u32) < self.size.height {
                let i = (p.y as u32 * self.size.width + p.x as u32) as usize;
                self.pixels[i] = c;
            }
        }
        Ok(())
    }
}
