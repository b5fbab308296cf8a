use embedded_graphics::image::{Image, ImageRawBE};
use embedded_graphics::pixelcolor::raw::ToBytes;
use embedded_graphics::pixelcolor::Rgb565 as Rgb;
use embedded_graphics::prelude::*;
use thiserror::Error;
use tinybmp::Bmp;

/// Edge length of the square weather icon, in pixels.
pub const ICON_SIZE: u32 = 60;
const ICON_BYTES: usize = (ICON_SIZE * ICON_SIZE * 2) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IconError {
    #[error("asset stream is empty")]
    Empty,
    #[error("asset is not a readable bitmap")]
    Unreadable,
    #[error("bitmap has no pixels")]
    NoPixels,
}

/// Weather icon, decoded and scaled to `ICON_SIZE` x `ICON_SIZE`. Stored as big endian RGB565.
#[derive(Clone, PartialEq, Eq)]
pub struct Icon {
    raw: [u8; ICON_BYTES],
}

impl Icon {
    /// Decode a BMP asset and scale it to the icon size without filtering.
    pub fn decode(data: &[u8]) -> Result<Self, IconError> {
        if data.is_empty() {
            return Err(IconError::Empty);
        }
        let bmp = Bmp::<Rgb>::from_slice(data).map_err(|_| IconError::Unreadable)?;
        let Size { width, height } = bmp.size();
        if width == 0 || height == 0 {
            return Err(IconError::NoPixels);
        }

        let mut icon = Self { raw: [0; ICON_BYTES] };
        // Nearest neighbour: destination column dx samples source column dx * width / ICON_SIZE,
        // so each source pixel covers a contiguous run of destination pixels.
        for Pixel(point, color) in bmp.pixels() {
            let (Ok(sx), Ok(sy)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            let (x0, x1) = covered(sx, width);
            let (y0, y1) = covered(sy, height);
            for y in y0..y1 {
                for x in x0..x1 {
                    icon.put(x, y, color);
                }
            }
        }
        Ok(icon)
    }

    /// An icon filled with a single colour.
    pub fn solid(color: Rgb) -> Self {
        let mut icon = Self { raw: [0; ICON_BYTES] };
        for y in 0..ICON_SIZE {
            for x in 0..ICON_SIZE {
                icon.put(x, y, color);
            }
        }
        icon
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= ICON_SIZE || y >= ICON_SIZE {
            return None;
        }
        let i = ((y * ICON_SIZE + x) * 2) as usize;
        let raw = u16::from_be_bytes([self.raw[i], self.raw[i + 1]]);
        Some(Rgb::from(embedded_graphics::pixelcolor::raw::RawU16::new(raw)))
    }

    pub fn draw_at<D: DrawTarget<Color = Rgb>>(&self, display: &mut D, origin: Point) -> Result<(), D::Error> {
        let raw = ImageRawBE::<Rgb>::new(&self.raw, ICON_SIZE);
        Image::new(&raw, origin).draw(display)?;
        Ok(())
    }

    fn put(&mut self, x: u32, y: u32, color: Rgb) {
        let i = ((y * ICON_SIZE + x) * 2) as usize;
        self.raw[i..i + 2].copy_from_slice(&color.to_be_bytes());
    }
}

impl OriginDimensions for Icon {
    fn size(&self) -> Size {
        Size::new(ICON_SIZE, ICON_SIZE)
    }
}

impl core::fmt::Debug for Icon {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Icon").field("size", &ICON_SIZE).finish()
    }
}

/// Range of destination indices that sample source index `src` when scaling `len` to `ICON_SIZE`.
fn covered(src: u32, len: u32) -> (u32, u32) {
    let start = (src * ICON_SIZE).div_ceil(len);
    let end = ((src + 1) * ICON_SIZE).div_ceil(len);
    (start.min(ICON_SIZE), end.min(ICON_SIZE))
}
