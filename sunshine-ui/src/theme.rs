use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_7X13, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565 as Rgb;
use embedded_graphics::prelude::*;

/// Spacing between the time, date and temperature rows, and around the icon.
pub const MARGIN: i32 = 10;

/// Text rows drawn by the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextRole {
    Time,
    Date,
    Temperature,
}

/// Colours and fonts of the face.
#[derive(Clone, Copy)]
pub struct Theme {
    pub background: Rgb,
    pub text: Rgb,
    /// Used for text while anti-aliasing is off (low-bit ambient).
    pub ambient_text: Rgb,
    pub time_font: &'static MonoFont<'static>,
    pub date_font: &'static MonoFont<'static>,
    pub temperature_font: &'static MonoFont<'static>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            // #03A9F4
            background: Rgb::new(0x03 >> 3, 0xA9 >> 2, 0xF4 >> 3),
            text: Rgb::WHITE,
            ambient_text: Rgb::WHITE,
            time_font: &FONT_10X20,
            date_font: &FONT_7X13,
            temperature_font: &FONT_9X15,
        }
    }
}

impl Theme {
    pub fn font(&self, role: TextRole) -> &'static MonoFont<'static> {
        match role {
            TextRole::Time => self.time_font,
            TextRole::Date => self.date_font,
            TextRole::Temperature => self.temperature_font,
        }
    }

    /// Nominal text size of a row, used for vertical placement.
    pub fn text_height(&self, role: TextRole) -> i32 {
        self.font(role).character_size.height as i32
    }

    pub fn text_style(&self, role: TextRole, anti_alias: bool) -> MonoTextStyle<'static, Rgb> {
        let color = if anti_alias { self.text } else { self.ambient_text };
        MonoTextStyle::new(self.font(role), color)
    }
}
