#![cfg_attr(not(test), no_std)]

use embedded_graphics::pixelcolor::Rgb565 as Rgb;
use embedded_graphics::prelude::DrawTarget;

mod icon;
pub mod scene;
mod state;
mod theme;

pub use icon::{Icon, IconError, ICON_SIZE};
pub use scene::{compose, render, DisplayMode, DrawCommand, Scene};
pub use state::{RenderState, Temperature, TEMPERATURE_LEN};
pub use theme::{TextRole, Theme, MARGIN};

/// The weather face for one frame.
pub struct WeatherView<'a> {
    state: &'a RenderState,
    mode: DisplayMode,
    theme: &'a Theme,
}

impl<'a> WeatherView<'a> {
    pub fn new(state: &'a RenderState, mode: DisplayMode, theme: &'a Theme) -> Self {
        Self { state, mode, theme }
    }

    pub fn draw<D: DrawTarget<Color = Rgb>>(&self, display: &mut D) -> Result<(), D::Error> {
        let scene = compose(display.bounding_box(), self.mode, self.state, self.theme);
        render(&scene, self.theme, display)
    }
}
