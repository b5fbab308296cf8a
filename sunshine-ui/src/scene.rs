//! Layout of the weather face as a list of draw commands.
//!
//! [`compose`] is a pure function of the bounds, the display mode and the render state. Nothing is
//! cached between frames: every text width is measured again when composing.

use embedded_graphics::pixelcolor::Rgb565 as Rgb;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};

use crate::icon::{Icon, ICON_SIZE};
use crate::state::RenderState;
use crate::theme::{TextRole, Theme, MARGIN};

pub type SceneText = heapless::String<40>;

/// Upper bound on commands in a frame: background, date, time, temperature, icon.
pub const MAX_COMMANDS: usize = 5;

pub type Scene<'a> = heapless::Vec<DrawCommand<'a>, MAX_COMMANDS>;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand<'a> {
    Clear(Rgb),
    FillRect {
        area: Rectangle,
        color: Rgb,
    },
    /// `origin` is the left end of the alphabetic baseline.
    Text {
        role: TextRole,
        text: SceneText,
        origin: Point,
        anti_alias: bool,
    },
    Icon {
        icon: &'a Icon,
        origin: Point,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayMode {
    pub ambient: bool,
    /// The panel supports fewer bits per colour while ambient.
    pub low_bit_ambient: bool,
}

impl DisplayMode {
    pub fn interactive() -> Self {
        Self::default()
    }

    pub fn ambient() -> Self {
        Self {
            ambient: true,
            low_bit_ambient: false,
        }
    }

    pub fn anti_alias(&self) -> bool {
        !(self.ambient && self.low_bit_ambient)
    }
}

pub fn compose<'a>(bounds: Rectangle, mode: DisplayMode, state: &'a RenderState, theme: &Theme) -> Scene<'a> {
    let mut scene = Scene::new();
    let center = bounds.center();
    let anti_alias = mode.anti_alias();

    let background = if mode.ambient {
        DrawCommand::Clear(Rgb::BLACK)
    } else {
        DrawCommand::FillRect {
            area: Rectangle::new(Point::zero(), bounds.size),
            color: theme.background,
        }
    };
    push(&mut scene, background);

    let date_h = theme.text_height(TextRole::Date);
    let date_w = text_width(theme, TextRole::Date, state.date_text());
    push(
        &mut scene,
        text(
            TextRole::Date,
            state.date_text(),
            Point::new(center.x - date_w / 2, center.y - date_h / 2),
            anti_alias,
        ),
    );

    let time_h = theme.text_height(TextRole::Time);
    let time_w = text_width(theme, TextRole::Time, state.time_text());
    push(
        &mut scene,
        text(
            TextRole::Time,
            state.time_text(),
            Point::new(center.x - time_w / 2, center.y - date_h / 2 - time_h / 2 - MARGIN),
            anti_alias,
        ),
    );

    if let Some((high, low)) = state.temperature() {
        let mut line = SceneText::new();
        let _ = line.push_str(high);
        let _ = line.push(' ');
        let _ = line.push_str(low);

        let temp_h = theme.text_height(TextRole::Temperature);
        let temp_w = text_width(theme, TextRole::Temperature, &line);
        let origin = Point::new(
            center.x - temp_w / 2 + MARGIN * 3,
            center.y + date_h / 2 + temp_h / 2 + MARGIN,
        );

        push(
            &mut scene,
            DrawCommand::Text {
                role: TextRole::Temperature,
                text: line,
                origin,
                anti_alias,
            },
        );

        if !mode.ambient {
            if let Some(icon) = state.icon() {
                let size = ICON_SIZE as i32;
                let icon_origin = Point::new(
                    origin.x - size - MARGIN,
                    origin.y - temp_h / 2 - size / 2 + MARGIN,
                );
                push(
                    &mut scene,
                    DrawCommand::Icon {
                        icon,
                        origin: icon_origin,
                    },
                );
            }
        }
    }

    scene
}

pub fn render<D: DrawTarget<Color = Rgb>>(scene: &Scene<'_>, theme: &Theme, display: &mut D) -> Result<(), D::Error> {
    for command in scene {
        match command {
            DrawCommand::Clear(color) => display.clear(*color)?,
            DrawCommand::FillRect { area, color } => {
                area.into_styled(PrimitiveStyle::with_fill(*color)).draw(display)?;
            }
            DrawCommand::Text {
                role,
                text,
                origin,
                anti_alias,
            } => {
                Text::with_baseline(text.as_str(), *origin, theme.text_style(*role, *anti_alias), Baseline::Alphabetic)
                    .draw(display)?;
            }
            DrawCommand::Icon { icon, origin } => icon.draw_at(display, *origin)?,
        }
    }
    Ok(())
}

fn text_width(theme: &Theme, role: TextRole, text: &str) -> i32 {
    theme
        .text_style(role, true)
        .measure_string(text, Point::zero(), Baseline::Alphabetic)
        .bounding_box
        .size
        .width as i32
}

fn text<'a>(role: TextRole, value: &str, origin: Point, anti_alias: bool) -> DrawCommand<'a> {
    let mut text = SceneText::new();
    let _ = text.push_str(value);
    DrawCommand::Text {
        role,
        text,
        origin,
        anti_alias,
    }
}

fn push<'a>(scene: &mut Scene<'a>, command: DrawCommand<'a>) {
    // MAX_COMMANDS covers every branch of compose.
    let _ = scene.push(command);
}
