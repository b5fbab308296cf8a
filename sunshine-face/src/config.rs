//! Watch face configuration and the keys understood from the companion.

use embassy_time::Duration;

/// Data path the companion publishes weather under.
pub const WEATHER_PATH: &str = "/weather";

pub const KEY_HIGH: &str = "HIGH";
pub const KEY_LOW: &str = "LOW";
pub const KEY_ICON: &str = "ICON";

/// Interval of the interactive tick.
pub const INTERACTIVE_UPDATE_RATE: Duration = Duration::from_millis(1000);

/// Largest icon asset accepted from the companion, in bytes.
pub const ASSET_BUFFER_LEN: usize = 16 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct FaceConfig {
    pub weather_path: &'static str,
    /// Text key of the high temperature.
    pub high_key: &'static str,
    /// Text key of the low temperature.
    pub low_key: &'static str,
    /// Asset key of the weather icon.
    pub icon_key: &'static str,
    pub tick_period: Duration,
}

impl Default for FaceConfig {
    fn default() -> Self {
        Self {
            weather_path: WEATHER_PATH,
            high_key: KEY_HIGH,
            low_key: KEY_LOW,
            icon_key: KEY_ICON,
            tick_period: INTERACTIVE_UPDATE_RATE,
        }
    }
}

/// Presentation hints handed to the host when the face is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchFaceStyle {
    pub peek_mode: PeekMode,
    pub background_visibility: BackgroundVisibility,
    pub show_system_ui_time: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeekMode {
    Short,
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BackgroundVisibility {
    Interruptive,
    Persistent,
}

impl Default for WatchFaceStyle {
    fn default() -> Self {
        Self {
            peek_mode: PeekMode::Variable,
            background_visibility: BackgroundVisibility::Interruptive,
            show_system_ui_time: false,
        }
    }
}
