#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod clock;
pub mod codec;
pub mod config;
pub mod device;
mod error;
pub mod fetch;
mod runner;
mod state;
pub mod sync;
pub mod timer;

pub use clock::Clock;
pub use config::{FaceConfig, WatchFaceStyle};
pub use device::{AssetSource, DataLayer, Host, TimeZone, TimeZones};
pub use error::{CodecError, FetchError};
pub use fetch::{fetch_icon, fetch_icons, FetchRequest, FetchedIcon, Generation};
pub use runner::{run, Channels};
pub use state::{FaceEvent, WeatherFace};
pub use sync::{Asset, DataEvent, DataEventBatch, DataMap, DataValue, EventKind};
pub use timer::{TickToken, TimerCommand};
