use embassy_futures::select::{select3, Either3};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Receiver;
use embassy_sync::signal::Signal;
use embassy_time::{Instant, Timer};
use embedded_graphics::pixelcolor::Rgb565 as Rgb;
use embedded_graphics::prelude::*;

use crate::clock::Clock;
use crate::device::{DataLayer, Host, TimeZones};
use crate::fetch::{FetchRequest, FetchedIcon};
use crate::state::{FaceEvent, WeatherFace};
use crate::timer::{TickToken, TimerCommand};

/// Channels between the render loop and the rest of the watch.
///
/// Requests and icons are signals: only the latest fetch matters, so a pending one is replaced
/// instead of queued.
pub struct Channels<'a, M: RawMutex, const E: usize> {
    pub events: Receiver<'a, M, FaceEvent, E>,
    pub requests: &'a Signal<M, FetchRequest>,
    pub icons: &'a Signal<M, FetchedIcon>,
}

/// Render loop: feeds host events, ticks and fetched icons into `face` and paints whenever it asks.
/// Returns after `FaceEvent::Destroyed`.
pub async fn run<H, Z, L, D, M, const E: usize>(
    face: &mut WeatherFace<H, Z, L>,
    display: &mut D,
    clock: &Clock<M>,
    channels: Channels<'_, M, E>,
) -> Result<(), D::Error>
where
    H: Host,
    Z: TimeZones,
    L: DataLayer,
    D: DrawTarget<Color = Rgb>,
    M: RawMutex,
{
    let mut armed: Option<(TickToken, Instant)> = None;
    let mut destroyed = false;
    loop {
        while let Some(command) = face.take_timer_command() {
            armed = match command {
                TimerCommand::Arm { token, delay } => Some((token, Instant::now() + delay)),
                TimerCommand::Disarm => None,
            };
        }
        if let Some(request) = face.take_fetch_request() {
            channels.requests.signal(request);
        }
        if face.take_redraw() {
            face.draw(display, clock.now_millis())?;
        }
        if destroyed {
            return Ok(());
        }

        let tick = async move {
            match armed {
                Some((token, at)) => {
                    Timer::at(at).await;
                    token
                }
                None => core::future::pending().await,
            }
        };

        // Icons first, a steady stream of events must not starve them.
        let next = select3(channels.icons.wait(), tick, channels.events.receive()).await;
        match next {
            Either3::First(icon) => {
                face.on_icon_fetched(icon);
            }
            Either3::Second(token) => {
                armed = None;
                face.on_tick(token, clock.now_millis());
            }
            Either3::Third(event) => {
                destroyed = event == FaceEvent::Destroyed;
                face.handle(event);
            }
        }
    }
}
