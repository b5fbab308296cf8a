use embedded_graphics::pixelcolor::Rgb565 as Rgb;
use embedded_graphics::prelude::*;
use sunshine_ui::{DisplayMode, RenderState, Theme, WeatherView};

use crate::clock;
use crate::config::{FaceConfig, WatchFaceStyle};
use crate::device::{DataLayer, Host, TimeZone, TimeZones};
use crate::fetch::{FetchRequest, FetchedIcon, Generation};
use crate::sync::{apply_weather, DataEvent, DataEventBatch, EventKind, IconUpdate};
use crate::timer::{TickTimer, TickToken, TimerCommand};

/// Everything the host tells the face.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaceEvent {
    Created,
    Destroyed,
    SurfaceChanged { width: u32, height: u32 },
    VisibilityChanged(bool),
    AmbientModeChanged(bool),
    PropertiesChanged { low_bit_ambient: bool },
    WindowInsets { is_round: bool },
    /// Once a minute, also while ambient.
    TimeTick,
    TimeZoneChanged(TimeZone),
    SyncConnected,
    /// The data layer lost its connection, and with it the listener.
    SyncSuspended,
    DataChanged(DataEventBatch),
}

/// The weather watch face.
pub struct WeatherFace<H, Z, L> {
    host: H,
    zones: Z,
    data: L,
    config: FaceConfig,
    theme: Theme,
    render: RenderState,

    visible: bool,
    ambient: bool,
    low_bit_ambient: bool,
    is_round: bool,
    zone: TimeZone,
    zone_registered: bool,
    listening: bool,
    redraw: bool,

    timer: TickTimer,
    generation: Generation,
    fetch: Option<FetchRequest>,
}

impl<H, Z, L> WeatherFace<H, Z, L>
where
    H: Host,
    Z: TimeZones,
    L: DataLayer,
{
    pub fn new(host: H, zones: Z, data: L, config: FaceConfig) -> Self {
        Self {
            host,
            zones,
            data,
            config,
            theme: Theme::default(),
            render: RenderState::new(),
            visible: false,
            ambient: false,
            low_bit_ambient: false,
            is_round: false,
            zone: TimeZone::utc(),
            zone_registered: false,
            listening: false,
            redraw: false,
            timer: TickTimer::new(config.tick_period),
            generation: Generation::default(),
            fetch: None,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn handle(&mut self, event: FaceEvent) {
        match event {
            FaceEvent::Created => self.on_create(),
            FaceEvent::Destroyed => self.on_destroy(),
            FaceEvent::SurfaceChanged { width, height } => self.on_surface_changed(width, height),
            FaceEvent::VisibilityChanged(visible) => self.on_visibility_changed(visible),
            FaceEvent::AmbientModeChanged(ambient) => self.on_ambient_mode_changed(ambient),
            FaceEvent::PropertiesChanged { low_bit_ambient } => self.on_properties_changed(low_bit_ambient),
            FaceEvent::WindowInsets { is_round } => self.on_apply_window_insets(is_round),
            FaceEvent::TimeTick => self.on_time_tick(),
            FaceEvent::TimeZoneChanged(zone) => self.on_time_zone_changed(zone),
            FaceEvent::SyncConnected => self.on_connected(),
            FaceEvent::SyncSuspended => self.on_connection_suspended(),
            FaceEvent::DataChanged(batch) => self.on_data_changed(&batch),
        }
    }

    pub fn on_create(&mut self) {
        info!("weather face created");
        self.host.set_style(WatchFaceStyle::default());
    }

    pub fn on_destroy(&mut self) {
        info!("weather face destroyed");
        self.timer.update(false);
        self.drop_pending_fetch();
    }

    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        debug!("surface {}x{}", width, height);
        self.invalidate();
    }

    pub fn on_visibility_changed(&mut self, visible: bool) {
        debug!("visible = {}", visible);
        self.visible = visible;
        if visible {
            self.register_zone_receiver();
            debug!("connecting data layer");
            self.data.connect();
            // The zone may have changed while the broadcast was not subscribed.
            self.zone = self.zones.current();
        } else {
            self.unregister_zone_receiver();
            if self.data.is_connected() {
                self.remove_listener();
                self.data.disconnect();
            }
            // A layer that lost its connection also lost its listener.
            self.listening = false;
            self.drop_pending_fetch();
        }
        self.update_timer();
    }

    pub fn on_ambient_mode_changed(&mut self, ambient: bool) {
        if self.ambient != ambient {
            debug!("ambient = {}", ambient);
            self.ambient = ambient;
            self.invalidate();
        }
        self.update_timer();
    }

    pub fn on_properties_changed(&mut self, low_bit_ambient: bool) {
        self.low_bit_ambient = low_bit_ambient;
    }

    pub fn on_apply_window_insets(&mut self, is_round: bool) {
        self.is_round = is_round;
    }

    pub fn on_time_tick(&mut self) {
        self.invalidate();
    }

    pub fn on_time_zone_changed(&mut self, zone: TimeZone) {
        debug!("time zone {}", zone.id.as_str());
        self.zone = zone;
    }

    pub fn on_connected(&mut self) {
        debug!("data layer connected");
        if !self.listening {
            self.listening = true;
            self.data.add_listener();
        }
    }

    pub fn on_connection_suspended(&mut self) {
        debug!("data layer connection suspended");
        self.listening = false;
    }

    pub fn on_data_changed(&mut self, events: &[DataEvent]) {
        if !self.listening {
            debug!("ignoring {} data events, not listening", events.len());
            return;
        }
        let mut matched = false;
        for event in events {
            if event.kind != EventKind::Changed {
                continue;
            }
            debug!("data item path {}", event.path.as_str());
            if event.path.as_str() != self.config.weather_path {
                continue;
            }
            matched = true;
            match apply_weather(&self.config, &event.map, &mut self.render) {
                IconUpdate::Fetch(asset) => {
                    if self.data.is_connected() {
                        self.generation = self.generation.next();
                        self.fetch = Some(FetchRequest {
                            generation: self.generation,
                            asset,
                        });
                    } else {
                        warn!("data layer disconnected, icon {} skipped", asset.digest());
                    }
                }
                IconUpdate::Unusable | IconUpdate::None => {}
            }
        }
        if matched {
            self.invalidate();
        }
    }

    /// Apply a finished icon fetch. Returns whether the icon was taken.
    pub fn on_icon_fetched(&mut self, fetched: FetchedIcon) -> bool {
        if fetched.generation != self.generation {
            debug!("dropping stale icon");
            return false;
        }
        match fetched.result {
            Ok(icon) => {
                self.render.set_icon(icon);
                self.invalidate();
                true
            }
            Err(_) => false,
        }
    }

    /// Handle an interactive tick at wall-clock time `now_ms`. Returns whether it was current.
    pub fn on_tick(&mut self, token: TickToken, now_ms: u64) -> bool {
        let current = self.timer.fire(token, now_ms);
        if current {
            self.invalidate();
        }
        current
    }

    /// Paint the face for wall-clock time `now_ms`.
    pub fn draw<D: DrawTarget<Color = Rgb>>(&mut self, display: &mut D, now_ms: u64) -> Result<(), D::Error> {
        self.redraw = false;
        self.render.refresh_clock(clock::local(now_ms, self.zone.offset));
        WeatherView::new(&self.render, self.display_mode(), &self.theme).draw(display)
    }

    /// Whether a repaint was requested since the last call.
    pub fn take_redraw(&mut self) -> bool {
        core::mem::take(&mut self.redraw)
    }

    pub fn take_timer_command(&mut self) -> Option<TimerCommand> {
        self.timer.take_command()
    }

    pub fn take_fetch_request(&mut self) -> Option<FetchRequest> {
        self.fetch.take()
    }

    pub fn display_mode(&self) -> DisplayMode {
        DisplayMode {
            ambient: self.ambient,
            low_bit_ambient: self.low_bit_ambient,
        }
    }

    pub fn render_state(&self) -> &RenderState {
        &self.render
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    pub fn is_round(&self) -> bool {
        self.is_round
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn time_zone(&self) -> &TimeZone {
        &self.zone
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn zones(&self) -> &Z {
        &self.zones
    }

    pub fn data(&self) -> &L {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut L {
        &mut self.data
    }

    fn should_timer_run(&self) -> bool {
        self.visible && !self.ambient
    }

    fn update_timer(&mut self) {
        self.timer.update(self.should_timer_run());
    }

    fn invalidate(&mut self) {
        self.redraw = true;
        self.host.invalidate();
    }

    fn drop_pending_fetch(&mut self) {
        self.generation = self.generation.next();
        self.fetch = None;
    }

    fn register_zone_receiver(&mut self) {
        if self.zone_registered {
            return;
        }
        self.zone_registered = true;
        self.zones.register();
    }

    fn unregister_zone_receiver(&mut self) {
        if !self.zone_registered {
            return;
        }
        self.zone_registered = false;
        self.zones.unregister();
    }

    fn remove_listener(&mut self) {
        if !self.listening {
            return;
        }
        self.listening = false;
        self.data.remove_listener();
    }
}
