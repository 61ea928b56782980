use std::time::Duration;

use adsb_proto::aircraft::clip;
use adsb_proto::{Aircraft, WeatherSnapshot};
use chrono_tz::Tz;
use tracing::debug;

use crate::cadence::{RefreshCadence, RefreshMode};
use crate::format;
use crate::frame::{Font, Frame};
use crate::layout::Layout;
use crate::names::NameRegistry;

pub const TITLE: &str = "ADS-B Tracker";
pub const NO_AIRCRAFT: &str = "No aircraft nearby";

/// Vertical rate (fpm) beyond which the climb/descent arrow is drawn.
pub const CLIMB_DEADBAND_FPM: i32 = 200;

/// What the error screen needs to tell the viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorInfo {
    pub message: String,
    pub attempt: u32,
    pub retry_in: Duration,
}

/// Turns the latest snapshot into frames and decides how each is refreshed.
#[derive(Debug, Clone)]
pub struct RenderEngine {
    layout: Layout,
    names: NameRegistry,
    tz: Tz,
    cadence: RefreshCadence,
}

impl RenderEngine {
    pub fn new(layout: Layout, names: NameRegistry, tz: Tz, full_refresh_every: u32) -> Self {
        Self { layout, names, tz, cadence: RefreshCadence::new(full_refresh_every) }
    }

    /// Centered "Starting..." screen shown before the first fetch.
    pub fn splash(&mut self) -> Frame {
        let mode = self.cadence.on_splash();
        let mut f = Frame::new(mode, self.layout.width, self.layout.height);
        let text = "Starting...";
        let x = (self.layout.width as i32 - Font::Title.text_width(text)) / 2;
        f.text(x, self.layout.height as i32 / 2, Font::Title, text);
        f
    }

    /// Renders either the error screen (when `error` is set) or the aircraft
    /// list for the last good snapshot.
    pub fn render(
        &mut self,
        aircraft: &[Aircraft],
        weather: &WeatherSnapshot,
        last_timestamp_ms: u64,
        error: Option<&ErrorInfo>,
    ) -> Frame {
        match error {
            Some(err) => {
                let mode = self.cadence.on_error();
                debug!("render: error screen, attempt {}", err.attempt);
                self.error_frame(mode, err)
            }
            None => {
                let mode = self.cadence.on_data();
                debug!("render: {:?} refresh, {} aircraft", mode, aircraft.len());
                self.data_frame(mode, aircraft, weather, last_timestamp_ms)
            }
        }
    }

    fn header(&self, f: &mut Frame) {
        let l = &self.layout;
        f.text(10, l.header_baseline, Font::Title, TITLE);
        f.line(0, l.header_rule_y, l.width as i32, l.header_rule_y);
    }

    fn data_frame(&self, mode: RefreshMode, aircraft: &[Aircraft], weather: &WeatherSnapshot, ts_ms: u64) -> Frame {
        let l = &self.layout;
        let mut f = Frame::new(mode, l.width, l.height);
        self.header(&mut f);

        let count = format!("{} nearby", aircraft.len());
        let count_x = l.width as i32 - 10 - Font::Body.text_width(&count);
        f.text(count_x, l.header_baseline, Font::Body, count);

        let shown = aircraft.len().min(l.max_cards);
        if shown == 0 {
            f.text(l.placeholder.0, l.placeholder.1, Font::Body, NO_AIRCRAFT);
        }
        for (i, a) in aircraft.iter().take(shown).enumerate() {
            self.card(&mut f, i, a);
            if i + 1 < shown {
                let (_, y2) = l.card_lines(i);
                for x in (0..l.width as i32).step_by(l.separator_step) {
                    f.pixel(x, y2 + 10);
                }
            }
        }

        f.line(0, l.footer_rule_y, l.width as i32, l.footer_rule_y);
        f.text(5, l.footer_baseline, Font::Body, format::feed_time(ts_ms, self.tz));
        if weather.valid {
            f.text(l.weather_x, l.footer_baseline, Font::Body, format::weather_line(weather));
        }
        f
    }

    fn card(&self, f: &mut Frame, i: usize, a: &Aircraft) {
        let l = &self.layout;
        let (y1, y2) = l.card_lines(i);

        let ident = if a.callsign.is_empty() { "-" } else { a.callsign.as_str() };
        f.text(l.col_ident, y1, Font::Body, ident);
        f.text(
            l.col_position,
            y1,
            Font::Body,
            format!("{} {}", format::distance(a.distance_nm), format::cardinal(a.bearing_deg)),
        );
        let desc = format::description(&self.names, a, l.desc_chars, l.unknown_label);
        if !desc.is_empty() {
            f.text(l.col_detail, y1, Font::Body, desc);
        }

        let reg = if a.registration.is_empty() { "-" } else { a.registration.as_str() };
        f.text(l.col_ident, y2, Font::Body, reg);

        let alt = format::altitude(a);
        let alt_w = Font::Body.text_width(&alt);
        f.text(l.col_position, y2, Font::Body, alt);
        if !a.on_ground() {
            let ax = l.col_position + alt_w + 4;
            let ay = y2 - 4;
            if a.vertical_rate_fpm > CLIMB_DEADBAND_FPM {
                f.fill_triangle([(ax, ay - 4), (ax - 3, ay + 2), (ax + 3, ay + 2)]);
            } else if a.vertical_rate_fpm < -CLIMB_DEADBAND_FPM {
                f.fill_triangle([(ax, ay + 4), (ax - 3, ay - 2), (ax + 3, ay - 2)]);
            }
        }

        f.text(l.col_detail, y2, Font::Body, format::ground_speed(a));

        if let Some(hdg) = a.heading() {
            let card = format::cardinal(hdg as f64);
            let text = if l.heading_degrees { format!("hdg {:03} {}", hdg, card) } else { format!("hdg {}", card) };
            f.text(l.col_heading, y2, Font::Body, text);
        }
    }

    fn error_frame(&self, mode: RefreshMode, err: &ErrorInfo) -> Frame {
        let l = &self.layout;
        let mut f = Frame::new(mode, l.width, l.height);
        self.header(&mut f);

        let y = l.header_rule_y;
        f.text(10, y + 45, Font::Body, "Request failed:");
        f.text(10, y + 75, Font::Body, clip(&err.message, l.error_chars));
        f.text(10, y + 115, Font::Body, format!("Retrying in {}s...", err.retry_in.as_secs()));
        f.text(10, y + 145, Font::Body, format!("(attempt {})", err.attempt));
        f
    }
}
