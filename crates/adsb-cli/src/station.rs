use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, warn};

use adsb_feed::{FeedClient, Observer, PollConfig, PollScheduler, Transport, WeatherClient};
use adsb_proto::{Aircraft, WeatherSnapshot};
use adsb_render::{DrawSink, ErrorInfo, RefreshMode, RenderEngine};

/// What one tick did, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub link_ok: bool,
    pub aircraft_polled: bool,
    pub aircraft_ok: bool,
    pub weather_polled: bool,
    pub rendered: Option<RefreshMode>,
}

/// Everything the display loop owns: feed clients, poll timing, the last
/// good snapshot and the panel.
pub struct Station<T: Transport, S: DrawSink> {
    observer: Observer,
    transport: Arc<T>,
    feed: FeedClient<T>,
    weather_client: WeatherClient<T>,
    sched: PollScheduler,
    engine: RenderEngine,
    sink: S,

    aircraft: Vec<Aircraft>,
    weather: WeatherSnapshot,
    last_timestamp_ms: u64,
    last_error: Option<ErrorInfo>,
}

impl<T: Transport, S: DrawSink> Station<T, S> {
    pub fn new(
        observer: Observer,
        transport: Arc<T>,
        feed_url: &str,
        weather_url: &str,
        poll: PollConfig,
        engine: RenderEngine,
        sink: S,
    ) -> Self {
        Self {
            observer,
            feed: FeedClient::new(transport.clone(), feed_url),
            weather_client: WeatherClient::new(transport.clone(), weather_url),
            transport,
            sched: PollScheduler::new(poll),
            engine,
            sink,
            aircraft: Vec::new(),
            weather: WeatherSnapshot::default(),
            last_timestamp_ms: 0,
            last_error: None,
        }
    }

    /// Paints the startup screen.
    pub fn start(&mut self) -> Result<()> {
        let frame = self.engine.splash();
        frame.paint(&mut self.sink).context("paint splash")
    }

    /// One pass of the control loop. Fetch failures are absorbed into state;
    /// only sink failures surface as errors.
    pub async fn tick(&mut self, now: Instant) -> Result<TickReport> {
        let mut report = TickReport::default();

        if !self.transport.link_up() {
            warn!("station: link down, reconnecting");
            if let Err(e) = self.transport.reconnect().await {
                warn!("station: reconnect failed: {}", e.detail());
                return Ok(report);
            }
            info!("station: link restored");
        }
        report.link_ok = true;

        let obs = self.observer;
        if self.sched.aircraft_due(now) {
            report.aircraft_polled = true;
            match self.feed.fetch(obs.lat, obs.lon, obs.radius_nm).await {
                Ok(snap) => {
                    self.aircraft = snap.aircraft;
                    self.last_timestamp_ms = snap.timestamp_ms;
                    self.last_error = None;
                    self.sched.on_aircraft_success(now);
                    report.aircraft_ok = true;
                }
                Err(e) => {
                    warn!("station: aircraft fetch failed: {}", e.detail());
                    let b = self.sched.on_aircraft_failure(now);
                    self.last_error = Some(ErrorInfo { message: e.to_string(), attempt: b.attempt, retry_in: b.retry_in });
                }
            }
        }

        if self.sched.weather_due(now) {
            report.weather_polled = true;
            self.sched.on_weather_polled(now);
            match self.weather_client.fetch(obs.lat, obs.lon).await {
                Ok(w) => self.weather = w,
                Err(e) => warn!("station: weather fetch failed, keeping last: {}", e.detail()),
            }
        }

        if report.aircraft_polled {
            let frame = self.engine.render(&self.aircraft, &self.weather, self.last_timestamp_ms, self.last_error.as_ref());
            frame.paint(&mut self.sink).context("paint frame")?;
            report.rendered = Some(frame.refresh);
        }
        Ok(report)
    }

    pub fn aircraft(&self) -> &[Aircraft] {
        &self.aircraft
    }

    pub fn weather(&self) -> &WeatherSnapshot {
        &self.weather
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &PollScheduler {
        &self.sched
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        &self.sink
    }
}
