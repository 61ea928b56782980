use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use adsb_feed::{Observer, PollConfig};
use adsb_render::LayoutKind;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub observer: Observer,
    #[serde(default)]
    pub feed: FeedCfg,
    #[serde(default)]
    pub weather: WeatherCfg,
    #[serde(default)]
    pub poll: PollCfg,
    #[serde(default)]
    pub display: DisplayCfg,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FeedCfg {
    pub base_url: String,
    pub timeout_s: u64,
}

impl Default for FeedCfg {
    fn default() -> Self {
        Self { base_url: "https://api.adsb.lol/v2/point".into(), timeout_s: 30 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WeatherCfg {
    pub base_url: String,
    pub interval_s: u64,
}

impl Default for WeatherCfg {
    fn default() -> Self {
        Self {
            base_url: "https://api.met.no/weatherapi/locationforecast/2.0/compact".into(),
            interval_s: 600,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollCfg {
    pub interval_s: u64,
    pub backoff_base_s: u64,
    pub backoff_max_s: u64,
    pub tick_ms: u64,
}

impl Default for PollCfg {
    fn default() -> Self {
        Self { interval_s: 30, backoff_base_s: 5, backoff_max_s: 30, tick_ms: 1000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    Log,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DisplayCfg {
    pub layout: LayoutKind,
    pub full_refresh_every: u32,
    pub timezone: String,
    pub sink: SinkKind,
    pub frame_path: Option<String>,
    pub names_path: Option<String>,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            layout: LayoutKind::Panel420,
            full_refresh_every: 15,
            timezone: "Europe/London".into(),
            sink: SinkKind::Log,
            frame_path: None,
            names_path: None,
        }
    }
}

impl Config {
    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll.interval_s),
            backoff_base: Duration::from_secs(self.poll.backoff_base_s),
            backoff_max: Duration::from_secs(self.poll.backoff_max_s),
            weather_interval: Duration::from_secs(self.weather.interval_s),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.poll.tick_ms.max(10))
    }
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config toml")
}

pub fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).with_context(|| format!("read config {}", path))?;
    parse_config(&s)
}
