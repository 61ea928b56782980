use anyhow::{Context, Result};

use crate::schedule::PollConfig;
use crate::Observer;

pub fn check_observer(obs: &Observer) -> Result<()> {
    anyhow::ensure!(obs.lat.abs() <= 90.0 && obs.lon.abs() <= 180.0, "observer coordinates invalid");
    anyhow::ensure!(obs.radius_nm >= 1 && obs.radius_nm <= 250, "observer.radius_nm should be 1..250");
    Ok(())
}

pub fn check_poll(cfg: &PollConfig) -> Result<()> {
    anyhow::ensure!(cfg.interval.as_secs() >= 5, "poll.interval_s too low; feeds rate-limit below 5s");
    anyhow::ensure!(cfg.backoff_base.as_secs() >= 1, "poll.backoff_base_s must be >= 1");
    anyhow::ensure!(cfg.backoff_max >= cfg.backoff_base, "poll.backoff_max_s must be >= poll.backoff_base_s");
    anyhow::ensure!(cfg.weather_interval.as_secs() >= 60, "weather.interval_s too low; met.no asks for >= 60s");
    Ok(())
}

pub fn check_url(name: &str, url: &str) -> Result<()> {
    let u = reqwest::Url::parse(url).with_context(|| format!("{} is not a url: {}", name, url))?;
    anyhow::ensure!(matches!(u.scheme(), "http" | "https"), "{} must be http(s): {}", name, url);
    anyhow::ensure!(u.host_str().is_some(), "{} has no host: {}", name, url);
    Ok(())
}
