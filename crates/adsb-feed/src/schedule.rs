use std::time::{Duration, Instant};

use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Aircraft poll interval while the feed is healthy.
    pub interval: Duration,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
    /// Weather is polled on this fixed cadence, failures or not.
    pub weather_interval: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            backoff_base: Duration::from_secs(5),
            backoff_max: Duration::from_secs(30),
            weather_interval: Duration::from_secs(600),
        }
    }
}

/// What the error screen shows after a failed aircraft poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub attempt: u32,
    pub retry_in: Duration,
}

/// Decides when each feed is due and tracks consecutive aircraft failures.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    cfg: PollConfig,
    failures: u32,
    last_aircraft: Option<Instant>,
    last_weather: Option<Instant>,
}

impl PollScheduler {
    pub fn new(cfg: PollConfig) -> Self {
        Self { cfg, failures: 0, last_aircraft: None, last_weather: None }
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Base interval when healthy, otherwise base_backoff * 2^(failures-1) capped.
    pub fn aircraft_interval(&self) -> Duration {
        if self.failures == 0 {
            return self.cfg.interval;
        }
        let factor = 1u32.checked_shl(self.failures - 1).unwrap_or(u32::MAX);
        self.cfg.backoff_base.saturating_mul(factor).min(self.cfg.backoff_max)
    }

    pub fn weather_interval(&self) -> Duration {
        self.cfg.weather_interval
    }

    /// A feed that was never polled is due immediately.
    pub fn aircraft_due(&self, now: Instant) -> bool {
        due(self.last_aircraft, self.aircraft_interval(), now)
    }

    pub fn weather_due(&self, now: Instant) -> bool {
        due(self.last_weather, self.cfg.weather_interval, now)
    }

    pub fn on_aircraft_success(&mut self, now: Instant) {
        if self.failures > 0 {
            debug!("poll: feed recovered after {} failures", self.failures);
        }
        self.failures = 0;
        self.last_aircraft = Some(now);
    }

    pub fn on_aircraft_failure(&mut self, now: Instant) -> Backoff {
        self.failures = self.failures.saturating_add(1);
        self.last_aircraft = Some(now);
        let retry_in = self.aircraft_interval();
        warn!("poll: aircraft fetch failed (failures: {}), backing off {}s", self.failures, retry_in.as_secs());
        Backoff { attempt: self.failures, retry_in }
    }

    pub fn on_weather_polled(&mut self, now: Instant) {
        self.last_weather = Some(now);
    }
}

fn due(last: Option<Instant>, interval: Duration, now: Instant) -> bool {
    match last {
        None => true,
        Some(t) => now.saturating_duration_since(t) >= interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn sched() -> PollScheduler {
        PollScheduler::new(PollConfig {
            interval: secs(30),
            backoff_base: secs(5),
            backoff_max: secs(60),
            weather_interval: secs(600),
        })
    }

    #[test]
    fn backoff_doubles_then_caps_and_resets() {
        let mut s = sched();
        let t0 = Instant::now();
        assert_eq!(s.aircraft_interval(), secs(30));

        let expected = [5, 10, 20, 40, 60, 60];
        for (i, want) in expected.iter().enumerate() {
            let b = s.on_aircraft_failure(t0);
            assert_eq!(b.attempt, i as u32 + 1);
            assert_eq!(b.retry_in, secs(*want));
            assert_eq!(s.aircraft_interval(), secs(*want));
        }

        s.on_aircraft_success(t0);
        assert_eq!(s.failures(), 0);
        assert_eq!(s.aircraft_interval(), secs(30));
    }

    #[test]
    fn firmware_defaults_cap_at_thirty_seconds() {
        let mut s = PollScheduler::new(PollConfig::default());
        let t0 = Instant::now();
        let got: Vec<u64> = (0..4).map(|_| s.on_aircraft_failure(t0).retry_in.as_secs()).collect();
        assert_eq!(got, vec![5, 10, 20, 30]);
    }

    #[test]
    fn huge_failure_counts_do_not_overflow() {
        let mut s = sched();
        s.failures = 200;
        assert_eq!(s.aircraft_interval(), secs(60));
        s.failures = u32::MAX;
        s.on_aircraft_failure(Instant::now());
        assert_eq!(s.failures(), u32::MAX);
    }

    #[test]
    fn due_tracks_elapsed_time_per_feed() {
        let mut s = sched();
        let t0 = Instant::now();
        assert!(s.aircraft_due(t0));
        assert!(s.weather_due(t0));

        s.on_aircraft_success(t0);
        s.on_weather_polled(t0);
        assert!(!s.aircraft_due(t0 + secs(29)));
        assert!(s.aircraft_due(t0 + secs(30)));
        assert!(!s.weather_due(t0 + secs(599)));
        assert!(s.weather_due(t0 + secs(600)));

        s.on_aircraft_failure(t0 + secs(30));
        assert!(!s.aircraft_due(t0 + secs(34)));
        assert!(s.aircraft_due(t0 + secs(35)));
    }

    #[test]
    fn weather_interval_ignores_aircraft_failures() {
        let mut s = sched();
        let t0 = Instant::now();
        for _ in 0..5 {
            s.on_aircraft_failure(t0);
        }
        assert_eq!(s.weather_interval(), secs(600));
    }
}
