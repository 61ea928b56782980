use serde::{Deserialize, Serialize};

pub const SYMBOL_MAX: usize = 31;

/// Current conditions at the observer.
///
/// `valid` flips to true with the first successful fetch and stays true:
/// a failed fetch keeps serving the previous snapshot, however old.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub wind_speed_ms: f64,
    pub wind_from_deg: f64,
    pub symbol: String,     // met.no symbol code, e.g. "partlycloudy_day"
    pub valid: bool,
}

impl WeatherSnapshot {
    /// Wind speed in whole knots.
    pub fn wind_knots(&self) -> i32 {
        (self.wind_speed_ms * 1.94384).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wind_converts_to_rounded_knots() {
        let w = WeatherSnapshot { wind_speed_ms: 5.0, ..Default::default() };
        assert_eq!(w.wind_knots(), 10);
        let calm = WeatherSnapshot::default();
        assert_eq!(calm.wind_knots(), 0);
    }

    #[test]
    fn default_snapshot_is_invalid() {
        assert!(!WeatherSnapshot::default().valid);
    }
}
