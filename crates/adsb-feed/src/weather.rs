use std::sync::Arc;

use adsb_proto::aircraft::clip;
use adsb_proto::weather::SYMBOL_MAX;
use adsb_proto::WeatherSnapshot;
use serde::Deserialize;
use tracing::info;

use crate::error::FetchError;
use crate::transport::Transport;

// met.no locationforecast "compact": only the fields we read
#[derive(Debug, Deserialize)]
struct Forecast {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    timeseries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    data: EntryData,
}

#[derive(Debug, Default, Deserialize)]
struct EntryData {
    #[serde(default)]
    instant: Instant,
    next_1_hours: Option<NextHours>,
}

#[derive(Debug, Default, Deserialize)]
struct Instant {
    #[serde(default)]
    details: Details,
}

#[derive(Debug, Default, Deserialize)]
struct Details {
    air_temperature: Option<f64>,
    wind_speed: Option<f64>,
    wind_from_direction: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct NextHours {
    summary: Option<Summary>,
}

#[derive(Debug, Deserialize)]
struct Summary {
    symbol_code: Option<String>,
}

pub struct WeatherClient<T> {
    transport: Arc<T>,
    base_url: String,
}

impl<T: Transport> WeatherClient<T> {
    pub fn new(transport: Arc<T>, base_url: impl Into<String>) -> Self {
        Self { transport, base_url: base_url.into() }
    }

    pub fn url(&self, lat: f64, lon: f64) -> String {
        format!("{}?lat={:.4}&lon={:.4}", self.base_url, lat, lon)
    }

    /// Current conditions from the first time-series entry.
    pub async fn fetch(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot, FetchError> {
        let body = self.transport.get(&self.url(lat, lon)).await?;
        let w = parse(&body)?;
        info!("weather: {:.1}C, {:.1}m/s from {:.0}, {}", w.temperature_c, w.wind_speed_ms, w.wind_from_deg, w.symbol);
        Ok(w)
    }
}

pub fn parse(body: &[u8]) -> Result<WeatherSnapshot, FetchError> {
    let forecast: Forecast = serde_json::from_slice(body)?;
    let current = forecast
        .properties
        .timeseries
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Parse("empty timeseries".into()))?
        .data;

    let d = current.instant.details;
    let symbol = current
        .next_1_hours
        .and_then(|n| n.summary)
        .and_then(|s| s.symbol_code)
        .unwrap_or_else(|| "unknown".to_string());

    Ok(WeatherSnapshot {
        temperature_c: d.air_temperature.unwrap_or(0.0),
        wind_speed_ms: d.wind_speed.unwrap_or(0.0),
        wind_from_deg: d.wind_from_direction.unwrap_or(0.0),
        symbol: clip(&symbol, SYMBOL_MAX),
        valid: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ReplayTransport;

    const SAMPLE: &str = r#"{
        "type": "Feature",
        "geometry": {"type": "Point", "coordinates": [-0.1278, 51.5074, 11]},
        "properties": {
            "meta": {"updated_at": "2026-10-18T09:12:44Z"},
            "timeseries": [
                {
                    "time": "2026-10-18T10:00:00Z",
                    "data": {
                        "instant": {"details": {"air_pressure_at_sea_level": 1012.3, "air_temperature": 13.6,
                                                "wind_from_direction": 231.4, "wind_speed": 5.0}},
                        "next_1_hours": {"summary": {"symbol_code": "lightrain"}, "details": {"precipitation_amount": 0.3}}
                    }
                },
                {
                    "time": "2026-10-18T11:00:00Z",
                    "data": {"instant": {"details": {"air_temperature": 99.0}}}
                }
            ]
        }
    }"#;

    #[test]
    fn reads_first_entry() {
        let w = parse(SAMPLE.as_bytes()).unwrap();
        assert!(w.valid);
        assert_eq!(w.temperature_c, 13.6);
        assert_eq!(w.wind_speed_ms, 5.0);
        assert_eq!(w.wind_from_deg, 231.4);
        assert_eq!(w.symbol, "lightrain");
        assert_eq!(w.wind_knots(), 10);
    }

    #[test]
    fn missing_fields_default() {
        let w = parse(br#"{"properties": {"timeseries": [{"data": {}}]}}"#).unwrap();
        assert!(w.valid);
        assert_eq!(w.temperature_c, 0.0);
        assert_eq!(w.symbol, "unknown");
    }

    #[test]
    fn empty_or_malformed_is_parse_error() {
        assert!(matches!(parse(br#"{"properties": {"timeseries": []}}"#), Err(FetchError::Parse(_))));
        assert!(matches!(parse(br#"{"type": "Feature"}"#), Err(FetchError::Parse(_))));
        assert!(matches!(parse(b""), Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn fetch_builds_query_url() {
        let t = Arc::new(ReplayTransport::new());
        t.push_body("https://api.met.no", SAMPLE);
        let client = WeatherClient::new(t.clone(), "https://api.met.no/weatherapi/locationforecast/2.0/compact");

        let w = client.fetch(51.5074, -0.1278).await.unwrap();
        assert_eq!(w.symbol, "lightrain");
        assert_eq!(
            t.requests(),
            vec!["https://api.met.no/weatherapi/locationforecast/2.0/compact?lat=51.5074&lon=-0.1278".to_string()]
        );
    }
}
