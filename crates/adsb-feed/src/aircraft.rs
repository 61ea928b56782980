use std::sync::Arc;

use adsb_proto::aircraft::{clip, CALLSIGN_MAX, HEADING_UNKNOWN, REGISTRATION_MAX, TYPE_CODE_MAX};
use adsb_proto::{Aircraft, MAX_AIRCRAFT};
use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::geo::{bearing_deg, haversine_nm};
use crate::transport::Transport;

/// One successful poll of the aircraft feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedSnapshot {
    /// At most `MAX_AIRCRAFT` entries, nearest first.
    pub aircraft: Vec<Aircraft>,
    /// Server clock at response time (epoch ms), 0 if the feed sent none.
    pub timestamp_ms: u64,
}

#[derive(Debug, Deserialize)]
struct FeedPayload {
    ac: Option<Vec<Value>>,
    now: Option<f64>,
}

// alt_baro is either feet or the literal "ground"
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AltBaro {
    Feet(f64),
    Keyword(IgnoredAny),
}

#[derive(Debug, Default, Deserialize)]
struct FeedRecord {
    category: Option<String>,
    alt_baro: Option<AltBaro>,
    alt_geom: Option<f64>,
    baro_rate: Option<f64>,
    geom_rate: Option<f64>,
    gs: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
    track: Option<f64>,
    flight: Option<String>,
    r: Option<String>,
    t: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    GroundVehicle,
    OnGround,
}

/// Client for readsb-style "aircraft within radius of point" endpoints.
pub struct FeedClient<T> {
    transport: Arc<T>,
    base_url: String,
}

impl<T: Transport> FeedClient<T> {
    pub fn new(transport: Arc<T>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { transport, base_url }
    }

    pub fn url(&self, lat: f64, lon: f64, radius_nm: u32) -> String {
        format!("{}/{:.6}/{:.6}/{}", self.base_url, lat, lon, radius_nm)
    }

    /// Fetches and normalizes one snapshot. The caller keeps its previous
    /// list when this fails.
    pub async fn fetch(&self, lat: f64, lon: f64, radius_nm: u32) -> Result<FeedSnapshot, FetchError> {
        let body = self.transport.get(&self.url(lat, lon, radius_nm)).await?;
        let snap = normalize(&body, lat, lon)?;
        info!("feed: {} aircraft within {}nm", snap.aircraft.len(), radius_nm);
        Ok(snap)
    }
}

/// Turns a raw feed body into the bounded, distance-sorted contact list.
///
/// Records are taken in feed order until `MAX_AIRCRAFT` are accepted, then
/// sorted, so the result is the first twenty airborne contacts rather than
/// the nearest twenty.
pub fn normalize(body: &[u8], observer_lat: f64, observer_lon: f64) -> Result<FeedSnapshot, FetchError> {
    let payload: FeedPayload = serde_json::from_slice(body)?;

    let mut aircraft = Vec::with_capacity(MAX_AIRCRAFT);
    for raw in payload.ac.unwrap_or_default() {
        if aircraft.len() >= MAX_AIRCRAFT {
            break;
        }
        let rec = match serde_json::from_value::<FeedRecord>(raw) {
            Ok(rec) => rec,
            Err(e) => {
                debug!("feed: unreadable record skipped: {}", e);
                continue;
            }
        };
        match derive(&rec, observer_lat, observer_lon) {
            Ok(a) => aircraft.push(a),
            Err(why) => debug!("feed: skip {:?} ({:?})", rec.flight.as_deref().unwrap_or("?"), why),
        }
    }

    aircraft.sort_by(|a, b| a.distance_nm.total_cmp(&b.distance_nm));

    let timestamp_ms = payload.now.filter(|n| n.is_finite() && *n > 0.0).map(|n| n as u64).unwrap_or(0);
    Ok(FeedSnapshot { aircraft, timestamp_ms })
}

fn derive(rec: &FeedRecord, observer_lat: f64, observer_lon: f64) -> Result<Aircraft, Skip> {
    if rec.category.as_deref().is_some_and(|c| c.starts_with('C')) {
        return Err(Skip::GroundVehicle);
    }

    let altitude = match &rec.alt_baro {
        Some(AltBaro::Keyword(_)) => return Err(Skip::OnGround),
        Some(AltBaro::Feet(ft)) => Some(*ft),
        None => rec.alt_geom,
    };
    let vertical_rate = rec.baro_rate.or(rec.geom_rate);

    // position-less records are placed at 0/0, far away and last in the list
    let lat = rec.lat.unwrap_or(0.0);
    let lon = rec.lon.unwrap_or(0.0);

    let callsign = clip(rec.flight.as_deref().unwrap_or(""), CALLSIGN_MAX).trim_end().to_string();

    Ok(Aircraft {
        callsign,
        registration: clip(rec.r.as_deref().unwrap_or(""), REGISTRATION_MAX),
        type_code: clip(rec.t.as_deref().unwrap_or(""), TYPE_CODE_MAX),
        altitude_ft: round_i32(altitude),
        vertical_rate_fpm: round_i32(vertical_rate),
        ground_speed_kt: round_i32(rec.gs),
        speed_estimated: false,
        distance_nm: haversine_nm(observer_lat, observer_lon, lat, lon),
        bearing_deg: bearing_deg(observer_lat, observer_lon, lat, lon),
        heading_deg: rec.track.filter(|t| t.is_finite()).map(|t| (t.round() as i32).rem_euclid(360)).unwrap_or(HEADING_UNKNOWN),
    })
}

fn round_i32(v: Option<f64>) -> i32 {
    v.filter(|x| x.is_finite()).map(|x| x.round() as i32).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ReplayTransport;

    fn record(flight: &str, lat: f64, lon: f64) -> Value {
        serde_json::json!({
            "flight": flight, "r": "G-ABCD", "t": "A320", "category": "A3",
            "alt_baro": 12000, "baro_rate": 640, "gs": 301.6, "track": 271.4,
            "lat": lat, "lon": lon,
        })
    }

    fn body(records: Vec<Value>) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({ "ac": records, "now": 1_700_000_000_000u64 })).unwrap()
    }

    #[test]
    fn derives_fields_from_a_record() {
        let snap = normalize(&body(vec![record("BAW123  ", 0.0, 1.0)]), 0.0, 0.0).unwrap();
        let a = &snap.aircraft[0];
        assert_eq!(a.callsign, "BAW123");
        assert_eq!(a.registration, "G-ABCD");
        assert_eq!(a.type_code, "A320");
        assert_eq!(a.altitude_ft, 12000);
        assert_eq!(a.vertical_rate_fpm, 640);
        assert_eq!(a.ground_speed_kt, 302);
        assert_eq!(a.heading_deg, 271);
        assert!(!a.speed_estimated);
        assert!((a.bearing_deg - 90.0).abs() < 0.01);
        assert!((a.distance_nm - 60.04).abs() < 0.3);
        assert_eq!(snap.timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn skips_ground_vehicles_and_ground_sentinel() {
        let mut van = record("OPS1", 0.0, 0.1);
        van["category"] = "C2".into();
        let mut parked = record("EZY9", 0.0, 0.1);
        parked["alt_baro"] = "ground".into();

        let snap = normalize(&body(vec![van, parked, record("KLM7", 0.0, 0.2)]), 0.0, 0.0).unwrap();
        assert_eq!(snap.aircraft.len(), 1);
        assert_eq!(snap.aircraft[0].callsign, "KLM7");
    }

    #[test]
    fn falls_back_to_geometric_values() {
        let rec = serde_json::json!({ "flight": "DLH4", "alt_geom": 8025.4, "geom_rate": -1200, "lat": 0.0, "lon": 0.5 });
        let snap = normalize(&body(vec![rec]), 0.0, 0.0).unwrap();
        let a = &snap.aircraft[0];
        assert_eq!(a.altitude_ft, 8025);
        assert_eq!(a.vertical_rate_fpm, -1200);
        assert_eq!(a.ground_speed_kt, 0);
        assert_eq!(a.heading_deg, HEADING_UNKNOWN);
        assert_eq!(a.registration, "");
    }

    #[test]
    fn baro_altitude_wins_over_geometric() {
        let rec = serde_json::json!({ "alt_baro": 3000, "alt_geom": 3150, "baro_rate": 0, "geom_rate": 500 });
        let snap = normalize(&body(vec![rec]), 0.0, 0.0).unwrap();
        assert_eq!(snap.aircraft[0].altitude_ft, 3000);
        assert_eq!(snap.aircraft[0].vertical_rate_fpm, 0);
    }

    #[test]
    fn capacity_cut_happens_before_sorting() {
        // 25 records, nearest five placed last in feed order
        let mut recs: Vec<Value> = (0..20).map(|i| record(&format!("FAR{}", i), 0.0, 1.0 + i as f64 * 0.01)).collect();
        recs.extend((0..5).map(|i| record(&format!("NEAR{}", i), 0.0, 0.01)));

        let snap = normalize(&body(recs), 0.0, 0.0).unwrap();
        assert_eq!(snap.aircraft.len(), MAX_AIRCRAFT);
        assert!(snap.aircraft.iter().all(|a| a.callsign.starts_with("FAR")));
        assert!(snap.aircraft.windows(2).all(|w| w[0].distance_nm <= w[1].distance_nm));
    }

    #[test]
    fn strings_are_clipped_to_field_widths() {
        let mut rec = record("ABCDEFGHIJKLMNOP", 0.0, 0.1);
        rec["r"] = "REG-0123456789".into();
        rec["t"] = "LONGTYPE9".into();
        let snap = normalize(&body(vec![rec]), 0.0, 0.0).unwrap();
        let a = &snap.aircraft[0];
        assert_eq!(a.callsign, "ABCDEFGHIJK");
        assert_eq!(a.registration, "REG-0123456");
        assert_eq!(a.type_code, "LONGTYP");
    }

    #[test]
    fn unreadable_records_are_skipped_not_fatal() {
        let bad = serde_json::json!({ "flight": 42, "lat": 0.0, "lon": 0.1 });
        let snap = normalize(&body(vec![bad, record("SAS1", 0.0, 0.1)]), 0.0, 0.0).unwrap();
        assert_eq!(snap.aircraft.len(), 1);
    }

    #[test]
    fn missing_array_is_empty_and_garbage_is_parse_error() {
        let snap = normalize(br#"{"now": 5}"#, 0.0, 0.0).unwrap();
        assert!(snap.aircraft.is_empty());
        assert_eq!(snap.timestamp_ms, 5);

        let snap = normalize(br#"{"ac": null, "now": 5}"#, 0.0, 0.0).unwrap();
        assert!(snap.aircraft.is_empty());

        assert!(matches!(normalize(b"<html>", 0.0, 0.0), Err(FetchError::Parse(_))));
    }

    #[test]
    fn track_of_359_6_wraps_to_north() {
        let mut rec = record("FIN1", 0.0, 0.1);
        rec["track"] = 359.6.into();
        let snap = normalize(&body(vec![rec]), 0.0, 0.0).unwrap();
        assert_eq!(snap.aircraft[0].heading_deg, 0);
    }

    #[tokio::test]
    async fn fetch_builds_point_url() {
        let t = Arc::new(ReplayTransport::new());
        t.push_body("https://api.adsb.lol/v2/point", body(vec![]));
        let client = FeedClient::new(t.clone(), "https://api.adsb.lol/v2/point/");

        let snap = client.fetch(51.5074, -0.1278, 25).await.unwrap();
        assert!(snap.aircraft.is_empty());
        assert_eq!(t.requests(), vec!["https://api.adsb.lol/v2/point/51.507400/-0.127800/25".to_string()]);
    }
}
