use adsb_proto::aircraft::clip;
use adsb_proto::{Aircraft, WeatherSnapshot};
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;

use crate::names::NameRegistry;

pub const NO_TIME: &str = "--- -- --:--";

const CARDINALS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

// first match wins, so the specific variants come before their base word
const SYMBOLS: &[(&str, &str)] = &[
    ("clearsky", "clear"),
    ("fair", "fair"),
    ("partlycloudy", "p.cloudy"),
    ("cloudy", "cloudy"),
    ("fog", "fog"),
    ("heavyrain", "hvy rain"),
    ("lightrain", "lt rain"),
    ("rain", "rain"),
    ("heavysnow", "hvy snow"),
    ("lightsnow", "lt snow"),
    ("snow", "snow"),
    ("sleet", "sleet"),
    ("thunder", "thunder"),
];

/// 8-point compass name for a direction in degrees.
pub fn cardinal(deg: f64) -> &'static str {
    let idx = ((deg.rem_euclid(360.0) + 22.5) / 45.0) as usize % 8;
    CARDINALS[idx]
}

pub fn distance(nm: f64) -> String {
    if nm < 10.0 {
        format!("{:.1}nm", nm)
    } else {
        format!("{}nm", nm.round() as i64)
    }
}

/// Short label for a met.no symbol code, `?` when unrecognized.
pub fn simplify_symbol(symbol: &str) -> &'static str {
    SYMBOLS
        .iter()
        .find(|(key, _)| symbol.contains(key))
        .map(|(_, short)| *short)
        .unwrap_or("?")
}

/// `"14C p.cloudy SW 10kt"`
pub fn weather_line(w: &WeatherSnapshot) -> String {
    format!(
        "{}C {} {} {}kt",
        w.temperature_c.round() as i32,
        simplify_symbol(&w.symbol),
        cardinal(w.wind_from_deg),
        w.wind_knots()
    )
}

/// Local wall-clock time of a feed timestamp, or the placeholder when there
/// has never been one.
pub fn feed_time(timestamp_ms: u64, tz: Tz) -> String {
    if timestamp_ms == 0 {
        return NO_TIME.to_string();
    }
    match i64::try_from(timestamp_ms).ok().and_then(|ms| Utc.timestamp_millis_opt(ms).single()) {
        Some(t) => t.with_timezone(&tz).format("%b %-d %H:%M").to_string(),
        None => NO_TIME.to_string(),
    }
}

/// "Airline Type" for the first card line, clipped to `max_chars`.
pub fn description(names: &NameRegistry, a: &Aircraft, max_chars: usize, unknown: &str) -> String {
    let airline = names.airline_for_callsign(&a.callsign);
    let type_name = names.type_name(&a.type_code);

    let text = match (airline, type_name) {
        (Some(al), Some(ty)) => format!("{} {}", al, ty),
        (Some(al), None) => al.to_string(),
        (None, Some(ty)) => ty.to_string(),
        (None, None) if !a.type_code.is_empty() => format!("({})", a.type_code),
        (None, None) => unknown.to_string(),
    };
    clip(&text, max_chars)
}

pub fn altitude(a: &Aircraft) -> String {
    if a.on_ground() {
        "GND".to_string()
    } else {
        format!("{}ft", a.altitude_ft)
    }
}

pub fn ground_speed(a: &Aircraft) -> String {
    match (a.ground_speed_kt, a.speed_estimated) {
        (0, _) => "- kts".to_string(),
        (gs, true) => format!("~{} kts", gs),
        (gs, false) => format!("{} kts", gs),
    }
}
