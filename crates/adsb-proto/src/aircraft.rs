use serde::{Deserialize, Serialize};

/// Upper bound on contacts kept from one feed snapshot.
pub const MAX_AIRCRAFT: usize = 20;

pub const CALLSIGN_MAX: usize = 11;
pub const REGISTRATION_MAX: usize = 11;
pub const TYPE_CODE_MAX: usize = 7;

/// Heading value used when the feed reports no track.
pub const HEADING_UNKNOWN: i32 = -1;

/// One observed contact, already derived relative to the observer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aircraft {
    pub callsign: String,
    pub registration: String,
    pub type_code: String,
    pub altitude_ft: i32,         // 0 = unknown / on ground
    pub vertical_rate_fpm: i32,   // positive = climbing
    pub ground_speed_kt: i32,     // 0 = unknown
    /// Set when the speed was derived from airspeed instead of measured ground speed.
    pub speed_estimated: bool,
    pub distance_nm: f64,
    pub bearing_deg: f64,         // observer -> aircraft, [0, 360)
    pub heading_deg: i32,         // [0, 359] or HEADING_UNKNOWN
}

impl Aircraft {
    pub fn heading(&self) -> Option<i32> {
        (self.heading_deg >= 0).then_some(self.heading_deg)
    }

    pub fn on_ground(&self) -> bool {
        self.altitude_ft == 0
    }

    pub fn operator_prefix(&self) -> Option<&str> {
        operator_prefix(&self.callsign)
    }
}

/// ICAO operator prefix: the first three characters of a callsign.
pub fn operator_prefix(callsign: &str) -> Option<&str> {
    callsign.get(..3).filter(|p| p.chars().count() == 3)
}

/// Truncates to at most `max` characters without splitting a char.
pub fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
