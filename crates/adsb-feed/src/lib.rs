pub mod aircraft;
pub mod doctor;
pub mod error;
pub mod geo;
pub mod schedule;
pub mod transport;
pub mod weather;

use serde::{Deserialize, Serialize};

pub use aircraft::{FeedClient, FeedSnapshot};
pub use error::FetchError;
pub use schedule::{Backoff, PollConfig, PollScheduler};
pub use transport::{HttpTransport, ReplayTransport, Transport};
pub use weather::WeatherClient;

/// Fixed observing position the feeds are scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub lat: f64,
    pub lon: f64,
    pub radius_nm: u32,
}
