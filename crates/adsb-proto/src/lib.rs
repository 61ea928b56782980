pub mod aircraft;
pub mod weather;

pub use aircraft::{Aircraft, MAX_AIRCRAFT};
pub use weather::WeatherSnapshot;
