use thiserror::Error;

/// Why one fetch produced no data. Every variant is retried; none is fatal.
///
/// The `Display` text goes on the panel's error screen, so it stays short.
/// Use `detail()` for the log line.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// No network path: connect failure, timeout or the link is known down.
    #[error("link down")]
    Link(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}")]
    Transport { status: u16 },

    /// The body was not the JSON shape we expect.
    #[error("JSON parse error")]
    Parse(String),
}

impl FetchError {
    pub fn detail(&self) -> String {
        match self {
            FetchError::Link(why) => format!("link down: {}", why),
            FetchError::Transport { status } => format!("HTTP status {}", status),
            FetchError::Parse(why) => format!("JSON parse error: {}", why),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}
