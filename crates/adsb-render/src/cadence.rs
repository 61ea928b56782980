use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Whole-panel waveform: slow, clears ghosting.
    Full,
    /// Fast update of the partial window, accumulates ghosting.
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CadenceState {
    Partial,
    FullDue,
}

/// Counts renders since the last full refresh.
///
/// A full refresh is the first render of a cycle, so a cycle is `threshold`
/// renders long: one full followed by `threshold - 1` partials. A fresh
/// cadence knows nothing about the panel, so its first render is full.
#[derive(Debug, Clone)]
pub struct RefreshCadence {
    since_full: u32,
    threshold: u32,
}

impl RefreshCadence {
    pub fn new(threshold: u32) -> Self {
        Self { since_full: threshold, threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn since_full(&self) -> u32 {
        self.since_full
    }

    pub fn state(&self) -> CadenceState {
        if self.since_full.saturating_add(1) >= self.threshold {
            CadenceState::FullDue
        } else {
            CadenceState::Partial
        }
    }

    /// Mode for a render of fresh data.
    pub fn on_data(&mut self) -> RefreshMode {
        match self.state() {
            CadenceState::FullDue => {
                self.since_full = 0;
                RefreshMode::Full
            }
            CadenceState::Partial => {
                self.since_full += 1;
                RefreshMode::Partial
            }
        }
    }

    /// An error screen is always a full refresh and forces the next data
    /// render to be full too.
    pub fn on_error(&mut self) -> RefreshMode {
        self.since_full = self.threshold;
        RefreshMode::Full
    }

    /// Splash / startup screens start a fresh cycle.
    pub fn on_splash(&mut self) -> RefreshMode {
        self.since_full = 0;
        RefreshMode::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RefreshMode::{Full, Partial};

    #[test]
    fn five_renders_after_a_full_one() {
        let mut c = RefreshCadence::new(5);
        assert_eq!(c.on_splash(), Full);
        let got: Vec<_> = (0..5).map(|_| c.on_data()).collect();
        assert_eq!(got, vec![Partial, Partial, Partial, Partial, Full]);
        // and the cycle repeats
        let got: Vec<_> = (0..5).map(|_| c.on_data()).collect();
        assert_eq!(got, vec![Partial, Partial, Partial, Partial, Full]);
    }

    #[test]
    fn error_forces_next_render_full_from_any_count() {
        for before in 0..4 {
            let mut c = RefreshCadence::new(5);
            for _ in 0..before {
                c.on_data();
            }
            assert_eq!(c.on_error(), Full);
            assert_eq!(c.state(), CadenceState::FullDue);
            assert_eq!(c.on_data(), Full);
            assert_eq!(c.on_data(), Partial);
        }
    }

    #[test]
    fn first_render_is_full() {
        let mut c = RefreshCadence::new(15);
        assert_eq!(c.state(), CadenceState::FullDue);
        assert_eq!(c.on_data(), Full);
        assert_eq!(c.on_data(), Partial);
    }

    #[test]
    fn repeated_errors_stay_full() {
        let mut c = RefreshCadence::new(15);
        assert_eq!(c.on_error(), Full);
        assert_eq!(c.on_error(), Full);
        assert_eq!(c.since_full(), 15);
        assert_eq!(c.on_data(), Full);
        assert_eq!(c.since_full(), 0);
    }

    #[test]
    fn threshold_of_one_or_zero_is_always_full() {
        for t in [0, 1] {
            let mut c = RefreshCadence::new(t);
            assert!((0..4).all(|_| c.on_data() == Full));
        }
    }
}
