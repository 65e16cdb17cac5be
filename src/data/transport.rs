use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Which audio element (and spectrogram) a play action drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayTarget {
    Full,
    Clip,
}

/// Position of the cursor line and whether it is still advancing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorState {
    pub position: f64,
    pub moving: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            position: 0.0,
            moving: false,
        }
    }
}

/// Wall-clock time playback started at, if it has.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackClock {
    pub start: Option<Instant>,
}

impl PlaybackClock {
    pub fn start_at(&mut self, now: Instant) {
        self.start = Some(now);
    }

    pub fn reset(&mut self) {
        self.start = None;
    }

    /// Seconds since start; zero if not started or `now` is earlier.
    pub fn elapsed(&self, now: Instant) -> f64 {
        self.start
            .map(|s| now.saturating_duration_since(s).as_secs_f64())
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn elapsed_measures_from_start() {
        let t0 = Instant::now();
        let mut clock = PlaybackClock::default();
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(1)), 0.0);

        clock.start_at(t0);
        assert!((clock.elapsed(t0 + Duration::from_millis(1500)) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn play_target_wire_names() {
        assert_eq!(serde_json::to_string(&PlayTarget::Clip).unwrap(), "\"clip\"");
        let t: PlayTarget = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(t, PlayTarget::Full);
    }
}
