use serde::{Deserialize, Serialize};

/// A `[start, end]` sub-interval of the audio, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The whole file.
    pub fn full(duration: f64) -> Self {
        Self::new(0.0, duration.max(0.0))
    }

    /// Range from the two x coordinates of a drawn rectangle, which may come
    /// in either order.
    pub fn from_drawn(x0: f64, x1: f64) -> Self {
        Self::new(x0.min(x1), x0.max(x1))
    }

    /// Clamp both ends into `[0, duration]`, keeping `start <= end`.
    pub fn clamped(self, duration: f64) -> Self {
        let duration = duration.max(0.0);
        let start = self.start.clamp(0.0, duration);
        let end = self.end.clamp(start, duration);
        Self::new(start, end)
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}
