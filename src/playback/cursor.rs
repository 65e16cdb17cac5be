use std::time::Instant;

use crate::data::{ClipRange, CursorState, PlaybackClock};

/// Moves the cursor line across a range at wall-clock speed.
///
/// Idle until `start`; each `tick` then places the cursor at
/// `range.start + elapsed`, capped at `range.end`. Reaching the end stops it,
/// and only another `start` sets it moving again.
#[derive(Debug, Clone, Default)]
pub struct CursorTracker {
    cursor: CursorState,
    clock: PlaybackClock,
    range: Option<ClipRange>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CursorState {
        self.cursor
    }

    pub fn is_moving(&self) -> bool {
        self.cursor.moving
    }

    /// Begin (or restart) playback over `range`.
    pub fn start(&mut self, range: ClipRange, now: Instant) -> CursorState {
        self.range = Some(range);
        self.clock.start_at(now);
        self.cursor = CursorState {
            position: range.start,
            moving: true,
        };
        self.cursor
    }

    /// Advance to `now`. Returns `None` when idle, so callers can leave every
    /// output untouched.
    pub fn tick(&mut self, now: Instant) -> Option<CursorState> {
        if !self.cursor.moving {
            return None;
        }
        let range = self.range?;

        let target = (range.start + self.clock.elapsed(now)).min(range.end);
        // never step backwards, even if ticks arrive out of order
        self.cursor.position = target.max(self.cursor.position);

        if self.cursor.position >= range.end {
            self.cursor.position = range.end;
            self.cursor.moving = false;
        }
        Some(self.cursor)
    }

    /// Back to idle at `position`, forgetting the clock.
    pub fn reset(&mut self, position: f64) {
        self.cursor = CursorState {
            position,
            moving: false,
        };
        self.clock.reset();
        self.range = None;
    }
}
