pub mod cursor;

pub use cursor::CursorTracker;
