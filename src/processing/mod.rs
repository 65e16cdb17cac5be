pub mod clip_extractor;
pub mod fft_engine;
pub mod mel;

pub use clip_extractor::{Clip, ClipExtractor};
pub use fft_engine::FftEngine;
pub use mel::{MelEngine, MelFilterBank};
