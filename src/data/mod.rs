pub mod audio_data;
pub mod clip_range;
pub mod data_uri;
pub mod fft_params;
pub mod spectrogram;
pub mod transport;

pub use audio_data::AudioData;
pub use clip_range::ClipRange;
pub use data_uri::DataUri;
pub use fft_params::{MelParams, WindowType};
pub use spectrogram::{MelSpectrogram, PoolingMethod};
pub use transport::{CursorState, PlayTarget, PlaybackClock};
