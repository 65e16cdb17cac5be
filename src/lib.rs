//! Upload an audio file, view its mel-spectrogram, select a clip by time or by
//! drawing on the plot, and play it back while a cursor follows along.

pub mod app_state;
pub mod callbacks;
pub mod data;
pub mod error;
pub mod playback;
pub mod processing;
pub mod rendering;
pub mod server;
pub mod settings;
pub mod test_audio_gen;

pub use app_state::AppState;
pub use callbacks::{Event, Outputs, handle_event};
pub use error::EventError;
pub use settings::Settings;
