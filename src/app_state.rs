use crate::data::{AudioData, ClipRange, DataUri, MelParams, PlayTarget};
use crate::error::EventError;
use crate::playback::CursorTracker;
use crate::rendering::FigureStyle;
use crate::settings::Settings;

// ─── Range fields ──────────────────────────────────────────────────────────────

/// Text of the start/end inputs, as last typed or last set by a draw gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeFields {
    pub start: String,
    pub end: String,
}

impl RangeFields {
    pub fn set(&mut self, range: ClipRange) {
        self.start = format_seconds(range.start);
        self.end = format_seconds(range.end);
    }
}

// ─── App State ─────────────────────────────────────────────────────────────────

/// Everything one viewing session remembers between events.
pub struct AppState {
    /// The uploaded file as received (data URI). Decoded again whenever an
    /// event needs samples.
    pub audio_content: Option<String>,
    pub clip_range: Option<ClipRange>,
    pub fields: RangeFields,
    pub tracker: CursorTracker,
    pub play_target: PlayTarget,

    pub mel_params: MelParams,
    pub figure_style: FigureStyle,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            audio_content: None,
            clip_range: None,
            fields: RangeFields::default(),
            tracker: CursorTracker::new(),
            play_target: PlayTarget::Full,

            mel_params: settings.mel_params(),
            figure_style: settings.figure_style(),
            max_upload_bytes: settings.max_upload_bytes(),
        }
    }

    pub fn has_audio(&self) -> bool {
        self.audio_content.is_some()
    }

    /// Decode the stored upload.
    pub fn decode_audio(&self) -> Result<AudioData, EventError> {
        let contents = self.audio_content.as_deref().ok_or(EventError::NoAudio)?;
        decode_upload(contents, self.max_upload_bytes)
    }
}

/// Parse, size-check and decode a data-URI upload.
pub fn decode_upload(contents: &str, max_bytes: usize) -> Result<AudioData, EventError> {
    let uri = DataUri::parse(contents).map_err(EventError::MalformedUpload)?;

    let estimate = uri.decoded_len_estimate();
    if estimate > max_bytes {
        return Err(EventError::UploadTooLarge { size: estimate, limit: max_bytes });
    }

    let bytes = uri.decode().map_err(EventError::MalformedUpload)?;
    AudioData::from_bytes(&bytes, uri.mime).map_err(EventError::Undecodable)
}

pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::audio_data::tests::sine_wav_bytes;
    use crate::data::data_uri;

    #[test]
    fn decode_requires_upload() {
        let state = AppState::new(&Settings::default());
        assert!(matches!(state.decode_audio(), Err(EventError::NoAudio)));
    }

    #[test]
    fn decode_stored_upload() {
        let mut state = AppState::new(&Settings::default());
        state.audio_content = Some(data_uri::encode("audio/wav", &sine_wav_bytes(440.0, 1.0, 8000, 1)));
        let audio = state.decode_audio().unwrap();
        assert_eq!(audio.sample_rate, 8000);
        assert!((audio.duration_seconds - 1.0).abs() < 1e-9);
    }

    #[test]
    fn oversized_upload_is_rejected_before_decoding() {
        let uri = data_uri::encode("audio/wav", &vec![0u8; 4096]);
        let err = decode_upload(&uri, 1024).unwrap_err();
        assert!(matches!(err, EventError::UploadTooLarge { limit: 1024, .. }));
    }

    #[test]
    fn fields_are_formatted_to_milliseconds() {
        let mut fields = RangeFields::default();
        fields.set(ClipRange::new(1.7, 4.2));
        assert_eq!(fields, RangeFields { start: "1.700".into(), end: "4.200".into() });
    }
}
