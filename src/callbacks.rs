//! Event dispatch. Each event goes to exactly one handler, which returns the
//! outputs it changed; every output left `None` stays as the page has it.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::app_state::{AppState, decode_upload};
use crate::data::{AudioData, ClipRange, CursorState, PlayTarget, data_uri};
use crate::error::EventError;
use crate::processing::{ClipExtractor, MelEngine};
use crate::rendering::Figure;

const FULL_TITLE: &str = "<span style=\"color:red\"> Spectrogram </span> of audio signal";
const CLIP_TITLE: &str = "<span style=\"color:red\"> Spectrogram </span> of selected clip";

// ─── Events ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeField {
    Start,
    End,
}

impl RangeField {
    fn name(&self) -> &'static str {
        match self {
            RangeField::Start => "start",
            RangeField::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A file picked by the user, as a data URI.
    Upload { contents: String },
    /// Move the cursor over the full file or the confirmed clip and play it.
    Play { target: PlayTarget },
    /// Periodic timer while the cursor is moving.
    Tick,
    EditField { field: RangeField, value: String },
    /// Apply the start/end fields as the clip range. The page sends the field
    /// text along, so an `edit_field` still in flight cannot leave it stale.
    ConfirmRange {
        #[serde(default)]
        start: Option<String>,
        #[serde(default)]
        end: Option<String>,
    },
    /// A rectangle drawn on the full spectrogram, x coordinates in seconds.
    DrawRect { x0: f64, x1: f64 },
}

// ─── Outputs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Outputs {
    /// Source for the full-file audio element; empty clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spectrogram: Option<Figure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_field: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_field: Option<f64>,
    /// Source for the clip audio element; empty clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_player: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_spectrogram: Option<Figure>,
    /// Which audio element the page should start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play: Option<PlayTarget>,
}

// ─── Dispatch ──────────────────────────────────────────────────────────────────

pub fn handle_event(state: &mut AppState, event: Event, now: Instant) -> Result<Outputs, EventError> {
    match event {
        Event::Upload { contents } => on_upload(state, contents),
        Event::Play { target } => on_play(state, target, now),
        Event::Tick => Ok(on_tick(state, now)),
        Event::EditField { field, value } => Ok(on_edit_field(state, field, value)),
        Event::ConfirmRange { start, end } => on_confirm_range(state, start, end),
        Event::DrawRect { x0, x1 } => on_draw_rect(state, x0, x1),
    }
}

fn on_upload(state: &mut AppState, contents: String) -> Result<Outputs, EventError> {
    let audio = decode_upload(&contents, state.max_upload_bytes)?;
    let spec = MelEngine::process(&audio, &state.mel_params)?;
    let figure = Figure::spectrogram(&spec, 0.0, 0.0, FULL_TITLE, &state.figure_style);

    log::info!(
        "Loaded upload: {} samples @ {} Hz ({:.2}s)",
        audio.num_samples(),
        audio.sample_rate,
        audio.duration_seconds
    );

    let full = ClipRange::full(audio.duration_seconds);
    state.audio_content = Some(contents.clone());
    state.clip_range = None;
    state.fields.set(full);
    state.tracker.reset(0.0);
    state.play_target = PlayTarget::Full;

    Ok(Outputs {
        audio_player: Some(contents),
        spectrogram: Some(figure),
        interval_disabled: Some(true),
        cursor: Some(state.tracker.state()),
        start_field: Some(full.start),
        end_field: Some(full.end),
        clip_player: Some(String::new()),
        clip_spectrogram: Some(Figure::empty()),
        ..Outputs::default()
    })
}

fn on_play(state: &mut AppState, target: PlayTarget, now: Instant) -> Result<Outputs, EventError> {
    let range = match target {
        PlayTarget::Full => ClipRange::full(state.decode_audio()?.duration_seconds),
        PlayTarget::Clip => {
            if !state.has_audio() {
                return Err(EventError::NoAudio);
            }
            state.clip_range.ok_or(EventError::NoClip)?
        }
    };

    let cursor = state.tracker.start(range, now);
    state.play_target = target;
    log::debug!("Playing {:?} from {:.3}s to {:.3}s", target, range.start, range.end);

    Ok(Outputs {
        interval_disabled: Some(false),
        cursor: Some(cursor),
        play: Some(target),
        ..Outputs::default()
    })
}

fn on_tick(state: &mut AppState, now: Instant) -> Outputs {
    match state.tracker.tick(now) {
        Some(cursor) => {
            if !cursor.moving {
                log::debug!("{:?} playback finished at {:.3}s", state.play_target, cursor.position);
            }
            Outputs {
                cursor: Some(cursor),
                interval_disabled: Some(!cursor.moving),
                ..Outputs::default()
            }
        }
        // idle: nothing moves, just keep the timer off
        None => Outputs {
            interval_disabled: Some(true),
            ..Outputs::default()
        },
    }
}

fn on_edit_field(state: &mut AppState, field: RangeField, value: String) -> Outputs {
    match field {
        RangeField::Start => state.fields.start = value,
        RangeField::End => state.fields.end = value,
    }
    Outputs::default()
}

fn on_confirm_range(
    state: &mut AppState,
    start_text: Option<String>,
    end_text: Option<String>,
) -> Result<Outputs, EventError> {
    if let Some(text) = start_text {
        state.fields.start = text;
    }
    if let Some(text) = end_text {
        state.fields.end = text;
    }

    let audio = state.decode_audio()?;
    let start = parse_field(RangeField::Start, &state.fields.start)?;
    let end = parse_field(RangeField::End, &state.fields.end)?;

    let requested = ClipRange::new(start, end);
    if !requested.is_ordered() {
        return Err(EventError::InvalidRange { start, end });
    }

    apply_clip_range(state, &audio, requested.clamped(audio.duration_seconds))
}

fn on_draw_rect(state: &mut AppState, x0: f64, x1: f64) -> Result<Outputs, EventError> {
    if !x0.is_finite() || !x1.is_finite() {
        return Err(EventError::InvalidRange { start: x0, end: x1 });
    }
    let audio = state.decode_audio()?;
    let range = ClipRange::from_drawn(x0, x1).clamped(audio.duration_seconds);
    apply_clip_range(state, &audio, range)
}

/// Cut the clip, render its spectrogram and make it the current selection.
fn apply_clip_range(state: &mut AppState, audio: &AudioData, range: ClipRange) -> Result<Outputs, EventError> {
    let (clip, wav) = ClipExtractor::extract_wav(audio, range)?;
    let spec = MelEngine::process(&clip.audio, &state.mel_params)?;
    // the clip starts on a sample boundary, which can sit just before range.start
    let origin = clip.offset_seconds;
    let figure = Figure::spectrogram(&spec, origin, origin, CLIP_TITLE, &state.figure_style);

    state.clip_range = Some(range);
    state.fields.set(range);

    Ok(Outputs {
        start_field: Some(range.start),
        end_field: Some(range.end),
        clip_player: Some(data_uri::encode("audio/wav", &wav)),
        clip_spectrogram: Some(figure),
        ..Outputs::default()
    })
}

fn parse_field(field: RangeField, text: &str) -> Result<f64, EventError> {
    let invalid = || EventError::InvalidField { field: field.name(), value: text.to_string() };
    let value: f64 = text.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() {
        return Err(invalid());
    }
    Ok(value)
}
