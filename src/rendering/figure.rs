//! Plotly figure description for a spectrogram with a cursor line.
//!
//! The server only describes the plot; the page hands this JSON straight to
//! `Plotly.react`. Trace 0 is always the heatmap and trace 1 the cursor, so
//! the page can move the cursor with `Plotly.restyle(.., [1])`.

use serde::Serialize;

use crate::data::{MelSpectrogram, PoolingMethod};

pub const CURSOR_TRACE_INDEX: usize = 1;

#[derive(Debug, Clone)]
pub struct FigureStyle {
    pub colorscale: String,
    pub cursor_color: String,
    pub cursor_width: f32,
    pub max_display_frames: usize,
    pub pooling: PoolingMethod,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            colorscale: "Plasma".to_string(),
            cursor_color: "white".to_string(),
            cursor_width: 4.0,
            max_display_frames: 2000,
            pooling: PoolingMethod::Max,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Heatmap {
        z: Vec<Vec<f32>>,
        x: Vec<f64>,
        y: Vec<f32>,
        colorscale: String,
        colorbar: ColorBar,
    },
    Scatter {
        x: [f64; 2],
        y: [f32; 2],
        mode: &'static str,
        line: Line,
        name: &'static str,
        showlegend: bool,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColorBar {
    pub title: Title,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Line {
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Axis {
    pub title: Title,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewShape {
    pub line: Line,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dragmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newshape: Option<NewShape>,
}

impl Figure {
    /// Blank axes, shown before anything is uploaded.
    pub fn empty() -> Self {
        Self {
            data: Vec::new(),
            layout: Layout {
                title: Title { text: String::new() },
                xaxis: Axis { title: Title { text: "Time (s)".to_string() }, range: None },
                yaxis: Axis { title: Title { text: "Frequency (Hz)".to_string() }, range: None },
                dragmode: None,
                newshape: None,
            },
        }
    }

    /// Heatmap of `spec` placed at `offset` seconds on the time axis, with a
    /// full-height cursor line at `cursor_x`.
    pub fn spectrogram(
        spec: &MelSpectrogram,
        offset: f64,
        cursor_x: f64,
        title: &str,
        style: &FigureStyle,
    ) -> Self {
        let display = spec.pooled(style.max_display_frames, style.pooling);
        let max_freq = display.max_frequency();

        let heatmap = Trace::Heatmap {
            z: display.to_rows(),
            x: display.frame_times(offset),
            y: display.mel_frequencies.clone(),
            colorscale: style.colorscale.clone(),
            colorbar: ColorBar { title: Title { text: "dB".to_string() } },
        };

        let cursor = Trace::Scatter {
            x: [cursor_x, cursor_x],
            y: [0.0, max_freq],
            mode: "lines",
            line: Line { color: style.cursor_color.clone(), width: style.cursor_width },
            name: "Cursor",
            showlegend: false,
        };

        Self {
            data: vec![heatmap, cursor],
            layout: Layout {
                title: Title { text: title.to_string() },
                xaxis: Axis {
                    title: Title { text: "Time (s)".to_string() },
                    range: Some([offset, offset + spec.duration_seconds]),
                },
                yaxis: Axis {
                    title: Title { text: "Frequency (Hz)".to_string() },
                    range: Some([0.0, max_freq as f64]),
                },
                dragmode: Some("drawrect"),
                newshape: Some(NewShape {
                    line: Line { color: style.cursor_color.clone(), width: 2.0 },
                }),
            },
        }
    }

    /// Current x of the cursor trace, if the figure has one.
    pub fn cursor_x(&self) -> Option<f64> {
        self.data.get(CURSOR_TRACE_INDEX).and_then(|t| match t {
            Trace::Scatter { x, .. } => Some(x[0]),
            _ => None,
        })
    }
}
