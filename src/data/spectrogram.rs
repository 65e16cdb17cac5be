/// Mel spectrogram in dB, one column of band values per analysis frame.
#[derive(Debug, Clone, Default)]
pub struct MelSpectrogram {
    /// `frames[t][m]`: dB level of mel band `m` at frame `t`.
    pub frames: Vec<Vec<f32>>,
    /// Centre frequency of each mel band, in Hz.
    pub mel_frequencies: Vec<f32>,
    /// Length of the analysed audio in seconds.
    pub duration_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoolingMethod {
    Max,      // preserves peaks
    Average,  // smoother
}

impl PoolingMethod {
    pub fn name(&self) -> &'static str {
        match self {
            PoolingMethod::Max => "Max",
            PoolingMethod::Average => "Average",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Max" => Some(PoolingMethod::Max),
            "Average" => Some(PoolingMethod::Average),
            _ => None,
        }
    }
}

impl MelSpectrogram {
    #[inline]
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn num_bands(&self) -> usize {
        self.mel_frequencies.len()
    }

    pub fn max_frequency(&self) -> f32 {
        self.mel_frequencies.last().copied().unwrap_or(0.0)
    }

    /// Frame times spread evenly over `[offset, offset + duration]`.
    pub fn frame_times(&self, offset: f64) -> Vec<f64> {
        let n = self.frames.len();
        match n {
            0 => Vec::new(),
            1 => vec![offset],
            _ => {
                let step = self.duration_seconds / (n - 1) as f64;
                (0..n).map(|i| offset + i as f64 * step).collect()
            }
        }
    }

    /// Band-major copy (`rows[m][t]`), the layout a heatmap wants.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        let bands = self.num_bands();
        let mut rows = vec![Vec::with_capacity(self.frames.len()); bands];
        for frame in &self.frames {
            for (m, row) in rows.iter_mut().enumerate() {
                row.push(frame.get(m).copied().unwrap_or(f32::NAN));
            }
        }
        rows
    }

    /// Reduce the frame count to at most `max_frames` by pooling neighbouring
    /// frames. The time span is unchanged.
    pub fn pooled(&self, max_frames: usize, method: PoolingMethod) -> MelSpectrogram {
        let n = self.frames.len();
        if max_frames == 0 || n <= max_frames {
            return self.clone();
        }

        let bands = self.num_bands();
        let frames = (0..max_frames)
            .map(|i| {
                let start = i * n / max_frames;
                let end = ((i + 1) * n / max_frames).max(start + 1).min(n);
                let group = &self.frames[start..end];
                (0..bands)
                    .map(|m| match method {
                        PoolingMethod::Max => group
                            .iter()
                            .map(|f| f[m])
                            .fold(f32::NEG_INFINITY, f32::max),
                        PoolingMethod::Average => {
                            group.iter().map(|f| f[m]).sum::<f32>() / group.len() as f32
                        }
                    })
                    .collect()
            })
            .collect();

        MelSpectrogram {
            frames,
            mel_frequencies: self.mel_frequencies.clone(),
            duration_seconds: self.duration_seconds,
        }
    }
}
