use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowType {
    Hann,
    Hamming,
    Blackman,
}

impl WindowType {
    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Hann => "Hann",
            WindowType::Hamming => "Hamming",
            WindowType::Blackman => "Blackman",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "Hann" => Some(WindowType::Hann),
            "Hamming" => Some(WindowType::Hamming),
            "Blackman" => Some(WindowType::Blackman),
            _ => None,
        }
    }
}

/// Parameters of the mel power spectrogram.
#[derive(Debug, Clone)]
pub struct MelParams {
    pub n_fft: usize,
    pub hop_length: usize,
    pub n_mels: usize,
    pub window_type: WindowType,
    pub use_center: bool,
    /// Dynamic range kept below the peak, in dB.
    pub top_db: f32,
}

impl Default for MelParams {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            n_mels: 128,
            window_type: WindowType::Hann,
            use_center: true,
            top_db: 80.0,
        }
    }
}

impl MelParams {
    pub fn hop_length(&self) -> usize {
        self.hop_length.max(1)
    }

    pub fn num_frequency_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    pub fn num_frames(&self, total_samples: usize) -> usize {
        let padded = if self.use_center {
            total_samples + 2 * (self.n_fft / 2)
        } else {
            total_samples
        };
        if padded < self.n_fft {
            return 0;
        }
        (padded - self.n_fft) / self.hop_length() + 1
    }

    /// Periodic window, the form used for spectral analysis.
    pub fn generate_window(&self) -> Vec<f32> {
        let n = self.n_fft;
        if n <= 1 { return vec![1.0; n]; }
        let denom = n as f32;

        (0..n)
            .map(|i| {
                let x = (2.0 * PI * i as f32) / denom;
                match self.window_type {
                    WindowType::Hann => 0.5 * (1.0 - x.cos()),
                    WindowType::Hamming => 0.54 - 0.46 * x.cos(),
                    WindowType::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_frame_count() {
        let params = MelParams::default();
        // 1 + n / hop with centering
        assert_eq!(params.num_frames(22050), 1 + 22050 / 512);
        assert_eq!(params.num_frames(0), 1);
    }

    #[test]
    fn uncentered_short_input_has_no_frames() {
        let params = MelParams { use_center: false, ..MelParams::default() };
        assert_eq!(params.num_frames(1000), 0);
        assert_eq!(params.num_frames(2048), 1);
    }

    #[test]
    fn hann_window_shape() {
        let window = MelParams::default().generate_window();
        assert_eq!(window.len(), 2048);
        assert!(window[0].abs() < 1e-6);
        assert!((window[1024] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn window_names_roundtrip() {
        for w in [WindowType::Hann, WindowType::Hamming, WindowType::Blackman] {
            assert_eq!(WindowType::from_name(w.name()), Some(w));
        }
        assert_eq!(WindowType::from_name("Kaiser"), None);
    }
}
