use anyhow::{Result, anyhow};
use rayon::prelude::*;
use realfft::RealFftPlanner;

use crate::data::{AudioData, MelParams};

pub struct FftEngine;

impl FftEngine {
    /// Short-time power spectrum `|X|²` of the whole signal, one vector of
    /// `n_fft / 2 + 1` bins per frame. Frames are independent and run on rayon
    /// threads.
    pub fn power_frames(audio: &AudioData, params: &MelParams) -> Result<Vec<Vec<f32>>> {
        let n_fft = params.n_fft;
        if n_fft < 2 {
            anyhow::bail!("n_fft must be at least 2, got {}", n_fft);
        }
        let hop = params.hop_length();

        let padded_audio = if params.use_center {
            let pad = n_fft / 2;
            let mut padded = vec![0.0; audio.samples.len() + 2 * pad];
            padded[pad..pad + audio.samples.len()].copy_from_slice(&audio.samples);
            padded
        } else {
            audio.samples.clone()
        };

        let num_frames = params.num_frames(audio.samples.len());
        if num_frames == 0 {
            return Ok(Vec::new());
        }

        let window = params.generate_window();
        let fft = RealFftPlanner::<f32>::new().plan_fft_forward(n_fft);

        (0..num_frames)
            .into_par_iter()
            .map(|frame_idx| -> Result<Vec<f32>> {
                let start = frame_idx * hop;
                let mut indata: Vec<f32> = padded_audio[start..start + n_fft]
                    .iter()
                    .zip(&window)
                    .map(|(s, w)| s * w)
                    .collect();
                let mut spectrum = fft.make_output_vec();

                fft.process(&mut indata, &mut spectrum)
                    .map_err(|e| anyhow!("FFT processing failed: {:?}", e))?;

                Ok(spectrum.iter().map(|c| c.norm_sqr()).collect())
            })
            .collect()
    }
}
