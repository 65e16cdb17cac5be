use anyhow::Result;

use super::fft_engine::FftEngine;
use crate::data::{AudioData, MelParams, MelSpectrogram};

const AMIN: f32 = 1e-10;

// Slaney mel scale: linear below 1 kHz, logarithmic above.
const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}

/// Triangular, area-normalised filters spaced evenly on the mel scale from
/// 0 Hz to Nyquist.
pub struct MelFilterBank {
    weights: Vec<Vec<f32>>,
    centers: Vec<f32>,
}

impl MelFilterBank {
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let nyquist = sample_rate as f64 / 2.0;
        let num_bins = n_fft / 2 + 1;

        let fft_freqs: Vec<f64> = (0..num_bins)
            .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
            .collect();

        // n_mels + 2 edges: each filter spans edges[i]..edges[i + 2]
        let max_mel = hz_to_mel(nyquist);
        let edges: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_to_hz(max_mel * i as f64 / (n_mels + 1) as f64))
            .collect();

        let weights = (0..n_mels)
            .map(|i| {
                let (lo, mid, hi) = (edges[i], edges[i + 1], edges[i + 2]);
                let enorm = 2.0 / (hi - lo);
                fft_freqs
                    .iter()
                    .map(|&f| {
                        let lower = (f - lo) / (mid - lo);
                        let upper = (hi - f) / (hi - mid);
                        (lower.min(upper).max(0.0) * enorm) as f32
                    })
                    .collect()
            })
            .collect();

        let centers = edges[1..=n_mels].iter().map(|&hz| hz as f32).collect();

        Self { weights, centers }
    }

    pub fn centers(&self) -> &[f32] {
        &self.centers
    }

    pub fn apply(&self, power: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .map(|w| w.iter().zip(power).map(|(a, b)| a * b).sum::<f32>())
            .collect()
    }
}

/// Convert power to dB relative to the loudest cell, flooring everything at
/// `-top_db`.
pub fn power_to_db(frames: &mut [Vec<f32>], top_db: f32) {
    let reference = frames
        .iter()
        .flat_map(|f| f.iter())
        .copied()
        .fold(AMIN, f32::max);
    let ref_db = 10.0 * reference.log10();

    for frame in frames.iter_mut() {
        for v in frame.iter_mut() {
            *v = (10.0 * v.max(AMIN).log10() - ref_db).max(-top_db.abs());
        }
    }
}

pub struct MelEngine;

impl MelEngine {
    pub fn process(audio: &AudioData, params: &MelParams) -> Result<MelSpectrogram> {
        let power = FftEngine::power_frames(audio, params)?;
        let bank = MelFilterBank::new(audio.sample_rate, params.n_fft, params.n_mels);

        let mut frames: Vec<Vec<f32>> = power.iter().map(|p| bank.apply(p)).collect();
        power_to_db(&mut frames, params.top_db);

        log::debug!(
            "Mel spectrogram: {} frames, {} bins -> {} bands ({:.2}s @ {} Hz)",
            frames.len(),
            params.num_frequency_bins(),
            params.n_mels,
            audio.duration_seconds,
            audio.sample_rate
        );

        Ok(MelSpectrogram {
            frames,
            mel_frequencies: bank.centers().to_vec(),
            duration_seconds: audio.duration_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn mel_scale_inverts() {
        for hz in [0.0, 440.0, 1000.0, 4000.0, 11025.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 1e-6);
        }
        assert!((hz_to_mel(1000.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn filterbank_shape_and_centers() {
        let bank = MelFilterBank::new(22050, 2048, 128);
        assert_eq!(bank.centers().len(), 128);
        assert!(bank.centers().windows(2).all(|w| w[0] < w[1]));
        assert!(*bank.centers().last().unwrap() < 11025.0);
        assert_eq!(bank.weights[0].len(), 1025);
    }

    #[test]
    fn db_is_relative_to_peak_and_floored() {
        let mut frames = vec![vec![1.0, 0.1], vec![1e-12, 0.01]];
        power_to_db(&mut frames, 80.0);
        assert!((frames[0][0] - 0.0).abs() < 1e-5);
        assert!((frames[0][1] + 10.0).abs() < 1e-4);
        assert_eq!(frames[1][0], -80.0);
        assert!((frames[1][1] + 20.0).abs() < 1e-4);
    }

    #[test]
    fn tone_lands_in_matching_band() {
        let sr = 16000;
        let samples = (0..sr).map(|i| (2.0 * PI * 2000.0 * i as f32 / sr as f32).sin()).collect();
        let audio = AudioData::new(samples, sr);
        let params = MelParams { n_fft: 1024, hop_length: 256, n_mels: 64, ..MelParams::default() };

        let spec = MelEngine::process(&audio, &params).unwrap();
        assert_eq!(spec.num_bands(), 64);
        assert!((spec.duration_seconds - 1.0).abs() < 1e-9);

        let mid = &spec.frames[spec.num_frames() / 2];
        let loudest = mid
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        let center = spec.mel_frequencies[loudest];
        assert!((1700.0..2300.0).contains(&center), "loudest band centred at {center}");
    }
}
