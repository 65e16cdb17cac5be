//! Test WAV files for trying the viewer.
//!
//! Run with: spectroclip gen-test-audio [dir]

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use rand::Rng;
use std::f32::consts::PI;
use std::path::{Path, PathBuf};

const SAMPLE_RATE: u32 = 48000;

/// Write the full set of test files into `dir`, returning their paths.
pub fn generate_all(dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let files = [
        ("test_sine_440hz.wav", sine(440.0, 2.0)),
        ("test_chirp.wav", chirp(100.0, 1000.0, 3.0)),
        ("test_multitone.wav", multitone(&[220.0, 440.0, 880.0], 2.0)),
        ("test_noise.wav", white_noise(2.0)),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, samples) in files {
        let path = dir.join(name);
        write_wav(&path, &samples)?;
        log::info!("Wrote {} ({:.1}s)", path.display(), samples.len() as f32 / SAMPLE_RATE as f32);
        written.push(path);
    }
    Ok(written)
}

fn write_wav(path: &Path, samples: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in samples {
        writer.write_sample((sample * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

fn num_samples(duration: f32) -> usize {
    (SAMPLE_RATE as f32 * duration) as usize
}

fn sine(frequency: f32, duration: f32) -> Vec<f32> {
    (0..num_samples(duration))
        .map(|i| (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect()
}

// Linear sweep from start_freq to end_freq
fn chirp(start_freq: f32, end_freq: f32, duration: f32) -> Vec<f32> {
    (0..num_samples(duration))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let phase = 2.0 * PI * (start_freq * t + (end_freq - start_freq) * t * t / (2.0 * duration));
            phase.sin()
        })
        .collect()
}

fn multitone(frequencies: &[f32], duration: f32) -> Vec<f32> {
    (0..num_samples(duration))
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            frequencies
                .iter()
                .map(|&f| (2.0 * PI * f * t).sin() / frequencies.len() as f32)
                .sum::<f32>()
        })
        .collect()
}

fn white_noise(duration: f32) -> Vec<f32> {
    let mut rng = rand::rng();
    (0..num_samples(duration)).map(|_| rng.random_range(-1.0f32..1.0)).collect()
}
