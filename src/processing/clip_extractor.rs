use anyhow::{Context, Result};

use crate::data::{AudioData, ClipRange};

/// A sub-clip cut out of a longer recording.
#[derive(Debug, Clone)]
pub struct Clip {
    pub audio: AudioData,
    /// Time in the source recording where the clip begins.
    pub offset_seconds: f64,
}

pub struct ClipExtractor;

impl ClipExtractor {
    /// Samples `floor(start * sr) .. floor(end * sr)`, truncated to what the
    /// source holds. A reversed or out-of-range request yields a shorter or
    /// empty clip, never a panic.
    pub fn extract(audio: &AudioData, range: ClipRange) -> Clip {
        let start_sample = audio.time_to_sample(range.start);
        let end_sample = audio.time_to_sample(range.end);
        let samples = audio.get_slice(start_sample, end_sample).to_vec();

        Clip {
            audio: AudioData::new(samples, audio.sample_rate),
            offset_seconds: audio.sample_to_time(start_sample.min(audio.num_samples())),
        }
    }

    /// Extract and re-encode as WAV bytes.
    pub fn extract_wav(audio: &AudioData, range: ClipRange) -> Result<(Clip, Vec<u8>)> {
        let clip = Self::extract(audio, range);
        let wav = clip
            .audio
            .to_wav_bytes()
            .with_context(|| format!("Failed to encode clip {:.3}s..{:.3}s", range.start, range.end))?;
        log::info!(
            "Extracted {:.3}s clip {:.3}s..{:.3}s: {} samples, {} bytes",
            range.duration(),
            range.start,
            range.end,
            clip.audio.num_samples(),
            wav.len()
        );
        Ok((clip, wav))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(seconds: usize, sr: u32) -> AudioData {
        AudioData::new((0..seconds * sr as usize).map(|i| i as f32).collect(), sr)
    }

    #[test]
    fn clip_duration_matches_range() {
        let audio = ramp(10, 8000);
        let period = 1.0 / 8000.0;
        for (start, end) in [(2.0, 5.0), (0.0, 10.0), (0.33333, 0.77777), (9.9999, 10.0), (3.0, 3.0)] {
            let clip = ClipExtractor::extract(&audio, ClipRange::new(start, end));
            let got = clip.audio.duration_seconds;
            assert!((got - (end - start)).abs() <= period, "{start}..{end}: {got}");
        }
    }

    #[test]
    fn uses_floor_indexes() {
        let audio = ramp(1, 100);
        let clip = ClipExtractor::extract(&audio, ClipRange::new(0.105, 0.209));
        assert_eq!(clip.audio.samples.first(), Some(&10.0));
        assert_eq!(clip.audio.samples.last(), Some(&19.0));
        assert!((clip.offset_seconds - 0.10).abs() < 1e-12);
    }

    #[test]
    fn reversed_or_out_of_range_is_empty_or_truncated() {
        let audio = ramp(2, 100);
        assert!(ClipExtractor::extract(&audio, ClipRange::new(1.5, 0.5)).audio.samples.is_empty());
        assert_eq!(ClipExtractor::extract(&audio, ClipRange::new(1.5, 9.0)).audio.num_samples(), 50);
        assert!(ClipExtractor::extract(&audio, ClipRange::new(5.0, 9.0)).audio.samples.is_empty());
    }

    #[test]
    fn wav_output_is_playable() {
        let audio = AudioData::new(vec![0.1; 8000 * 10], 8000);
        let (clip, wav) = ClipExtractor::extract_wav(&audio, ClipRange::new(2.0, 5.0)).unwrap();
        let back = AudioData::from_bytes(&wav, Some("audio/wav")).unwrap();

        assert_eq!(back.num_samples(), clip.audio.num_samples());
        assert!((back.duration_seconds - 3.0).abs() < 1.0 / 8000.0);
    }
}
