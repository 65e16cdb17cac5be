use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Mono audio at its native sample rate.
#[derive(Debug, Clone)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub duration_seconds: f64,
}

impl AudioData {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_seconds = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f64 / sample_rate as f64
        };
        Self {
            samples,
            sample_rate,
            duration_seconds,
        }
    }

    /// Decode an encoded audio file held in memory.
    ///
    /// RIFF/WAVE goes through hound; everything else is probed by symphonia,
    /// using the mime subtype (e.g. `mpeg`, `flac`) as a hint when present.
    pub fn from_bytes(bytes: &[u8], mime_hint: Option<&str>) -> Result<Self> {
        if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE" {
            return Self::from_wav_bytes(bytes);
        }
        Self::from_encoded_bytes(bytes, mime_hint)
    }

    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = WavReader::new(Cursor::new(bytes)).context("Failed to parse WAV header")?;

        let spec = reader.spec();
        let sample_rate = spec.sample_rate;
        let channels = spec.channels;

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<f32>, _>>()
                .context("Failed to read float samples")?,
            SampleFormat::Int => match spec.bits_per_sample {
                8 => reader
                    .samples::<i8>()
                    .map(|s| s.map(|v| v as f32 / i8::MAX as f32))
                    .collect::<Result<Vec<f32>, _>>()
                    .context("Failed to read i8 samples")?,
                16 => reader
                    .samples::<i16>()
                    .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
                    .collect::<Result<Vec<f32>, _>>()
                    .context("Failed to read i16 samples")?,
                24 => reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / 8388608.0)) // 2^23
                    .collect::<Result<Vec<f32>, _>>()
                    .context("Failed to read i24 samples")?,
                32 => reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / i32::MAX as f32))
                    .collect::<Result<Vec<f32>, _>>()
                    .context("Failed to read i32 samples")?,
                bits => anyhow::bail!("Unsupported bit depth: {}", bits),
            },
        };

        Ok(Self::new(downmix(samples, channels as usize), sample_rate))
    }

    fn from_encoded_bytes(bytes: &[u8], mime_hint: Option<&str>) -> Result<Self> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());

        let mut hint = Hint::new();
        if let Some(mime) = mime_hint {
            hint.mime_type(mime);
            if let Some((_, subtype)) = mime.split_once('/') {
                hint.with_extension(subtype);
            }
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .context("Unrecognised audio format")?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No audio track found")?;
        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .context("Unknown sample rate")?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("Unsupported codec")?;

        let mut interleaved: Vec<f32> = Vec::new();
        let mut channels = track.codec_params.channels.map(|c| c.count()).unwrap_or(1);
        let mut sample_buf: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    log::warn!("Stopped reading packets early: {}", e);
                    break;
                }
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(e)) => {
                    log::warn!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(e) => return Err(e).context("Audio decoding failed"),
            };

            if sample_buf.is_none() {
                let spec = *decoded.spec();
                channels = spec.channels.count();
                sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
            }
            if let Some(buf) = sample_buf.as_mut() {
                buf.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(buf.samples());
            }
        }

        if interleaved.is_empty() {
            anyhow::bail!("Audio stream contains no samples");
        }

        Ok(Self::new(downmix(interleaved, channels), sample_rate))
    }

    /// Encode as a mono 16-bit PCM WAV file in memory.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).context("Failed to start WAV writer")?;
            for &sample in &self.samples {
                let s = (sample * i16::MAX as f32).clamp(i16::MIN as f32, i16::MAX as f32) as i16;
                writer.write_sample(s)?;
            }
            writer.finalize().context("Failed to finalize WAV data")?;
        }
        Ok(cursor.into_inner())
    }

    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn get_slice(&self, start_sample: usize, end_sample: usize) -> &[f32] {
        let start = start_sample.min(self.samples.len());
        let end = end_sample.min(self.samples.len());
        if start >= end {
            return &[];
        }
        &self.samples[start..end]
    }

    /// Sample index by truncation (floor for non-negative times).
    #[inline]
    pub fn time_to_sample(&self, time_seconds: f64) -> usize {
        (time_seconds.max(0.0) * self.sample_rate as f64) as usize
    }

    #[inline]
    pub fn sample_to_time(&self, sample: usize) -> f64 {
        sample as f64 / self.sample_rate as f64
    }
}

// Convert to mono (simple average)
fn downmix(samples: Vec<f32>, channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples;
    }
    samples
        .chunks(channels)
        .map(|chunk| chunk.iter().sum::<f32>() / channels as f32)
        .collect()
}
