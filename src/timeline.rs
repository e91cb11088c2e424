//! In-memory audio timeline
//!
//! Mono f32 PCM at a fixed sample rate. Composition appends decoded speech
//! segments, silent spans, and repeated sub-timelines; export converts to
//! 16-bit PCM WAV for ffmpeg to encode.

use std::io::Cursor;

use crate::{Error, Result};

/// Default sample rate for synthesized speech and timelines
pub const SAMPLE_RATE: u32 = 24_000;

/// An ordered, append-only audio buffer
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTimeline {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioTimeline {
    /// Create an empty timeline at the given sample rate
    #[must_use]
    pub const fn new(sample_rate: u32) -> Self {
        Self {
            samples: Vec::new(),
            sample_rate,
        }
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether the timeline holds no audio
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples in the timeline
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Duration in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Append another timeline's audio to this one
    pub fn append(&mut self, other: &Self) {
        self.samples.extend_from_slice(&other.samples);
    }

    /// Append a silent span of the given duration
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn append_silence(&mut self, seconds: f64) {
        let count = (seconds * f64::from(self.sample_rate)).round() as usize;
        self.samples.extend(std::iter::repeat_n(0.0, count));
    }

    /// Append `count` copies of another timeline; `count == 0` appends nothing
    pub fn append_repeated(&mut self, other: &Self, count: u32) {
        self.samples
            .reserve(other.samples.len() * count as usize);
        for _ in 0..count {
            self.samples.extend_from_slice(&other.samples);
        }
    }

    /// Decode a timeline from WAV bytes
    ///
    /// Multi-channel input is downmixed by taking the first channel; speech
    /// artifacts are mono in practice.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] if the bytes are not a readable WAV or
    /// the sample rate does not match `expected_rate`.
    pub fn from_wav_bytes(bytes: &[u8], expected_rate: u32) -> Result<Self> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| Error::Artifact(e.to_string()))?;
        let spec = reader.spec();

        if spec.sample_rate != expected_rate {
            return Err(Error::Artifact(format!(
                "sample rate mismatch: artifact is {} Hz, timeline is {expected_rate} Hz",
                spec.sample_rate
            )));
        }

        let channels = usize::from(spec.channels);
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Int => reader
                .samples::<i16>()
                .step_by(channels)
                .map(|s| s.map(|v| f32::from(v) / 32768.0))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Artifact(e.to_string()))?,
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .step_by(channels)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Artifact(e.to_string()))?,
        };

        Ok(Self {
            samples,
            sample_rate: expected_rate,
        })
    }

    /// Encode the timeline as 16-bit PCM WAV bytes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Artifact`] if WAV encoding fails.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)
                .map_err(|e| Error::Artifact(e.to_string()))?;

            for &sample in &self.samples {
                // Convert f32 [-1.0, 1.0] to i16
                #[allow(clippy::cast_possible_truncation)]
                let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer
                    .write_sample(sample_i16)
                    .map_err(|e| Error::Artifact(e.to_string()))?;
            }

            writer
                .finalize()
                .map_err(|e| Error::Artifact(e.to_string()))?;
        }

        Ok(cursor.into_inner())
    }
}
