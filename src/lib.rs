//! # voice-cloner
//!
//! A Rust library for text-to-speech synthesis and voice cloning built on the
//! Coqui XTTS v2 model.
//!
//! ## Features
//!
//! - **Voice cloning**: clone a voice from a short WAV sample (6-15 seconds)
//! - **17 languages**: the full XTTS v2 set, with cross-lingual cloning
//! - **Batch synthesis**: render every row of a CSV or JSON file
//! - **Fallback engine**: plain synthesis via espeak-ng when XTTS is absent
//!
//! The heavy lifting happens inside the external `tts` program (installed
//! with `pip install coqui-tts`); this crate validates requests, drives the
//! process, and verifies the audio it writes.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! voice-cloner = "0.1"
//! ```
//!
//! ```rust,no_run
//! use std::path::Path;
//! use voice_cloner::cloner::{VoiceCloner, VoiceClonerConfig};
//! use voice_cloner::engines::xtts::Language;
//!
//! let mut cloner = VoiceCloner::new(VoiceClonerConfig::default());
//! cloner.initialize()?;
//!
//! cloner.simple_text_to_speech("Hello, world!", Path::new("output.wav"))?;
//! cloner.clone_voice_from_sample(
//!     "This is my voice, but cloned.",
//!     Path::new("speaker_sample.wav"),
//!     Path::new("cloned.wav"),
//!     Language::En,
//!     1.0,
//! )?;
//! # Ok::<(), voice_cloner::cloner::ClonerError>(())
//! ```

pub mod batch;
pub mod cloner;
pub mod engines;
pub mod sample;

use std::path::Path;

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio (24000 for XTTS v2)
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Read a WAV file back into a synthesis result.
    ///
    /// Integer formats are normalized to [-1.0, 1.0]; multi-channel audio is
    /// folded to mono by averaging each frame.
    pub fn from_wav_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                reader.samples::<f32>().collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let samples = if spec.channels > 1 {
            raw.chunks(spec.channels as usize)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        } else {
            raw
        };

        Ok(SynthesisResult {
            samples,
            sample_rate: spec.sample_rate,
        })
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Common interface for text-to-speech synthesis engines.
///
/// This trait defines the standard operations that all synthesis engines must support.
/// Each engine may have different parameter types for model loading and inference configuration.
pub trait SynthesisEngine {
    /// Parameters for configuring inference behavior (language, speed, etc.)
    type SynthesisParams;
    /// Parameters for configuring model loading (model name, device, etc.)
    type ModelParams: Default;

    /// Load a model from the specified path using default parameters.
    fn load_model(&mut self, model_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        self.load_model_with_params(model_path, Self::ModelParams::default())
    }

    /// Load a model from the specified path with custom parameters.
    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Unload the currently loaded model and free associated resources.
    fn unload_model(&mut self);

    /// Synthesize speech from the given text.
    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>>;

    /// Synthesize speech from the given text and write to a WAV file.
    ///
    /// Default implementation calls `synthesize()` then `SynthesisResult::write_wav()`.
    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.synthesize(text, params)?.write_wav(wav_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_round_trip_preserves_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");

        let result = SynthesisResult {
            samples: (0..2400).map(|i| (i as f32 * 0.01).sin() * 0.5).collect(),
            sample_rate: 24000,
        };
        result.write_wav(&path).unwrap();

        let restored = SynthesisResult::from_wav_file(&path).unwrap();
        assert_eq!(restored.sample_rate, 24000);
        assert_eq!(restored.samples.len(), 2400);
        assert!((restored.duration_secs() - 0.1).abs() < 1e-9);
        for (a, b) in result.samples.iter().zip(&restored.samples) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn from_wav_file_folds_stereo_and_normalizes_ints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(i16::MAX).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let result = SynthesisResult::from_wav_file(&path).unwrap();
        assert_eq!(result.samples.len(), 100);
        assert_eq!(result.sample_rate, 16000);
        // (1.0 + 0.0) / 2, with i16::MAX one step below full scale
        assert!((result.samples[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn duration_reflects_sample_rate() {
        let result = SynthesisResult {
            samples: vec![0.0; 48000],
            sample_rate: 24000,
        };
        assert!((result.duration_secs() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn write_wav_overwrites_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");

        SynthesisResult {
            samples: vec![0.25; 4800],
            sample_rate: 24000,
        }
        .write_wav(&path)
        .unwrap();
        SynthesisResult {
            samples: vec![0.5; 2400],
            sample_rate: 16000,
        }
        .write_wav(&path)
        .unwrap();

        let restored = SynthesisResult::from_wav_file(&path).unwrap();
        assert_eq!(restored.sample_rate, 16000);
        assert_eq!(restored.samples.len(), 2400);
    }
}
