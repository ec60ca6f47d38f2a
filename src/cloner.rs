//! The `VoiceCloner` façade.
//!
//! Owns one loaded engine for the life of the process and exposes the
//! user-facing operations: plain synthesis, voice cloning from a speaker
//! sample, and (in [`crate::batch`]) CSV/JSON batch rendering. Requests are
//! validated here before anything is spawned, and every output file is
//! checked afterwards.

use std::path::{Path, PathBuf};

use derive_builder::Builder;

use crate::engines::espeak::{self, EspeakEngine, EspeakError, EspeakSynthesisParams};
use crate::engines::xtts::{
    Device, Language, XttsEngine, XttsError, XttsModelParams, XttsSynthesisParams, XTTS_V2_MODEL,
};
use crate::sample::{self, SampleError, SpeakerSample};
use crate::SynthesisEngine;

/// Slowest supported speech rate multiplier.
pub const MIN_SPEED: f32 = 0.5;
/// Fastest supported speech rate multiplier.
pub const MAX_SPEED: f32 = 2.0;
/// Outputs below this size almost certainly contain no audio.
pub const MIN_OUTPUT_BYTES: u64 = 1000;

/// Errors from the façade and the validation it performs.
#[derive(thiserror::Error, Debug)]
pub enum ClonerError {
    #[error("Engine not initialized. Call initialize() first.")]
    NotInitialized,
    #[error("Text is empty; nothing to synthesize.")]
    EmptyText,
    #[error("Invalid speed {0}; speed must be a positive number.")]
    InvalidSpeed(f32),
    #[error(
        "Voice cloning needs the XTTS engine, but synthesis is running on \
         the espeak fallback. Install Coqui TTS (`pip install coqui-tts`) \
         to enable cloning."
    )]
    CloningUnavailable,
    #[error("Output file was not created: {}", .0.display())]
    OutputMissing(PathBuf),
    #[error(
        "Output file {} is only {bytes} bytes; synthesis likely produced \
         empty audio.",
        .path.display()
    )]
    OutputTooSmall { path: PathBuf, bytes: u64 },
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error(transparent)]
    Xtts(#[from] XttsError),
    #[error(transparent)]
    Espeak(#[from] EspeakError),
    #[error("Synthesis failed: {0}")]
    Engine(Box<dyn std::error::Error>),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A plain (default-voice) synthesis request.
///
/// ```rust
/// use voice_cloner::cloner::SynthesisRequestBuilder;
/// use voice_cloner::engines::xtts::Language;
///
/// let request = SynthesisRequestBuilder::default()
///     .text("Guten Tag!")
///     .output_path("hello_de.wav")
///     .language(Language::De)
///     .build()?;
/// assert_eq!(request.speed, 1.0);
/// # Ok::<(), voice_cloner::cloner::SynthesisRequestBuilderError>(())
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct SynthesisRequest {
    /// Text to speak. Must be non-empty after trimming.
    pub text: String,
    /// Where the WAV lands. An existing file is overwritten.
    pub output_path: PathBuf,
    /// Target language. Defaults to English.
    #[builder(default)]
    pub language: Language,
    /// Speed multiplier; values outside [0.5, 2.0] are clamped.
    #[builder(default = "1.0")]
    pub speed: f32,
}

/// A voice-cloning request: plain synthesis plus a speaker sample.
///
/// The sample must be a readable WAV of 6-15 seconds of clean speech. Its
/// spoken language may differ from `language` (cross-lingual cloning).
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct CloneRequest {
    /// Text to speak. Must be non-empty after trimming.
    pub text: String,
    /// Reference WAV to clone the voice from.
    pub speaker_wav: PathBuf,
    /// Where the WAV lands. An existing file is overwritten.
    pub output_path: PathBuf,
    /// Target language. Defaults to English.
    #[builder(default)]
    pub language: Language,
    /// Speed multiplier; values outside [0.5, 2.0] are clamped.
    #[builder(default = "1.0")]
    pub speed: f32,
}

/// Configuration for [`VoiceCloner::initialize`].
#[derive(Debug, Clone)]
pub struct VoiceClonerConfig {
    /// Registry model to load, unless `model_dir` is set.
    pub model_name: String,
    /// Local model directory (must contain config.json); overrides
    /// `model_name` when set.
    pub model_dir: Option<PathBuf>,
    /// Compute device for the XTTS CLI.
    pub device: Device,
    /// Explicit path to the `tts` executable. `None` searches PATH.
    pub tts_binary: Option<PathBuf>,
    /// Extra arguments for every `tts` invocation.
    pub extra_args: Vec<String>,
    /// Fall back to espeak-ng for plain synthesis when XTTS is unavailable.
    pub enable_fallback: bool,
    /// Outputs smaller than this many bytes are treated as failed synthesis.
    pub min_output_bytes: u64,
}

impl Default for VoiceClonerConfig {
    fn default() -> Self {
        Self {
            model_name: XTTS_V2_MODEL.to_string(),
            model_dir: None,
            device: Device::Cpu,
            tts_binary: None,
            extra_args: Vec::new(),
            enable_fallback: true,
            min_output_bytes: MIN_OUTPUT_BYTES,
        }
    }
}

enum ActiveEngine {
    Xtts(XttsEngine),
    Espeak(EspeakEngine),
}

/// Façade over an external TTS engine: load a model once, then synthesize
/// and clone voices through it for the rest of the process.
///
/// ```rust,no_run
/// use std::path::Path;
/// use voice_cloner::cloner::{VoiceCloner, VoiceClonerConfig};
/// use voice_cloner::engines::xtts::Language;
///
/// let mut cloner = VoiceCloner::new(VoiceClonerConfig::default());
/// cloner.initialize()?;
///
/// cloner.simple_text_to_speech("Hello, world!", Path::new("simple.wav"))?;
/// cloner.clone_voice_from_sample(
///     "Same voice, new words.",
///     Path::new("speaker_sample.wav"),
///     Path::new("cloned.wav"),
///     Language::En,
///     1.0,
/// )?;
/// # Ok::<(), voice_cloner::cloner::ClonerError>(())
/// ```
pub struct VoiceCloner {
    config: VoiceClonerConfig,
    engine: Option<ActiveEngine>,
}

impl Default for VoiceCloner {
    fn default() -> Self {
        Self::new(VoiceClonerConfig::default())
    }
}

impl VoiceCloner {
    /// Create an uninitialized cloner. No engine is touched until
    /// [`VoiceCloner::initialize`].
    pub fn new(config: VoiceClonerConfig) -> Self {
        Self {
            config,
            engine: None,
        }
    }

    pub fn config(&self) -> &VoiceClonerConfig {
        &self.config
    }

    /// Load the configured engine. Idempotent: a second call is a no-op.
    ///
    /// Tries XTTS first. When that fails and the fallback is enabled,
    /// espeak-ng takes over plain synthesis and the cloner runs degraded
    /// (cloning refused). With no engine available at all, the XTTS error
    /// is returned and the cloner stays uninitialized.
    pub fn initialize(&mut self) -> Result<(), ClonerError> {
        if self.engine.is_some() {
            log::debug!("initialize() called on an initialized cloner; ignoring");
            return Ok(());
        }

        match self.load_xtts() {
            Ok(engine) => {
                self.engine = Some(ActiveEngine::Xtts(engine));
                Ok(())
            }
            Err(err) if self.config.enable_fallback => {
                log::warn!("XTTS unavailable ({err}); trying the espeak fallback");
                let mut fallback = EspeakEngine::new();
                match fallback.load_system() {
                    Ok(()) => {
                        log::warn!("Running degraded: plain synthesis only, cloning disabled");
                        self.engine = Some(ActiveEngine::Espeak(fallback));
                        Ok(())
                    }
                    Err(fallback_err) => {
                        log::error!("espeak fallback unavailable too: {fallback_err}");
                        Err(err)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    fn load_xtts(&self) -> Result<XttsEngine, ClonerError> {
        let params = XttsModelParams {
            device: self.config.device,
            binary: self.config.tts_binary.clone(),
            extra_args: self.config.extra_args.clone(),
        };
        let mut engine = XttsEngine::new();
        match &self.config.model_dir {
            Some(dir) => engine.load_local_model_with_params(dir, params)?,
            None => engine.load_named_model_with_params(&self.config.model_name, params)?,
        }
        Ok(engine)
    }

    pub fn is_initialized(&self) -> bool {
        self.engine.is_some()
    }

    /// True when the active engine can clone voices.
    pub fn cloning_available(&self) -> bool {
        matches!(self.engine, Some(ActiveEngine::Xtts(_)))
    }

    /// Name of the active engine, for status output.
    pub fn engine_name(&self) -> Option<&'static str> {
        match &self.engine {
            Some(ActiveEngine::Xtts(_)) => Some("xtts"),
            Some(ActiveEngine::Espeak(_)) => Some("espeak"),
            None => None,
        }
    }

    /// Identity of the loaded model when running on XTTS.
    pub fn model_description(&self) -> Option<String> {
        match &self.engine {
            Some(ActiveEngine::Xtts(engine)) => engine.model_description(),
            _ => None,
        }
    }

    /// Speak `text` with the engine's default voice, guessing the language
    /// from the script of the text.
    pub fn simple_text_to_speech(
        &mut self,
        text: &str,
        output_path: &Path,
    ) -> Result<(), ClonerError> {
        let text = validated_text(text)?;
        let language = Language::detect(text);
        log::info!(
            "Synthesizing {} chars [{language}] -> {}",
            text.chars().count(),
            output_path.display()
        );
        self.render(text, output_path, language, 1.0, None)
    }

    /// Speak a full [`SynthesisRequest`] with explicit language and speed.
    pub fn synthesize(&mut self, request: &SynthesisRequest) -> Result<(), ClonerError> {
        let text = validated_text(&request.text)?;
        let speed = validated_speed(request.speed)?;
        log::info!(
            "Synthesizing {} chars [{}, {speed}x] -> {}",
            text.chars().count(),
            request.language,
            request.output_path.display()
        );
        self.render(text, &request.output_path, request.language, speed, None)
    }

    /// Synthesize `text` in `language` with the voice from `speaker_wav`.
    ///
    /// The sample is validated first (present, readable WAV, 6-15 s). Cross-
    /// lingual cloning is supported: the sample's spoken language does not
    /// have to match `language`. Requires the XTTS engine; in degraded mode
    /// this fails with [`ClonerError::CloningUnavailable`].
    pub fn clone_voice_from_sample(
        &mut self,
        text: &str,
        speaker_wav: &Path,
        output_path: &Path,
        language: Language,
        speed: f32,
    ) -> Result<(), ClonerError> {
        let text = validated_text(text)?;
        let speed = validated_speed(speed)?;
        let sample = sample::inspect_sample(speaker_wav)?;
        self.ensure_cloning_available()?;

        log::info!(
            "Cloning voice from {} ({:.1}s) [{language}, {speed}x] -> {}",
            sample.path.display(),
            sample.duration_secs,
            output_path.display()
        );
        self.render(text, output_path, language, speed, Some(speaker_wav))
    }

    /// Run a full [`CloneRequest`].
    pub fn clone_voice(&mut self, request: &CloneRequest) -> Result<(), ClonerError> {
        self.clone_voice_from_sample(
            &request.text,
            &request.speaker_wav,
            &request.output_path,
            request.language,
            request.speed,
        )
    }

    /// Validate a speaker sample without synthesizing anything.
    pub fn inspect_sample(&self, speaker_wav: &Path) -> Result<SpeakerSample, ClonerError> {
        Ok(sample::inspect_sample(speaker_wav)?)
    }

    fn ensure_cloning_available(&self) -> Result<(), ClonerError> {
        match &self.engine {
            Some(ActiveEngine::Xtts(_)) => Ok(()),
            Some(ActiveEngine::Espeak(_)) => Err(ClonerError::CloningUnavailable),
            None => Err(ClonerError::NotInitialized),
        }
    }

    fn render(
        &mut self,
        text: &str,
        output_path: &Path,
        language: Language,
        speed: f32,
        speaker_wav: Option<&Path>,
    ) -> Result<(), ClonerError> {
        let engine = self.engine.as_mut().ok_or(ClonerError::NotInitialized)?;
        match engine {
            ActiveEngine::Xtts(xtts) => {
                let params = XttsSynthesisParams {
                    language,
                    speed,
                    speaker_wav: speaker_wav.map(Path::to_path_buf),
                };
                xtts.synthesize_to_file(text, output_path, Some(params))
                    .map_err(ClonerError::Engine)?;
            }
            ActiveEngine::Espeak(fallback) => {
                let params = EspeakSynthesisParams {
                    voice: espeak::voice_for_language(language).to_string(),
                    words_per_minute: espeak::wpm_for_speed(speed),
                };
                fallback
                    .synthesize_to_file(text, output_path, Some(params))
                    .map_err(ClonerError::Engine)?;
            }
        }

        let bytes = self.verify_output(output_path)?;
        log::info!("Audio saved: {} ({bytes} bytes)", output_path.display());
        Ok(())
    }

    fn verify_output(&self, path: &Path) -> Result<u64, ClonerError> {
        let metadata =
            std::fs::metadata(path).map_err(|_| ClonerError::OutputMissing(path.to_path_buf()))?;
        let bytes = metadata.len();
        if bytes < self.config.min_output_bytes {
            return Err(ClonerError::OutputTooSmall {
                path: path.to_path_buf(),
                bytes,
            });
        }
        Ok(bytes)
    }
}

fn validated_text(text: &str) -> Result<&str, ClonerError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ClonerError::EmptyText);
    }
    Ok(trimmed)
}

fn validated_speed(speed: f32) -> Result<f32, ClonerError> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(ClonerError::InvalidSpeed(speed));
    }
    let clamped = speed.clamp(MIN_SPEED, MAX_SPEED);
    if clamped != speed {
        log::warn!("Speed {speed} outside [{MIN_SPEED}, {MAX_SPEED}]; clamped to {clamped}");
    }
    Ok(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_sample_wav(path: &Path, secs: f64) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..(secs * 8000.0) as usize {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn builders_fill_in_defaults() {
        let request = SynthesisRequestBuilder::default()
            .text("Hello")
            .output_path("out.wav")
            .build()
            .unwrap();
        assert_eq!(request.language, Language::En);
        assert_eq!(request.speed, 1.0);

        let clone = CloneRequestBuilder::default()
            .text("Hello")
            .speaker_wav("speaker.wav")
            .output_path("cloned.wav")
            .language(Language::Ru)
            .speed(1.3)
            .build()
            .unwrap();
        assert_eq!(clone.language, Language::Ru);
        assert_eq!(clone.speed, 1.3);
    }

    #[test]
    fn builder_requires_mandatory_fields() {
        let missing_output = SynthesisRequestBuilder::default().text("Hello").build();
        assert!(missing_output.is_err());
    }

    #[test]
    fn empty_text_is_rejected_before_anything_else() {
        let mut cloner = VoiceCloner::default();
        assert!(matches!(
            cloner.simple_text_to_speech("", Path::new("out.wav")),
            Err(ClonerError::EmptyText)
        ));
        assert!(matches!(
            cloner.simple_text_to_speech("   \n\t ", Path::new("out.wav")),
            Err(ClonerError::EmptyText)
        ));
    }

    #[test]
    fn synthesis_requires_initialization() {
        let mut cloner = VoiceCloner::default();
        assert!(matches!(
            cloner.simple_text_to_speech("Hello", Path::new("out.wav")),
            Err(ClonerError::NotInitialized)
        ));
    }

    #[test]
    fn non_positive_speeds_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let sample_path = dir.path().join("sample.wav");
        write_sample_wav(&sample_path, 8.0);

        let mut cloner = VoiceCloner::default();
        for bad in [0.0, -1.0, f32::NAN] {
            let err = cloner
                .clone_voice_from_sample(
                    "Hello",
                    &sample_path,
                    &dir.path().join("out.wav"),
                    Language::En,
                    bad,
                )
                .unwrap_err();
            assert!(matches!(err, ClonerError::InvalidSpeed(_)), "speed {bad}");
        }
    }

    #[test]
    fn out_of_range_speeds_clamp_to_the_supported_window() {
        assert_eq!(validated_speed(0.3).unwrap(), 0.5);
        assert_eq!(validated_speed(3.0).unwrap(), 2.0);
        assert_eq!(validated_speed(1.0).unwrap(), 1.0);
        assert_eq!(validated_speed(1.3).unwrap(), 1.3);
    }

    #[test]
    fn sample_problems_surface_before_engine_state() {
        let mut cloner = VoiceCloner::default();
        let err = cloner
            .clone_voice_from_sample(
                "Hello",
                Path::new("/nonexistent/speaker.wav"),
                Path::new("out.wav"),
                Language::En,
                1.0,
            )
            .unwrap_err();
        assert!(matches!(err, ClonerError::Sample(SampleError::NotFound(_))));
    }

    #[test]
    fn cloning_with_valid_sample_still_needs_an_engine() {
        let dir = tempfile::tempdir().unwrap();
        let sample_path = dir.path().join("sample.wav");
        write_sample_wav(&sample_path, 8.0);

        let mut cloner = VoiceCloner::default();
        let err = cloner
            .clone_voice_from_sample(
                "Hello",
                &sample_path,
                &dir.path().join("out.wav"),
                Language::En,
                1.0,
            )
            .unwrap_err();
        assert!(matches!(err, ClonerError::NotInitialized));
    }

    #[test]
    fn initialization_failure_reports_the_xtts_cause() {
        let config = VoiceClonerConfig {
            tts_binary: Some(PathBuf::from("/nonexistent/tts")),
            enable_fallback: false,
            ..Default::default()
        };
        let mut cloner = VoiceCloner::new(config);
        let err = cloner.initialize().unwrap_err();
        assert!(matches!(err, ClonerError::Xtts(XttsError::TtsNotFound)));
        assert!(!cloner.is_initialized());
    }

    #[test]
    fn fallback_engine_refuses_to_clone() {
        // Needs espeak present and the tts CLI absent.
        if which::which("tts").is_ok() || which::which("espeak-ng").is_err() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        let sample_path = dir.path().join("sample.wav");
        write_sample_wav(&sample_path, 8.0);

        let mut cloner = VoiceCloner::default();
        cloner.initialize().unwrap();
        assert_eq!(cloner.engine_name(), Some("espeak"));
        assert!(!cloner.cloning_available());
        assert!(cloner.model_description().is_none());

        let err = cloner
            .clone_voice_from_sample(
                "Hello",
                &sample_path,
                &dir.path().join("out.wav"),
                Language::En,
                1.0,
            )
            .unwrap_err();
        assert!(matches!(err, ClonerError::CloningUnavailable));

        // a second initialize is a no-op
        cloner.initialize().unwrap();
        assert_eq!(cloner.engine_name(), Some("espeak"));
    }

    #[test]
    #[ignore] // Only run manually when Coqui TTS is installed
    fn hello_world_renders_a_playable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("hello.wav");

        let mut cloner = VoiceCloner::default();
        cloner.initialize().unwrap();
        cloner.simple_text_to_speech("Hello world!", &out).unwrap();

        let result = crate::SynthesisResult::from_wav_file(&out).unwrap();
        assert!(result.sample_rate > 0);
        assert!(result.duration_secs() > 0.2);
    }

    #[test]
    #[ignore] // Only run manually when Coqui TTS is installed
    fn clones_into_every_supported_language() {
        let dir = tempfile::tempdir().unwrap();

        let mut cloner = VoiceCloner::default();
        cloner.initialize().unwrap();
        assert!(cloner.cloning_available());

        let sample_path = dir.path().join("speaker.wav");
        cloner
            .simple_text_to_speech(
                "Hello, this is a voice sample for cloning demonstration. My name \
                 is Test Speaker, and I am recording a short passage so the model \
                 has enough audio to capture how I sound.",
                &sample_path,
            )
            .unwrap();

        for language in Language::ALL {
            let out = dir.path().join(format!("cloned_{language}.wav"));
            cloner
                .clone_voice_from_sample("Hello world!", &sample_path, &out, language, 1.0)
                .unwrap();
            assert!(
                std::fs::metadata(&out).unwrap().len() > MIN_OUTPUT_BYTES,
                "{language}"
            );
        }
    }

    #[test]
    fn output_verification_rejects_missing_and_tiny_files() {
        let dir = tempfile::tempdir().unwrap();
        let cloner = VoiceCloner::default();

        let missing = dir.path().join("missing.wav");
        assert!(matches!(
            cloner.verify_output(&missing),
            Err(ClonerError::OutputMissing(_))
        ));

        let tiny = dir.path().join("tiny.wav");
        std::fs::write(&tiny, b"RIFF").unwrap();
        assert!(matches!(
            cloner.verify_output(&tiny),
            Err(ClonerError::OutputTooSmall { bytes: 4, .. })
        ));

        let big = dir.path().join("big.wav");
        std::fs::write(&big, vec![0u8; 4096]).unwrap();
        assert_eq!(cloner.verify_output(&big).unwrap(), 4096);
    }
}
