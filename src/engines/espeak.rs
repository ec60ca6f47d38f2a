//! espeak-ng fallback engine.
//!
//! Formant synthesis only: robotic but dependency-light, useful when the
//! XTTS stack is not installed. This engine cannot clone voices; the
//! [`VoiceCloner`](crate::cloner::VoiceCloner) façade routes only plain
//! synthesis here.
//!
//! # System Requirements
//!
//! **espeak-ng** (or legacy `espeak`) must be installed:
//! - **Linux**: `sudo apt-get install espeak-ng`
//! - **macOS**: `brew install espeak-ng`
//! - **Windows**: Download installer from <https://espeak-ng.org/download>

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{SynthesisEngine, SynthesisResult};

use super::xtts::Language;

/// Binary names to try, in order of preference.
const ESPEAK_BINARIES: [&str; 2] = ["espeak-ng", "espeak"];

/// Errors from the espeak engine.
#[derive(thiserror::Error, Debug)]
pub enum EspeakError {
    #[error(
        "espeak-ng not found. Install: Linux: `sudo apt-get install espeak-ng`, \
         macOS: `brew install espeak-ng`, Windows: https://espeak-ng.org/download"
    )]
    EspeakNotFound,
    #[error("Engine not loaded. Call load_model() first.")]
    NotLoaded,
    #[error("espeak exited with code {code:?}: {stderr}")]
    SynthesisFailed { code: Option<i32>, stderr: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parameters for configuring the espeak engine.
#[derive(Debug, Clone, Default)]
pub struct EspeakModelParams {
    /// Explicit path to the espeak binary. `None` prefers `espeak-ng` from
    /// PATH, falling back to `espeak`.
    pub binary: Option<PathBuf>,
}

/// Parameters for one espeak synthesis request.
#[derive(Debug, Clone)]
pub struct EspeakSynthesisParams {
    /// espeak voice code (e.g. `"en"`, `"ru"`, `"cmn"`).
    pub voice: String,
    /// Speaking rate in words per minute. `None` keeps the espeak default.
    pub words_per_minute: Option<u32>,
}

impl Default for EspeakSynthesisParams {
    fn default() -> Self {
        Self {
            voice: "en".to_string(),
            words_per_minute: None,
        }
    }
}

/// Map a synthesis language to the closest espeak-ng voice code.
///
/// espeak names Mandarin `cmn`; every other supported language uses its
/// ISO code directly.
pub fn voice_for_language(language: Language) -> &'static str {
    match language {
        Language::ZhCn => "cmn",
        other => other.as_str(),
    }
}

/// espeak speaks at 175 words per minute by default.
const DEFAULT_WPM: f32 = 175.0;

/// Map a speed multiplier onto espeak's words-per-minute scale.
/// `None` keeps the engine default.
pub fn wpm_for_speed(speed: f32) -> Option<u32> {
    if speed == 1.0 {
        None
    } else {
        Some((DEFAULT_WPM * speed).round() as u32)
    }
}

fn find_espeak_binary(explicit: Option<&Path>) -> Result<PathBuf, EspeakError> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(_) => Err(EspeakError::EspeakNotFound),
        None => ESPEAK_BINARIES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or(EspeakError::EspeakNotFound),
    }
}

struct EspeakRuntime {
    binary: PathBuf,
    data_dir: Option<PathBuf>,
}

impl EspeakRuntime {
    fn run(
        &self,
        text: &str,
        wav_path: &Path,
        params: &EspeakSynthesisParams,
    ) -> Result<(), EspeakError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--stdin").arg("-v").arg(&params.voice);
        if let Some(wpm) = params.words_per_minute {
            cmd.arg("-s").arg(wpm.to_string());
        }
        if let Some(data_dir) = &self.data_dir {
            cmd.arg("--path").arg(data_dir);
        }
        cmd.arg("-w").arg(wav_path);

        log::debug!("Running {cmd:?}");

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    EspeakError::EspeakNotFound
                } else {
                    EspeakError::Io(e)
                }
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            // espeak treats stdin as line-oriented; a missing final newline
            // can truncate the last token.
            stdin.write_all(text.as_bytes()).map_err(EspeakError::Io)?;
            if !text.ends_with('\n') {
                stdin.write_all(b"\n").map_err(EspeakError::Io)?;
            }
        }

        let output = child.wait_with_output().map_err(EspeakError::Io)?;
        if !output.status.success() {
            return Err(EspeakError::SynthesisFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Plain text-to-speech engine driving espeak-ng.
///
/// # Quick Start
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use voice_cloner::SynthesisEngine;
/// use voice_cloner::engines::espeak::EspeakEngine;
///
/// let mut engine = EspeakEngine::new();
/// engine.load_system()?;
/// engine.synthesize_to_file("Hello, world!", &PathBuf::from("out.wav"), None)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct EspeakEngine {
    runtime: Option<EspeakRuntime>,
}

impl Default for EspeakEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EspeakEngine {
    /// Create a new engine; call [`EspeakEngine::load_system`] or
    /// [`SynthesisEngine::load_model`] before synthesizing.
    pub fn new() -> Self {
        Self { runtime: None }
    }

    /// Use the system espeak installation: binary from PATH, default voice
    /// data.
    pub fn load_system(&mut self) -> Result<(), EspeakError> {
        self.load_system_with_params(EspeakModelParams::default())
    }

    /// Use the system espeak installation with custom parameters.
    pub fn load_system_with_params(
        &mut self,
        params: EspeakModelParams,
    ) -> Result<(), EspeakError> {
        let binary = find_espeak_binary(params.binary.as_deref())?;
        log::info!("espeak engine ready: {}", binary.display());
        self.runtime = Some(EspeakRuntime {
            binary,
            data_dir: None,
        });
        Ok(())
    }
}

impl Drop for EspeakEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

impl SynthesisEngine for EspeakEngine {
    type SynthesisParams = EspeakSynthesisParams;
    type ModelParams = EspeakModelParams;

    /// Load with an explicit espeak voice-data directory (`espeak-ng --path`).
    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if !model_path.is_dir() {
            return Err(Box::new(EspeakError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("espeak data directory not found: {}", model_path.display()),
            ))));
        }
        let binary = find_espeak_binary(params.binary.as_deref())?;
        log::info!(
            "espeak engine ready: {} (data {})",
            binary.display(),
            model_path.display()
        );
        self.runtime = Some(EspeakRuntime {
            binary,
            data_dir: Some(model_path.to_path_buf()),
        });
        Ok(())
    }

    fn unload_model(&mut self) {
        self.runtime = None;
    }

    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let p = params.unwrap_or_default();
        let runtime = self.runtime.as_ref().ok_or(EspeakError::NotLoaded)?;
        let dir = tempfile::tempdir().map_err(EspeakError::Io)?;
        let wav_path = dir.path().join("output.wav");
        runtime.run(text, &wav_path, &p)?;
        SynthesisResult::from_wav_file(&wav_path)
    }

    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let p = params.unwrap_or_default();
        let runtime = self.runtime.as_ref().ok_or(EspeakError::NotLoaded)?;
        runtime.run(text, wav_path, &p)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn espeak_available() -> bool {
        ESPEAK_BINARIES
            .iter()
            .any(|name| which::which(name).is_ok())
    }

    #[test]
    fn maps_mandarin_to_cmn_voice() {
        assert_eq!(voice_for_language(Language::ZhCn), "cmn");
        assert_eq!(voice_for_language(Language::En), "en");
        assert_eq!(voice_for_language(Language::Ru), "ru");
    }

    #[test]
    fn speed_multiplier_scales_words_per_minute() {
        assert_eq!(wpm_for_speed(1.0), None);
        assert_eq!(wpm_for_speed(2.0), Some(350));
        assert_eq!(wpm_for_speed(0.5), Some(88));
    }

    #[test]
    fn explicit_binary_path_must_exist() {
        let err = find_espeak_binary(Some(Path::new("/nonexistent/espeak"))).unwrap_err();
        assert!(matches!(err, EspeakError::EspeakNotFound));
    }

    #[test]
    fn synthesize_without_load_reports_not_loaded() {
        let mut engine = EspeakEngine::new();
        let err = engine.synthesize("Hello", None).unwrap_err();
        let espeak = err.downcast_ref::<EspeakError>().unwrap();
        assert!(matches!(espeak, EspeakError::NotLoaded));
    }

    #[test]
    fn missing_data_directory_fails_load() {
        let mut engine = EspeakEngine::new();
        assert!(engine.load_model(Path::new("/nonexistent/espeak-data")).is_err());
    }

    #[test]
    fn system_synthesis_produces_audio() {
        // Skip when espeak is unavailable in the execution environment.
        if !espeak_available() {
            return;
        }

        let mut engine = EspeakEngine::new();
        engine.load_system().expect("espeak should load");
        let result = engine
            .synthesize("Hello from the fallback engine.", None)
            .expect("synthesis should succeed");

        assert!(result.sample_rate > 0);
        assert!(result.duration_secs() > 0.2);
    }
}
