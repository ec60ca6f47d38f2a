use std::path::{Path, PathBuf};

use crate::{SynthesisEngine, SynthesisResult};

use super::cli::{self, SynthesisCommand};
use super::error::XttsError;
use super::language::Language;

/// Registry name of the XTTS v2 voice-cloning model.
pub const XTTS_V2_MODEL: &str = "tts_models/multilingual/multi-dataset/xtts_v2";

/// Compute device the external CLI runs the model on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Device {
    #[default]
    Cpu,
    Cuda,
}

/// Identity of the model a loaded engine drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSpec {
    /// Registry model, downloaded and cached by the CLI on first use.
    Name(String),
    /// Local model export; `config` is its config.json.
    Dir { model_dir: PathBuf, config: PathBuf },
}

impl ModelSpec {
    /// Human-readable identity for logs and status output.
    pub fn describe(&self) -> String {
        match self {
            ModelSpec::Name(name) => name.clone(),
            ModelSpec::Dir { model_dir, .. } => model_dir.display().to_string(),
        }
    }
}

/// Parameters for configuring XTTS model loading.
#[derive(Debug, Clone, Default)]
pub struct XttsModelParams {
    /// Compute device passed to the CLI.
    pub device: Device,
    /// Explicit path to the `tts` executable. `None` searches PATH.
    pub binary: Option<PathBuf>,
    /// Extra arguments appended to every invocation, e.g. model-specific
    /// switches this crate does not map itself.
    pub extra_args: Vec<String>,
}

/// Parameters for configuring an XTTS synthesis request.
#[derive(Debug, Clone)]
pub struct XttsSynthesisParams {
    /// Target language for the generated speech.
    pub language: Language,
    /// Speech speed multiplier. Range: 0.5 to 2.0, default 1.0.
    pub speed: f32,
    /// Reference WAV whose voice the output should clone.
    /// `None` synthesizes with the model's default voice.
    pub speaker_wav: Option<PathBuf>,
}

impl Default for XttsSynthesisParams {
    fn default() -> Self {
        Self {
            language: Language::En,
            speed: 1.0,
            speaker_wav: None,
        }
    }
}

/// Resolved state of a loaded model: which model, which binary, how to run it.
struct XttsModel {
    binary: PathBuf,
    spec: ModelSpec,
    device: Device,
    extra_args: Vec<String>,
}

impl XttsModel {
    fn load(spec: ModelSpec, params: XttsModelParams) -> Result<Self, XttsError> {
        if let ModelSpec::Dir { model_dir, config } = &spec {
            if !config.is_file() {
                return Err(XttsError::InvalidModelDir(model_dir.clone()));
            }
        }
        let binary = cli::find_tts_binary(params.binary.as_deref())?;
        log::info!(
            "XTTS engine ready: model {} via {}",
            spec.describe(),
            binary.display()
        );

        Ok(Self {
            binary,
            spec,
            device: params.device,
            extra_args: params.extra_args,
        })
    }
}

/// XTTS v2 text-to-speech and voice-cloning engine.
///
/// Drives the Coqui `tts` command-line program; every synthesis call is one
/// blocking subprocess invocation. Registry models are downloaded and cached
/// by the CLI on first use, so the first call can take minutes on a cold
/// cache.
///
/// # Quick Start
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use voice_cloner::SynthesisEngine;
/// use voice_cloner::engines::xtts::{Language, XttsEngine, XttsSynthesisParams, XTTS_V2_MODEL};
///
/// let mut engine = XttsEngine::new();
/// engine.load_named_model(XTTS_V2_MODEL)?;
///
/// let params = XttsSynthesisParams {
///     language: Language::Fr,
///     speaker_wav: Some(PathBuf::from("speaker.wav")),
///     ..Default::default()
/// };
/// engine.synthesize_to_file("Bonjour tout le monde!", &PathBuf::from("out.wav"), Some(params))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct XttsEngine {
    model: Option<XttsModel>,
}

impl Default for XttsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl XttsEngine {
    /// Create a new engine with no model selected.
    pub fn new() -> Self {
        Self { model: None }
    }

    /// Select a registry model by name using default parameters.
    ///
    /// See [`XTTS_V2_MODEL`] for the voice-cloning default.
    pub fn load_named_model(&mut self, name: &str) -> Result<(), XttsError> {
        self.load_named_model_with_params(name, XttsModelParams::default())
    }

    /// Select a registry model by name with custom parameters.
    pub fn load_named_model_with_params(
        &mut self,
        name: &str,
        params: XttsModelParams,
    ) -> Result<(), XttsError> {
        self.model = Some(XttsModel::load(ModelSpec::Name(name.to_string()), params)?);
        Ok(())
    }

    /// Select a local model export: a directory holding the checkpoint and
    /// its config.json.
    pub fn load_local_model_with_params(
        &mut self,
        model_dir: &Path,
        params: XttsModelParams,
    ) -> Result<(), XttsError> {
        let spec = ModelSpec::Dir {
            model_dir: model_dir.to_path_buf(),
            config: model_dir.join("config.json"),
        };
        self.model = Some(XttsModel::load(spec, params)?);
        Ok(())
    }

    /// Human-readable identity of the loaded model, if any.
    pub fn model_description(&self) -> Option<String> {
        self.model.as_ref().map(|m| m.spec.describe())
    }

    fn render_to_file(
        &self,
        text: &str,
        wav_path: &Path,
        params: &XttsSynthesisParams,
    ) -> Result<(), XttsError> {
        let model = self.model.as_ref().ok_or(XttsError::ModelNotLoaded)?;
        SynthesisCommand {
            binary: &model.binary,
            model: &model.spec,
            device: model.device,
            extra_args: &model.extra_args,
            text,
            language: params.language,
            speaker_wav: params.speaker_wav.as_deref(),
            speed: params.speed,
            out_path: wav_path,
        }
        .run()
    }
}

impl Drop for XttsEngine {
    fn drop(&mut self) {
        self.unload_model();
    }
}

impl SynthesisEngine for XttsEngine {
    type SynthesisParams = XttsSynthesisParams;
    type ModelParams = XttsModelParams;

    fn load_model_with_params(
        &mut self,
        model_path: &Path,
        params: Self::ModelParams,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.load_local_model_with_params(model_path, params)?;
        Ok(())
    }

    fn unload_model(&mut self) {
        self.model = None;
    }

    fn synthesize(
        &mut self,
        text: &str,
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let p = params.unwrap_or_default();
        // Render into a fresh directory; the CLI creates the file itself.
        let dir = tempfile::tempdir().map_err(XttsError::Io)?;
        let wav_path = dir.path().join("output.wav");
        self.render_to_file(text, &wav_path, &p)?;
        SynthesisResult::from_wav_file(&wav_path)
    }

    fn synthesize_to_file(
        &mut self,
        text: &str,
        wav_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let p = params.unwrap_or_default();
        self.render_to_file(text, wav_path, &p)?;
        Ok(())
    }
}
