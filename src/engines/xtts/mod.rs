//! XTTS v2 text-to-speech and voice-cloning engine.
//!
//! This module drives the multilingual Coqui XTTS v2 model through its `tts`
//! command-line program. The model handles acoustic modeling, speaker
//! embedding and vocoding; this engine maps requests onto CLI invocations
//! and reads back the WAV files the CLI writes.
//!
//! # System Requirements
//!
//! The **Coqui TTS CLI** must be installed and on PATH:
//! - `pip install coqui-tts` (Python 3.9+)
//! - GPU synthesis needs a CUDA-enabled PyTorch; pass [`Device::Cuda`]
//!
//! The `tts` executable can also be pinned explicitly (e.g. inside a
//! virtualenv) via [`XttsModelParams::binary`].
//!
//! # Model Selection
//!
//! | Source | How | Weights |
//! |---|---|---|
//! | Registry name | [`XttsEngine::load_named_model`] with e.g. [`XTTS_V2_MODEL`] | downloaded and cached by the CLI on first use |
//! | Local export | `load_model(dir)` where `dir` contains `config.json` | validated eagerly at load |
//!
//! # CLI Contract
//!
//! One blocking subprocess per synthesis call:
//!
//! ```text
//! tts --text "..." --model_name tts_models/multilingual/multi-dataset/xtts_v2 \
//!     --language_idx en [--speaker_wav speaker.wav] [--speed 1.3] \
//!     --out_path out.wav [--use_cuda]
//! ```
//!
//! A non-zero exit surfaces the CLI's stderr (or stdout, where the CLI
//! reports there) in [`XttsError::SynthesisFailed`].
//!
//! # Language Support
//!
//! Seventeen languages: en, es, fr, de, it, pt, pl, tr, ru, nl, cs, ar,
//! zh-cn, hu, ko, ja, hi. Cloning is cross-lingual: the speaker sample's
//! spoken language does not have to match [`XttsSynthesisParams::language`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use voice_cloner::SynthesisEngine;
//! use voice_cloner::engines::xtts::{XttsEngine, XTTS_V2_MODEL};
//!
//! let mut engine = XttsEngine::new();
//! engine.load_named_model(XTTS_V2_MODEL)?;
//! engine.synthesize_to_file("Hello, world!", &PathBuf::from("out.wav"), None)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cli;
pub mod engine;
pub mod error;
pub mod language;

pub use engine::{
    Device, ModelSpec, XttsEngine, XttsModelParams, XttsSynthesisParams, XTTS_V2_MODEL,
};
pub use error::XttsError;
pub use language::{Language, UnsupportedLanguage};
