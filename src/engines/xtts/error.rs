use std::path::PathBuf;

/// Errors from the XTTS engine and its CLI bridge.
#[derive(thiserror::Error, Debug)]
pub enum XttsError {
    #[error(
        "tts CLI not found. Install Coqui TTS: `pip install coqui-tts` \
         (the `tts` entry point must be on PATH), or point \
         XttsModelParams::binary at the executable."
    )]
    TtsNotFound,
    #[error(
        "Invalid model directory {}: config.json not found. \
         Expected a local XTTS model export.",
        .0.display()
    )]
    InvalidModelDir(PathBuf),
    #[error("Model not loaded. Call load_model() first.")]
    ModelNotLoaded,
    #[error("tts exited with code {code:?}: {output}")]
    SynthesisFailed { code: Option<i32>, output: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),
}
