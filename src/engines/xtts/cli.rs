use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use super::engine::{Device, ModelSpec};
use super::error::XttsError;
use super::language::Language;

/// Name of the Coqui TTS command-line entry point.
pub(super) const TTS_BINARY: &str = "tts";

/// Locate the `tts` executable.
///
/// An explicit path wins when it points at a real file; otherwise the
/// binary is searched on PATH.
pub(super) fn find_tts_binary(explicit: Option<&Path>) -> Result<PathBuf, XttsError> {
    match explicit {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(_) => Err(XttsError::TtsNotFound),
        None => which::which(TTS_BINARY).map_err(|_| XttsError::TtsNotFound),
    }
}

/// One blocking invocation of the `tts` CLI.
///
/// Flags driven here: `--text`, `--model_name` (or `--model_path` +
/// `--config_path` for a local export), `--language_idx`, `--speaker_wav`,
/// `--speed`, `--out_path`, `--use_cuda`. `--speed` is only emitted when it
/// differs from 1.0, so CLI builds without the speed argument keep working
/// at the default rate; on such builds a non-default speed fails with the
/// CLI's own usage error carried in the output.
pub(super) struct SynthesisCommand<'a> {
    pub binary: &'a Path,
    pub model: &'a ModelSpec,
    pub device: Device,
    pub extra_args: &'a [String],
    pub text: &'a str,
    pub language: Language,
    pub speaker_wav: Option<&'a Path>,
    pub speed: f32,
    pub out_path: &'a Path,
}

impl SynthesisCommand<'_> {
    pub(super) fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--text".into(), self.text.into()];

        match self.model {
            ModelSpec::Name(name) => {
                args.push("--model_name".into());
                args.push(name.into());
            }
            ModelSpec::Dir { model_dir, config } => {
                args.push("--model_path".into());
                args.push(model_dir.into());
                args.push("--config_path".into());
                args.push(config.into());
            }
        }

        args.push("--language_idx".into());
        args.push(self.language.as_str().into());

        if let Some(wav) = self.speaker_wav {
            args.push("--speaker_wav".into());
            args.push(wav.into());
        }

        if self.speed != 1.0 {
            args.push("--speed".into());
            args.push(self.speed.to_string().into());
        }

        args.push("--out_path".into());
        args.push(self.out_path.into());

        if self.device == Device::Cuda {
            args.push("--use_cuda".into());
        }

        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    pub(super) fn run(&self) -> Result<(), XttsError> {
        let args = self.args();
        log::debug!("Running {} {:?}", self.binary.display(), args);
        let started = Instant::now();

        let output = Command::new(self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    XttsError::TtsNotFound
                } else {
                    XttsError::Io(e)
                }
            })?;

        if !output.status.success() {
            // the CLI reports some failures on stdout only
            let stderr = String::from_utf8_lossy(&output.stderr);
            let text = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(XttsError::SynthesisFailed {
                code: output.status.code(),
                output: text,
            });
        }

        log::debug!("tts finished in {:.2}s", started.elapsed().as_secs_f64());
        Ok(())
    }
}
