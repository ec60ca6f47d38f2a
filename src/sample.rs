//! Speaker-sample inspection.
//!
//! XTTS derives the cloned voice from a short reference recording. Quality
//! drops sharply outside a 6-15 second window of clean speech, so samples
//! are checked before any synthesis is attempted.

use std::path::{Path, PathBuf};

/// Minimum reference duration in seconds.
pub const MIN_SAMPLE_SECS: f64 = 6.0;
/// Maximum reference duration in seconds.
pub const MAX_SAMPLE_SECS: f64 = 15.0;

/// Errors from speaker-sample validation.
#[derive(thiserror::Error, Debug)]
pub enum SampleError {
    #[error(
        "Speaker sample not found: {}. Provide a WAV file with 6-15 seconds \
         of clean speech.",
        .0.display()
    )]
    NotFound(PathBuf),
    #[error("Could not read speaker sample {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: hound::Error,
    },
    #[error(
        "Speaker sample is too short ({duration:.1}s). At least 6 seconds of \
         clean speech are required."
    )]
    TooShort { duration: f64 },
    #[error(
        "Speaker sample is too long ({duration:.1}s). Use at most 15 seconds; \
         trim the recording to its cleanest stretch."
    )]
    TooLong { duration: f64 },
}

/// What a reference WAV turned out to contain.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeakerSample {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Read a reference WAV's header and enforce the 6-15 second window.
///
/// Only the header is parsed; samples are never loaded.
pub fn inspect_sample(path: &Path) -> Result<SpeakerSample, SampleError> {
    if !path.exists() {
        return Err(SampleError::NotFound(path.to_path_buf()));
    }

    let reader = hound::WavReader::open(path).map_err(|source| SampleError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();
    // hound reports duration in frames (samples per channel)
    let duration_secs = reader.duration() as f64 / spec.sample_rate as f64;

    if duration_secs < MIN_SAMPLE_SECS {
        return Err(SampleError::TooShort {
            duration: duration_secs,
        });
    }
    if duration_secs > MAX_SAMPLE_SECS {
        return Err(SampleError::TooLong {
            duration: duration_secs,
        });
    }

    Ok(SpeakerSample {
        path: path.to_path_buf(),
        duration_secs,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, secs: f64, sample_rate: u32, channels: u16) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let frames = (secs * sample_rate as f64) as usize;
        for _ in 0..frames * channels as usize {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn accepts_a_sample_inside_the_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.wav");
        write_wav(&path, 8.0, 8000, 1);

        let sample = inspect_sample(&path).unwrap();
        assert!((sample.duration_secs - 8.0).abs() < 0.01);
        assert_eq!(sample.sample_rate, 8000);
        assert_eq!(sample.channels, 1);
    }

    #[test]
    fn stereo_duration_counts_frames_not_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_wav(&path, 10.0, 8000, 2);

        let sample = inspect_sample(&path).unwrap();
        assert!((sample.duration_secs - 10.0).abs() < 0.01);
        assert_eq!(sample.channels, 2);
    }

    #[test]
    fn short_sample_is_rejected_with_its_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.wav");
        write_wav(&path, 3.0, 8000, 1);

        let err = inspect_sample(&path).unwrap_err();
        match &err {
            SampleError::TooShort { duration } => assert!((duration - 3.0).abs() < 0.01),
            other => panic!("expected TooShort, got {other:?}"),
        }
        assert!(err.to_string().contains("3.0s"));
    }

    #[test]
    fn long_sample_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.wav");
        write_wav(&path, 20.0, 8000, 1);

        assert!(matches!(
            inspect_sample(&path),
            Err(SampleError::TooLong { .. })
        ));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let err = inspect_sample(Path::new("/nonexistent/speaker.wav")).unwrap_err();
        assert!(matches!(err, SampleError::NotFound(_)));
        assert!(err.to_string().contains("/nonexistent/speaker.wav"));
    }

    #[test]
    fn non_wav_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not_audio.wav");
        std::fs::write(&path, b"this is not a RIFF file").unwrap();

        assert!(matches!(
            inspect_sample(&path),
            Err(SampleError::Unreadable { .. })
        ));
    }
}
