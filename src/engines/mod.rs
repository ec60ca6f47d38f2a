//! Speech synthesis engines.
//!
//! This module contains implementations of text-to-speech engines.
//!
//! # Available Engines
//!
//! - [`xtts`] - Coqui XTTS v2 (neural, voice cloning, 17 languages; drives
//!   the external `tts` CLI)
//! - [`espeak`] - espeak-ng (formant synthesis, plain speech only; the
//!   fallback when XTTS is not installed)

pub mod espeak;
pub mod xtts;
