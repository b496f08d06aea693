//! Microphone capture.
//!
//! Records one voice note to a temporary WAV file, either for a fixed
//! duration or until a stop signal arrives. The audio device is held
//! exclusively for the length of one recording and released before the
//! pipeline moves on to transcription.

pub mod capture;

pub use capture::{AudioSource, CaptureMode, Microphone, VoiceNote};
