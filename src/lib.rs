//! Rust bindings for the Opus audio codec (libopus).
//!
//! This crate wraps the libopus C API, providing safe Rust types for
//! encoding and decoding Opus packets. All codec work happens inside
//! libopus; this crate declares the C entry points and marshals buffers
//! across the FFI boundary.
//!
//! # Usage
//!
//! ```ignore
//! use libopus_rs::{Application, Codec, Decoder, Encoder};
//!
//! // Separate encoder and decoder states
//! let mut encoder = Encoder::new(16000, 1, Application::VoIP)?;
//! encoder.set_bitrate(24000)?;
//!
//! let pcm: Vec<i16> = vec![0i16; 320]; // 20ms at 16kHz
//! let packet = encoder.encode(&pcm, 320)?;
//!
//! let mut decoder = Decoder::new(16000, 1)?;
//! let decoded = decoder.decode(&packet)?;
//!
//! // Or a combined codec with lazily created states (48kHz mono VoIP)
//! let mut codec = Codec::default();
//! let packet = codec.encode(&vec![0i16; 960])?;
//! ```
//!
//! # Linking
//!
//! The system opus library is linked dynamically; see `build.rs`.
//!
//! # Thread safety
//!
//! Wrapper objects own their native state and are `Send` but not `Sync`.
//! Each must be used from one thread at a time.

mod codec;
mod decoder;
mod encoder;
mod error;
mod ffi;

pub use codec::Codec;
pub use decoder::Decoder;
pub use encoder::{Application, Encoder};
pub use error::OpusError;

/// Application selector for voice signals, as libopus defines it.
pub const OPUS_APPLICATION_VOIP: i32 = ffi::OPUS_APPLICATION_VOIP;

/// Application selector for non-voice audio, as libopus defines it.
pub const OPUS_APPLICATION_AUDIO: i32 = ffi::OPUS_APPLICATION_AUDIO;

/// Application selector for minimum coding delay, as libopus defines it.
pub const OPUS_APPLICATION_RESTRICTED_LOWDELAY: i32 = ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY;

/// Returns the libopus version string.
pub fn version() -> String {
    unsafe {
        let ptr = ffi::opus_get_version_string();
        if ptr.is_null() {
            return String::new();
        }
        std::ffi::CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}
