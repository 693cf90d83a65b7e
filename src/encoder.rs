//! Opus encoder.

use std::ptr;

use crate::error::OpusError;
use crate::ffi::{self, OpusEncoder as OpusEncoderHandle};

/// Opus application type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Application {
    /// Best quality for voice signals.
    VoIP,
    /// Best quality for non-voice signals.
    Audio,
    /// Minimum possible coding delay.
    RestrictedLowdelay,
}

impl Application {
    /// Returns the raw libopus selector value.
    pub fn as_raw(&self) -> i32 {
        match self {
            Self::VoIP => ffi::OPUS_APPLICATION_VOIP,
            Self::Audio => ffi::OPUS_APPLICATION_AUDIO,
            Self::RestrictedLowdelay => ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY,
        }
    }

    /// Converts a raw libopus selector value back to an application type.
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            ffi::OPUS_APPLICATION_VOIP => Some(Self::VoIP),
            ffi::OPUS_APPLICATION_AUDIO => Some(Self::Audio),
            ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY => Some(Self::RestrictedLowdelay),
            _ => None,
        }
    }
}

/// Opus encoder.
pub struct Encoder {
    sample_rate: i32,
    channels: i32,
    handle: *mut OpusEncoderHandle,
}

// Safety: The encoder handle is not shared across threads.
unsafe impl Send for Encoder {}

impl Drop for Encoder {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::opus_encoder_destroy(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

impl Encoder {
    /// Creates a new Opus encoder.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate (8000, 12000, 16000, 24000, or 48000)
    /// - `channels`: Number of channels (1 or 2)
    /// - `application`: Intended application type
    pub fn new(sample_rate: i32, channels: i32, application: Application) -> Result<Self, OpusError> {
        let mut error: i32 = 0;
        let handle = unsafe {
            ffi::opus_encoder_create(
                sample_rate,
                channels,
                application.as_raw(),
                &mut error,
            )
        };

        if handle.is_null() || error != ffi::OPUS_OK {
            return Err(OpusError::CreateEncoder(ffi::error_string(error)));
        }

        Ok(Self {
            sample_rate,
            channels,
            handle,
        })
    }

    /// Creates a new VoIP encoder.
    pub fn new_voip(sample_rate: i32, channels: i32) -> Result<Self, OpusError> {
        Self::new(sample_rate, channels, Application::VoIP)
    }

    /// Creates a new audio encoder.
    pub fn new_audio(sample_rate: i32, channels: i32) -> Result<Self, OpusError> {
        Self::new(sample_rate, channels, Application::Audio)
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> i32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Encodes PCM samples to an Opus packet.
    ///
    /// # Parameters
    /// - `pcm`: Input PCM samples (frame_size * channels samples)
    /// - `frame_size`: Number of samples per channel
    pub fn encode(&mut self, pcm: &[i16], frame_size: i32) -> Result<Vec<u8>, OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        let mut buf = vec![0u8; 4000]; // Max Opus packet size
        let n = unsafe {
            ffi::opus_encode(
                self.handle,
                pcm.as_ptr(),
                frame_size,
                buf.as_mut_ptr(),
                buf.len() as i32,
            )
        };

        if n < 0 {
            return Err(OpusError::Encode(ffi::error_string(n)));
        }

        buf.truncate(n as usize);
        Ok(buf)
    }

    /// Encodes PCM samples from bytes (little-endian i16).
    pub fn encode_bytes(&mut self, pcm: &[u8], frame_size: i32) -> Result<Vec<u8>, OpusError> {
        if pcm.len() % 2 != 0 || pcm.as_ptr() as usize % 2 != 0 {
            return Err(OpusError::UnalignedPcm);
        }

        // Reinterpret bytes as i16 samples
        let samples: &[i16] = unsafe {
            std::slice::from_raw_parts(
                pcm.as_ptr() as *const i16,
                pcm.len() / 2,
            )
        };
        self.encode(samples, frame_size)
    }

    /// Encodes to a provided buffer. Returns number of bytes written.
    pub fn encode_to(&mut self, pcm: &[i16], frame_size: i32, buf: &mut [u8]) -> Result<usize, OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        let n = unsafe {
            ffi::opus_encode(
                self.handle,
                pcm.as_ptr(),
                frame_size,
                buf.as_mut_ptr(),
                buf.len() as i32,
            )
        };

        if n < 0 {
            return Err(OpusError::Encode(ffi::error_string(n)));
        }

        Ok(n as usize)
    }

    /// Sets the target bitrate in bits per second.
    pub fn set_bitrate(&mut self, bitrate: i32) -> Result<(), OpusError> {
        self.ctl(ffi::OPUS_SET_BITRATE_REQUEST, bitrate)
    }

    /// Returns the current target bitrate in bits per second.
    pub fn bitrate(&mut self) -> Result<i32, OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        let mut bitrate: i32 = 0;
        let ret = unsafe {
            ffi::opus_encoder_ctl(
                self.handle,
                ffi::OPUS_GET_BITRATE_REQUEST,
                &mut bitrate as *mut i32,
            )
        };

        if ret != ffi::OPUS_OK {
            return Err(OpusError::Ctl {
                request: ffi::OPUS_GET_BITRATE_REQUEST,
                message: ffi::error_string(ret),
            });
        }

        Ok(bitrate)
    }

    /// Sets the encoder complexity (0-10).
    pub fn set_complexity(&mut self, complexity: i32) -> Result<(), OpusError> {
        self.ctl(ffi::OPUS_SET_COMPLEXITY_REQUEST, complexity)
    }

    /// Applies a raw encoder CTL with an integer argument.
    ///
    /// `request` is a request code from `opus_defines.h`. Values set here are
    /// interpreted entirely by libopus.
    pub fn ctl(&mut self, request: i32, value: i32) -> Result<(), OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        let ret = unsafe { ffi::opus_encoder_ctl(self.handle, request, value) };
        if ret != ffi::OPUS_OK {
            return Err(OpusError::Ctl {
                request,
                message: ffi::error_string(ret),
            });
        }

        Ok(())
    }

    /// Returns the frame size for 20ms frames (recommended default).
    pub fn frame_size_20ms(&self) -> i32 {
        self.sample_rate * 20 / 1000
    }
}
