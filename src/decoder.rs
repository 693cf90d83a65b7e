//! Opus decoder.

use std::ptr;

use crate::error::OpusError;
use crate::ffi::{self, OpusDecoder as OpusDecoderHandle};

/// Opus decoder.
pub struct Decoder {
    sample_rate: i32,
    channels: i32,
    handle: *mut OpusDecoderHandle,
}

// Safety: The decoder handle is not shared across threads.
unsafe impl Send for Decoder {}

impl Drop for Decoder {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            unsafe { ffi::opus_decoder_destroy(self.handle) };
            self.handle = ptr::null_mut();
        }
    }
}

impl Decoder {
    /// Creates a new Opus decoder.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate to decode at (8000, 12000, 16000, 24000, or 48000)
    /// - `channels`: Number of channels (1 or 2)
    pub fn new(sample_rate: i32, channels: i32) -> Result<Self, OpusError> {
        let mut error: i32 = 0;
        let handle = unsafe {
            ffi::opus_decoder_create(sample_rate, channels, &mut error)
        };

        if handle.is_null() || error != ffi::OPUS_OK {
            return Err(OpusError::CreateDecoder(ffi::error_string(error)));
        }

        Ok(Self {
            sample_rate,
            channels,
            handle,
        })
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> i32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Decodes an Opus packet to PCM samples.
    /// Returns the decoded PCM data as bytes (i16 samples, little-endian).
    ///
    /// An empty packet is treated as a lost packet and decoded with
    /// concealment.
    pub fn decode(&mut self, packet: &[u8]) -> Result<Vec<u8>, OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        // Max frame size: 120ms at 48kHz stereo = 5760 samples * 2 channels
        let max_samples = 5760 * self.channels;
        let mut buf = vec![0i16; max_samples as usize];

        let (data_ptr, data_len) = if packet.is_empty() {
            (ptr::null(), 0)
        } else {
            (packet.as_ptr(), packet.len() as i32)
        };

        let n = unsafe {
            ffi::opus_decode(
                self.handle,
                data_ptr,
                data_len,
                buf.as_mut_ptr(),
                max_samples / self.channels,
                0, // decode_fec
            )
        };

        if n < 0 {
            return Err(OpusError::Decode(ffi::error_string(n)));
        }

        // Convert i16 samples to bytes
        let byte_len = (n as usize) * (self.channels as usize) * 2;
        let bytes = unsafe {
            std::slice::from_raw_parts(buf.as_ptr() as *const u8, byte_len)
        };

        Ok(bytes.to_vec())
    }

    /// Decodes to a provided buffer. Returns number of samples per channel.
    pub fn decode_to(&mut self, packet: &[u8], buf: &mut [i16]) -> Result<i32, OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        let (data_ptr, data_len) = if packet.is_empty() {
            (ptr::null(), 0)
        } else {
            (packet.as_ptr(), packet.len() as i32)
        };

        let n = unsafe {
            ffi::opus_decode(
                self.handle,
                data_ptr,
                data_len,
                buf.as_mut_ptr(),
                (buf.len() / self.channels as usize) as i32,
                0,
            )
        };

        if n < 0 {
            return Err(OpusError::Decode(ffi::error_string(n)));
        }

        Ok(n)
    }

    /// Performs packet loss concealment (PLC) to generate samples when a packet is lost.
    pub fn decode_plc(&mut self, samples: i32) -> Result<Vec<u8>, OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        let mut buf = vec![0i16; (samples * self.channels) as usize];

        let n = unsafe {
            ffi::opus_decode(
                self.handle,
                ptr::null(),
                0,
                buf.as_mut_ptr(),
                samples,
                0,
            )
        };

        if n < 0 {
            return Err(OpusError::Decode(ffi::error_string(n)));
        }

        let byte_len = (n as usize) * (self.channels as usize) * 2;
        let bytes = unsafe {
            std::slice::from_raw_parts(buf.as_ptr() as *const u8, byte_len)
        };

        Ok(bytes.to_vec())
    }

    /// Applies a raw decoder CTL with an integer argument.
    ///
    /// `request` is a request code from `opus_defines.h`. Values set here are
    /// interpreted entirely by libopus.
    pub fn ctl(&mut self, request: i32, value: i32) -> Result<(), OpusError> {
        if self.handle.is_null() {
            return Err(OpusError::Closed);
        }

        let ret = unsafe { ffi::opus_decoder_ctl(self.handle, request, value) };
        if ret != ffi::OPUS_OK {
            return Err(OpusError::Ctl {
                request,
                message: ffi::error_string(ret),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::Encoder;

    #[test]
    fn test_decoder_create() {
        let decoder = Decoder::new(16000, 1);
        assert!(decoder.is_ok());
        let dec = decoder.unwrap();
        assert_eq!(dec.sample_rate(), 16000);
        assert_eq!(dec.channels(), 1);
    }

    #[test]
    fn test_decoder_create_bad_channels() {
        let decoder = Decoder::new(16000, 3);
        assert!(decoder.is_err());
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut encoder = Encoder::new_voip(16000, 1).unwrap();
        let mut decoder = Decoder::new(16000, 1).unwrap();

        // Generate test signal
        let pcm: Vec<i16> = (0..320).map(|i| (i * 100 % 32768) as i16).collect();

        let packet = encoder.encode(&pcm, 320).unwrap();
        let decoded = decoder.decode(&packet).unwrap();

        // Should decode to approximately same length
        assert_eq!(decoded.len(), 320 * 2); // 320 samples * 2 bytes
    }

    #[test]
    fn test_encode_decode_roundtrip_stereo() {
        let mut encoder = Encoder::new_audio(48000, 2).unwrap();
        let mut decoder = Decoder::new(48000, 2).unwrap();

        let pcm = vec![0i16; 960 * 2]; // 20ms stereo at 48kHz

        let packet = encoder.encode(&pcm, 960).unwrap();
        let decoded = decoder.decode(&packet).unwrap();

        assert_eq!(decoded.len(), 960 * 2 * 2); // samples * channels * 2 bytes
    }

    #[test]
    fn test_decode_to() {
        let mut encoder = Encoder::new_voip(16000, 1).unwrap();
        let mut decoder = Decoder::new(16000, 1).unwrap();

        let pcm = vec![0i16; 320];
        let packet = encoder.encode(&pcm, 320).unwrap();

        let mut out = vec![0i16; 5760];
        let n = decoder.decode_to(&packet, &mut out).unwrap();
        assert_eq!(n, 320);
    }

    #[test]
    fn test_decode_invalid_packet() {
        let mut decoder = Decoder::new(16000, 1).unwrap();
        // 0xFF TOC with garbage payload is not decodable
        let packet = vec![0xFFu8; 3];
        let result = decoder.decode(&packet);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_plc() {
        let mut decoder = Decoder::new(16000, 1).unwrap();
        let decoded = decoder.decode_plc(320).unwrap();
        assert_eq!(decoded.len(), 320 * 2);
    }

    #[test]
    fn test_decode_empty_packet_conceals() {
        let mut encoder = Encoder::new_voip(16000, 1).unwrap();
        let mut decoder = Decoder::new(16000, 1).unwrap();

        let pcm = vec![0i16; 320];
        let packet = encoder.encode(&pcm, 320).unwrap();
        decoder.decode(&packet).unwrap();

        // Lost packet: concealment still produces audio
        let decoded = decoder.decode(&[]).unwrap();
        assert!(!decoded.is_empty());
    }

    #[test]
    fn test_decoder_ctl_invalid_request() {
        let mut decoder = Decoder::new(16000, 1).unwrap();
        let result = decoder.ctl(0, 0);
        assert!(result.is_err());
    }
}
