//! Combined Opus encoder/decoder.

use crate::decoder::Decoder;
use crate::encoder::{Application, Encoder};
use crate::error::OpusError;

/// Combined Opus encoder/decoder sharing one configuration.
///
/// Both directions use the same sample rate and channel count, as in a
/// full-duplex audio path. The underlying encoder and decoder states are
/// created on first use, so configuration errors surface on the first
/// encode or decode call.
pub struct Codec {
    sample_rate: i32,
    channels: i32,
    application: Application,
    encoder: Option<Encoder>,
    decoder: Option<Decoder>,
}

impl Codec {
    /// Creates a new codec. No native state is allocated until the first
    /// encode or decode call.
    ///
    /// # Parameters
    /// - `sample_rate`: Sample rate (8000, 12000, 16000, 24000, or 48000)
    /// - `channels`: Number of channels (1 or 2)
    /// - `application`: Intended application type
    pub fn new(sample_rate: i32, channels: i32, application: Application) -> Self {
        Self {
            sample_rate,
            channels,
            application,
            encoder: None,
            decoder: None,
        }
    }

    /// Returns the sample rate.
    pub fn sample_rate(&self) -> i32 {
        self.sample_rate
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> i32 {
        self.channels
    }

    /// Returns the application type.
    pub fn application(&self) -> Application {
        self.application
    }

    fn encoder(&mut self) -> Result<&mut Encoder, OpusError> {
        let enc = match self.encoder.take() {
            Some(enc) => enc,
            None => Encoder::new(self.sample_rate, self.channels, self.application)?,
        };
        Ok(self.encoder.insert(enc))
    }

    fn decoder(&mut self) -> Result<&mut Decoder, OpusError> {
        let dec = match self.decoder.take() {
            Some(dec) => dec,
            None => Decoder::new(self.sample_rate, self.channels)?,
        };
        Ok(self.decoder.insert(dec))
    }

    /// Encodes PCM samples to an Opus packet.
    ///
    /// The frame size is derived from the input length: `pcm` must hold one
    /// complete frame of `frame_size * channels` samples.
    pub fn encode(&mut self, pcm: &[i16]) -> Result<Vec<u8>, OpusError> {
        let channels = self.channels;
        let enc = self.encoder()?;
        enc.encode(pcm, pcm.len() as i32 / channels)
    }

    /// Encodes PCM samples from bytes (little-endian i16).
    pub fn encode_bytes(&mut self, pcm: &[u8]) -> Result<Vec<u8>, OpusError> {
        let channels = self.channels;
        let enc = self.encoder()?;
        enc.encode_bytes(pcm, (pcm.len() / 2) as i32 / channels)
    }

    /// Decodes an Opus packet to PCM bytes (i16 samples, little-endian).
    pub fn decode(&mut self, packet: &[u8]) -> Result<Vec<u8>, OpusError> {
        self.decoder()?.decode(packet)
    }

    /// Performs packet loss concealment for the given number of samples.
    pub fn decode_plc(&mut self, samples: i32) -> Result<Vec<u8>, OpusError> {
        self.decoder()?.decode_plc(samples)
    }

    /// Sets the target bitrate in bits per second.
    pub fn set_bitrate(&mut self, bitrate: i32) -> Result<(), OpusError> {
        self.encoder()?.set_bitrate(bitrate)
    }

    /// Returns the current target bitrate in bits per second.
    pub fn bitrate(&mut self) -> Result<i32, OpusError> {
        self.encoder()?.bitrate()
    }

    /// Applies a raw encoder CTL with an integer argument.
    pub fn encoder_ctl(&mut self, request: i32, value: i32) -> Result<(), OpusError> {
        self.encoder()?.ctl(request, value)
    }

    /// Applies a raw decoder CTL with an integer argument.
    pub fn decoder_ctl(&mut self, request: i32, value: i32) -> Result<(), OpusError> {
        self.decoder()?.ctl(request, value)
    }
}

impl Default for Codec {
    /// 48kHz mono VoIP.
    fn default() -> Self {
        Self::new(48000, 1, Application::VoIP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_new() {
        let codec = Codec::new(16000, 1, Application::VoIP);
        assert_eq!(codec.sample_rate(), 16000);
        assert_eq!(codec.channels(), 1);
        assert_eq!(codec.application(), Application::VoIP);
    }

    #[test]
    fn test_codec_default() {
        let codec = Codec::default();
        assert_eq!(codec.sample_rate(), 48000);
        assert_eq!(codec.channels(), 1);
        assert_eq!(codec.application(), Application::VoIP);
    }

    #[test]
    fn test_codec_encode_derives_frame_size() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        let pcm = vec![0i16; 320]; // 20ms at 16kHz
        let packet = codec.encode(&pcm).unwrap();
        assert!(!packet.is_empty());
    }

    #[test]
    fn test_codec_encode_bytes() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        let pcm_bytes = vec![0u8; 640]; // 320 samples
        let packet = codec.encode_bytes(&pcm_bytes).unwrap();
        assert!(!packet.is_empty());
    }

    #[test]
    fn test_codec_roundtrip() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        let pcm: Vec<i16> = (0..320).map(|i| (i * 100 % 32768) as i16).collect();

        let packet = codec.encode(&pcm).unwrap();
        let decoded = codec.decode(&packet).unwrap();
        assert_eq!(decoded.len(), 320 * 2);
    }

    #[test]
    fn test_codec_roundtrip_stereo() {
        let mut codec = Codec::new(48000, 2, Application::Audio);
        let pcm = vec![0i16; 960 * 2]; // 20ms stereo at 48kHz

        let packet = codec.encode(&pcm).unwrap();
        let decoded = codec.decode(&packet).unwrap();
        assert_eq!(decoded.len(), 960 * 2 * 2);
    }

    #[test]
    fn test_codec_lazy_create_error() {
        // Construction succeeds even with a rate libopus rejects; the error
        // surfaces on first use.
        let mut codec = Codec::new(44100, 1, Application::VoIP);
        let pcm = vec![0i16; 882];
        let result = codec.encode(&pcm);
        assert!(matches!(result, Err(OpusError::CreateEncoder(_))));
    }

    #[test]
    fn test_codec_bitrate() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        codec.set_bitrate(24000).unwrap();
        assert_eq!(codec.bitrate().unwrap(), 24000);
    }

    #[test]
    fn test_codec_encoder_ctl() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        codec
            .encoder_ctl(crate::ffi::OPUS_SET_COMPLEXITY_REQUEST, 5)
            .unwrap();
    }

    #[test]
    fn test_codec_decoder_ctl_invalid() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        assert!(codec.decoder_ctl(0, 0).is_err());
    }

    #[test]
    fn test_codec_plc() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        let decoded = codec.decode_plc(320).unwrap();
        assert_eq!(decoded.len(), 320 * 2);
    }

    #[test]
    fn test_codec_state_reused_across_calls() {
        let mut codec = Codec::new(16000, 1, Application::VoIP);
        let pcm = vec![0i16; 320];

        // Encoder state carries across frames
        for _ in 0..5 {
            let packet = codec.encode(&pcm).unwrap();
            codec.decode(&packet).unwrap();
        }
    }
}
