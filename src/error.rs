use thiserror::Error;

/// Errors returned by libopus operations.
///
/// Library failures carry the `opus_strerror` message unchanged.
#[derive(Debug, Error)]
pub enum OpusError {
    #[error("opus: encoder create failed: {0}")]
    CreateEncoder(String),

    #[error("opus: decoder create failed: {0}")]
    CreateDecoder(String),

    #[error("opus: encode failed: {0}")]
    Encode(String),

    #[error("opus: decode failed: {0}")]
    Decode(String),

    #[error("opus: ctl {request} failed: {message}")]
    Ctl { request: i32, message: String },

    #[error("opus: codec state is closed")]
    Closed,

    #[error("opus: pcm bytes are not 2-byte aligned i16 samples")]
    UnalignedPcm,
}
