//! Error type shared by every codec operation.

/// Everything that can go wrong while encoding, decoding or authenticating a frame.
///
/// Apart from [`Error::UnknownMacCommand`] all variants are fatal to the call
/// that returned them; nothing is retried inside the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error {
    /// Not enough bytes left to read or write a field.
    #[error("buffer too short")]
    BufferTruncated,
    /// A part the message type requires is missing.
    #[error("required value is missing")]
    NilError,
    /// A field value exceeds its bit width.
    #[error("parameter out of range")]
    ParameterOutOfRange,
    /// Malformed hex string or wrong fixed-width length.
    #[error("invalid parameter format")]
    InvalidParameterFormat,
    /// The random number source failed.
    #[error("crypto system error")]
    CryptoError,
    /// Decoded content does not agree with its own length accounting.
    #[error("source buffer is corrupted")]
    InvalidSource,
    /// The message type cannot be handled by this operation.
    #[error("invalid message type")]
    InvalidMessageType,
    /// MHDR carries a major version other than LoRaWAN R1.
    #[error("unsupported LoRaWAN version")]
    InvalidLoRaWANVersion,
    /// The frame is well formed but its MIC does not match.
    #[error("invalid MIC")]
    InvalidMic,
    /// A MAC command id unknown for the set's direction. Absorbed at the
    /// FHDR and MACPayload boundaries, never returned by [`crate::phypayload`].
    #[error("unknown MAC command")]
    UnknownMacCommand,
}

pub type Result<T, E = Error> = core::result::Result<T, E>;

impl From<hex::FromHexError> for Error {
    fn from(_: hex::FromHexError) -> Self {
        Error::InvalidParameterFormat
    }
}

impl From<rand_core::Error> for Error {
    fn from(_: rand_core::Error) -> Self {
        Error::CryptoError
    }
}
