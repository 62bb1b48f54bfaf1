use thiserror::Error;

/// Errors that can occur during cryptographic operations
///
/// Covers parsing of addresses, digests and key material as well as signing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid hexadecimal string format
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// Hex string exceeds maximum allowed length
    #[error("Hex string too long: {len} characters, maximum: {max} characters")]
    HexTooLong { len: usize, max: usize },

    /// Digest has invalid length
    #[error("Invalid digest length: {len} bytes, expected: {expected} bytes")]
    InvalidDigestLength { len: usize, expected: usize },

    /// Base58 decode error
    #[error("Invalid base58 string: {0}")]
    InvalidBase58(String),

    /// Base64 decode error
    #[error("Invalid base64 string: {0}")]
    InvalidBase64(String),

    /// Secret key material has an unexpected size
    #[error("Invalid secret key length: {len} bytes, expected: {expected} bytes")]
    InvalidKeyLength { len: usize, expected: usize },

    /// Only Ed25519 keys are supported
    #[error("Unsupported signature scheme flag: {0:#04x}")]
    UnsupportedScheme(u8),

    /// Empty input where key material was expected
    #[error("Secret key is empty")]
    EmptyKey,

    /// Signature verification failed
    #[error("Signature verification failed")]
    VerificationFailed,
}
