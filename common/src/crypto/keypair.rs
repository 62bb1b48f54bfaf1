//! Ed25519 signing identity.
//!
//! The secret is provided as base64 with a leading one-byte scheme flag,
//! the format produced by the ledger's key tooling. Only the Ed25519 flag
//! is accepted.

use base64::{engine::general_purpose::STANDARD, Engine};
use ed25519_dalek::{
    Signature as DalekSignature, Signer, SigningKey, Verifier, VerifyingKey, PUBLIC_KEY_LENGTH,
    SECRET_KEY_LENGTH, SIGNATURE_LENGTH,
};
use std::fmt;

use super::{blake2b256_parts, Address, CryptoError};

/// Scheme flag for Ed25519 keys and signatures.
pub const ED25519_FLAG: u8 = 0x00;

/// Size of a serialized user signature: flag || signature || public key.
pub const USER_SIGNATURE_SIZE: usize = 1 + SIGNATURE_LENGTH + PUBLIC_KEY_LENGTH;

pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    pub fn from_secret_bytes(bytes: &[u8; SECRET_KEY_LENGTH]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    /// Decode `base64(flag || secret)`.
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(CryptoError::EmptyKey);
        }

        let decoded = STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidBase64(e.to_string()))?;

        let (flag, secret) = decoded.split_first().ok_or(CryptoError::EmptyKey)?;
        if *flag != ED25519_FLAG {
            return Err(CryptoError::UnsupportedScheme(*flag));
        }

        let secret: [u8; SECRET_KEY_LENGTH] =
            secret
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    len: secret.len(),
                    expected: SECRET_KEY_LENGTH,
                })?;

        Ok(Self::from_secret_bytes(&secret))
    }

    /// Encode back to `base64(flag || secret)`.
    pub fn to_base64(&self) -> String {
        let mut bytes = Vec::with_capacity(1 + SECRET_KEY_LENGTH);
        bytes.push(ED25519_FLAG);
        bytes.extend_from_slice(self.signing_key.as_bytes());
        STANDARD.encode(bytes)
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Ledger address: blake2b256(flag || public key).
    pub fn address(&self) -> Address {
        address_from_public_key(&self.public_key())
    }

    pub fn sign(&self, message: &[u8]) -> UserSignature {
        let signature = self.signing_key.sign(message);
        UserSignature::new(&signature.to_bytes(), &self.public_key())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

pub fn address_from_public_key(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> Address {
    Address::new(blake2b256_parts(&[&[ED25519_FLAG], public_key]))
}

/// Signature in the wire format expected by the node.
#[derive(Clone, PartialEq, Eq)]
pub struct UserSignature(Vec<u8>);

impl UserSignature {
    fn new(signature: &[u8; SIGNATURE_LENGTH], public_key: &[u8; PUBLIC_KEY_LENGTH]) -> Self {
        let mut bytes = Vec::with_capacity(USER_SIGNATURE_SIZE);
        bytes.push(ED25519_FLAG);
        bytes.extend_from_slice(signature);
        bytes.extend_from_slice(public_key);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    /// Verify the signature against the embedded public key.
    pub fn verify(&self, message: &[u8]) -> Result<(), CryptoError> {
        if self.0.len() != USER_SIGNATURE_SIZE || self.0[0] != ED25519_FLAG {
            return Err(CryptoError::VerificationFailed);
        }

        let signature: [u8; SIGNATURE_LENGTH] = self.0[1..1 + SIGNATURE_LENGTH]
            .try_into()
            .map_err(|_| CryptoError::VerificationFailed)?;
        let public_key: [u8; PUBLIC_KEY_LENGTH] = self.0[1 + SIGNATURE_LENGTH..]
            .try_into()
            .map_err(|_| CryptoError::VerificationFailed)?;

        let key =
            VerifyingKey::from_bytes(&public_key).map_err(|_| CryptoError::VerificationFailed)?;
        key.verify(message, &DalekSignature::from_bytes(&signature))
            .map_err(|_| CryptoError::VerificationFailed)
    }
}

impl fmt::Debug for UserSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserSignature({})", self.to_base64())
    }
}
