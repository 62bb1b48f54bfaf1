use base58::{FromBase58, ToBase58};
use blake2::{digest::consts::U32, Blake2b, Digest as _};
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Debug, Display, Error, Formatter},
    str::FromStr,
};

use super::CryptoError;

pub const DIGEST_SIZE: usize = 32; // 32 bytes / 256 bits

type Blake2b256 = Blake2b<U32>;

// Transaction and object digests, rendered in base58
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
pub struct Digest([u8; DIGEST_SIZE]);

impl Digest {
    pub const fn new(bytes: [u8; DIGEST_SIZE]) -> Self {
        Digest(bytes)
    }

    pub const fn zero() -> Self {
        Digest::new([0; DIGEST_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_SIZE] {
        &self.0
    }

    pub fn to_base58(&self) -> String {
        self.0.to_base58()
    }

    pub fn from_base58(value: &str) -> Result<Self, CryptoError> {
        let decoded = value
            .from_base58()
            .map_err(|e| CryptoError::InvalidBase58(format!("{:?}", e)))?;
        let bytes: [u8; DIGEST_SIZE] =
            decoded
                .try_into()
                .map_err(|v: Vec<u8>| CryptoError::InvalidDigestLength {
                    len: v.len(),
                    expected: DIGEST_SIZE,
                })?;
        Ok(Digest(bytes))
    }
}

// Hash a byte array using blake2b with a 256 bits output
#[inline(always)]
pub fn blake2b256(value: &[u8]) -> [u8; DIGEST_SIZE] {
    Blake2b256::digest(value).into()
}

// Same as blake2b256 but over several chunks, avoiding a concatenation
pub fn blake2b256_parts(parts: &[&[u8]]) -> [u8; DIGEST_SIZE] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

impl FromStr for Digest {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "{}", self.to_base58())
    }
}

impl Debug for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "Digest({})", self.to_base58())
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// BCS encodes digests as a length prefixed byte vector
impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_base58())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'a> Deserialize<'a> for Digest {
    fn deserialize<D: Deserializer<'a>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let value = String::deserialize(deserializer)?;
            Digest::from_base58(&value).map_err(SerdeError::custom)
        } else {
            let bytes = Vec::<u8>::deserialize(deserializer)?;
            let bytes: [u8; DIGEST_SIZE] = bytes
                .try_into()
                .map_err(|_| SerdeError::custom("Invalid digest length"))?;
            Ok(Digest(bytes))
        }
    }
}
