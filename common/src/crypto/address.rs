use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Debug, Display, Error, Formatter},
    str::FromStr,
};

use super::CryptoError;

pub const ADDRESS_SIZE: usize = 32;

// Both account addresses and object ids are 32 bytes rendered as 0x-prefixed hex.
// Short forms ("0x6") are accepted and left padded with zeros.
macro_rules! define_address_type {
    ($name:ident) => {
        #[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
        pub struct $name([u8; ADDRESS_SIZE]);

        impl $name {
            pub const ZERO: Self = Self([0; ADDRESS_SIZE]);

            pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
                Self(bytes)
            }

            // Build a well-known address from its last byte (0x1, 0x2, 0x6...)
            pub const fn from_u8(value: u8) -> Self {
                let mut bytes = [0; ADDRESS_SIZE];
                bytes[ADDRESS_SIZE - 1] = value;
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
                &self.0
            }

            pub fn to_bytes(self) -> [u8; ADDRESS_SIZE] {
                self.0
            }

            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }

            pub fn from_hex(value: &str) -> Result<Self, CryptoError> {
                parse_address_bytes(value).map(Self)
            }
        }

        impl FromStr for $name {
            type Err = CryptoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
                write!(f, "{}", self.to_hex())
            }
        }

        impl Debug for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        // JSON uses the hex form, BCS uses the raw 32 bytes without length prefix
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_hex())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'a> Deserialize<'a> for $name {
            fn deserialize<D: Deserializer<'a>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let value = String::deserialize(deserializer)?;
                    Self::from_hex(&value).map_err(SerdeError::custom)
                } else {
                    <[u8; ADDRESS_SIZE]>::deserialize(deserializer).map(Self)
                }
            }
        }
    };
}

define_address_type!(Address);
define_address_type!(ObjectId);

impl From<ObjectId> for Address {
    fn from(id: ObjectId) -> Self {
        Address(id.0)
    }
}

impl From<Address> for ObjectId {
    fn from(address: Address) -> Self {
        ObjectId(address.0)
    }
}

fn parse_address_bytes(value: &str) -> Result<[u8; ADDRESS_SIZE], CryptoError> {
    let value = value.trim();
    let hex_part = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if hex_part.is_empty() {
        return Err(CryptoError::InvalidHex(value.to_owned()));
    }

    if hex_part.len() > ADDRESS_SIZE * 2 {
        return Err(CryptoError::HexTooLong {
            len: hex_part.len(),
            max: ADDRESS_SIZE * 2,
        });
    }

    let padded = format!("{:0>width$}", hex_part, width = ADDRESS_SIZE * 2);
    let decoded = hex::decode(&padded).map_err(|_| CryptoError::InvalidHex(value.to_owned()))?;

    let mut bytes = [0u8; ADDRESS_SIZE];
    bytes.copy_from_slice(&decoded);
    Ok(bytes)
}
