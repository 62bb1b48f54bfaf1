// The node renders 64 bits integers as JSON strings to stay safe for JS clients,
// but some fields are plain numbers. Accept both.

use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

impl StringOrNumber {
    fn into_u64<E: SerdeError>(self) -> Result<u64, E> {
        match self {
            StringOrNumber::Number(n) => Ok(n),
            StringOrNumber::String(s) => s
                .parse()
                .map_err(|_| E::custom(format!("invalid u64 string '{}'", s))),
        }
    }
}

pub mod string_u64 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        StringOrNumber::deserialize(deserializer)?.into_u64()
    }
}

pub mod option_string_u64 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u64>, D::Error> {
        Option::<StringOrNumber>::deserialize(deserializer)?
            .map(StringOrNumber::into_u64)
            .transpose()
    }
}
