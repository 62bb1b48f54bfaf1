use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use crate::crypto::Address;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeTagError {
    #[error("Invalid struct tag '{0}', expected 'address::module::Name'")]
    InvalidFormat(String),
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),
    #[error("Invalid address in struct tag: {0}")]
    InvalidAddress(String),
}

// Variant order follows the ledger encoding, U16 to U256 were appended later
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
    U16,
    U32,
    U256,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => write!(f, "{}", tag),
        }
    }
}

// Fully qualified on-chain type, such as `0x2::sui::SUI`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructTag {
    pub address: Address,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl StructTag {
    pub fn new<M: Into<String>, N: Into<String>>(address: Address, module: M, name: N) -> Self {
        Self {
            address,
            module: module.into(),
            name: name.into(),
            type_params: Vec::new(),
        }
    }
}

// The node prints addresses in their long form, so do we
impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.address, self.module, self.name)?;
        if !self.type_params.is_empty() {
            write!(f, "<")?;
            for (i, param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", param)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

pub(crate) fn is_valid_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// Generic parameters are not parsed, none of the contract types need them
impl FromStr for StructTag {
    type Err = TypeTagError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.split("::").collect();
        let [address, module, name] = parts.as_slice() else {
            return Err(TypeTagError::InvalidFormat(value.to_owned()));
        };

        let address =
            Address::from_hex(address).map_err(|e| TypeTagError::InvalidAddress(e.to_string()))?;
        for identifier in [module, name] {
            if !is_valid_identifier(identifier) {
                return Err(TypeTagError::InvalidIdentifier((*identifier).to_owned()));
            }
        }

        Ok(StructTag::new(address, *module, *name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_tag_display_and_parse() {
        let tag: StructTag = "0x2::sui::SUI".parse().unwrap();
        assert_eq!(tag.address, Address::from_u8(2));
        assert_eq!(tag.module, "sui");
        assert_eq!(tag.name, "SUI");
        assert_eq!(
            tag.to_string(),
            "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"
        );
        assert_eq!(tag.to_string().parse::<StructTag>().unwrap(), tag);
    }

    #[test]
    fn test_struct_tag_with_params() {
        let mut tag = StructTag::new(Address::from_u8(2), "coin", "Coin");
        tag.type_params
            .push(TypeTag::Struct(Box::new("0x2::sui::SUI".parse().unwrap())));
        assert!(tag.to_string().ends_with("::coin::Coin<0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI>"));
    }

    #[test]
    fn test_invalid_struct_tags() {
        assert!(matches!(
            "0x2::sui".parse::<StructTag>(),
            Err(TypeTagError::InvalidFormat(_))
        ));
        assert!(matches!(
            "0x2::9sui::SUI".parse::<StructTag>(),
            Err(TypeTagError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            "zz::sui::SUI".parse::<StructTag>(),
            Err(TypeTagError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_type_tag_variant_indexes() {
        assert_eq!(bcs::to_bytes(&TypeTag::Bool).unwrap(), vec![0]);
        assert_eq!(bcs::to_bytes(&TypeTag::Address).unwrap(), vec![4]);
        assert_eq!(bcs::to_bytes(&TypeTag::U16).unwrap(), vec![8]);
        assert_eq!(bcs::to_bytes(&TypeTag::U256).unwrap(), vec![10]);
    }
}
