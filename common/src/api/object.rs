use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    crypto::{Address, Digest, ObjectId},
    transaction::{ObjectRef, SequenceNumber},
    utils::serde_helpers::string_u64,
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Owner {
    AddressOwner(Address),
    ObjectOwner(Address),
    Shared {
        #[serde(with = "string_u64")]
        initial_shared_version: SequenceNumber,
    },
    Immutable,
    ConsensusAddressOwner {
        #[serde(with = "string_u64")]
        start_version: SequenceNumber,
        owner: Address,
    },
}

impl Owner {
    pub fn address(&self) -> Option<&Address> {
        match self {
            Owner::AddressOwner(address) | Owner::ConsensusAddressOwner { owner: address, .. } => {
                Some(address)
            }
            _ => None,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Owner::Shared { .. })
    }
}

// Parsed Move content of an object, only present when requested
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "dataType", rename_all = "camelCase")]
pub enum ParsedData {
    #[serde(rename_all = "camelCase")]
    MoveObject {
        #[serde(rename = "type")]
        type_: String,
        #[serde(default)]
        has_public_transfer: bool,
        fields: Map<String, Value>,
    },
    Package {
        #[serde(default)]
        disassembled: Value,
    },
}

impl ParsedData {
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        match self {
            ParsedData::MoveObject { fields, .. } => Some(fields),
            ParsedData::Package { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: ObjectId,
    #[serde(with = "string_u64")]
    pub version: SequenceNumber,
    pub digest: Digest,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Owner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ParsedData>,
}

impl ObjectData {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.object_id, self.version, self.digest)
    }

    // Field of the Move content, such as `profile_id`
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.content.as_ref()?.fields()?.get(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ObjectData>,
    // Set by the node when the object could not be fetched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ObjectResponse {
    pub fn into_data(self) -> Result<ObjectData, Value> {
        match self.data {
            Some(data) => Ok(data),
            None => Err(self.error.unwrap_or(Value::Null)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    #[serde(with = "string_u64")]
    pub version: SequenceNumber,
    pub digest: Digest,
    #[serde(with = "string_u64")]
    pub balance: u64,
}

impl Coin {
    pub fn object_ref(&self) -> ObjectRef {
        ObjectRef::new(self.coin_object_id, self.version, self.digest)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ObjectFilter {
    // Fully qualified type such as `0x..::profile::ProfileOwnerCap`
    StructType(String),
    Package(ObjectId),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDataOptions {
    #[serde(default)]
    pub show_type: bool,
    #[serde(default)]
    pub show_owner: bool,
    #[serde(default)]
    pub show_content: bool,
}

impl ObjectDataOptions {
    pub fn with_content() -> Self {
        Self {
            show_type: true,
            show_owner: true,
            show_content: true,
        }
    }

    pub fn with_owner() -> Self {
        Self {
            show_type: true,
            show_owner: true,
            show_content: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<ObjectFilter>,
    #[serde(default)]
    pub options: ObjectDataOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNED_CAP: &str = r#"{
        "data": {
            "objectId": "0x5a1e",
            "version": "27",
            "digest": "11111111111111111111111111111111",
            "type": "0xabc::profile::ProfileOwnerCap",
            "owner": { "AddressOwner": "0x01" },
            "content": {
                "dataType": "moveObject",
                "type": "0xabc::profile::ProfileOwnerCap",
                "hasPublicTransfer": true,
                "fields": { "id": { "id": "0x5a1e" }, "profile_id": "0xbeef" }
            }
        }
    }"#;

    #[test]
    fn test_owned_object() {
        let response: ObjectResponse = serde_json::from_str(OWNED_CAP).unwrap();
        let data = response.into_data().unwrap();
        assert_eq!(data.object_id, ObjectId::from_hex("0x5a1e").unwrap());
        assert_eq!(data.version, 27);
        assert_eq!(data.owner, Some(Owner::AddressOwner(Address::from_u8(1))));
        assert_eq!(
            data.field("profile_id").and_then(Value::as_str),
            Some("0xbeef")
        );
        assert_eq!(data.field("missing"), None);
    }

    #[test]
    fn test_owner_variants() {
        let shared: Owner =
            serde_json::from_str(r#"{"Shared":{"initial_shared_version":5}}"#).unwrap();
        assert_eq!(
            shared,
            Owner::Shared {
                initial_shared_version: 5
            }
        );
        assert!(shared.is_shared());

        let immutable: Owner = serde_json::from_str(r#""Immutable""#).unwrap();
        assert_eq!(immutable, Owner::Immutable);
        assert_eq!(immutable.address(), None);
    }

    #[test]
    fn test_object_error() {
        let response: ObjectResponse = serde_json::from_str(
            r#"{"error":{"code":"notExists","object_id":"0x1"}}"#,
        )
        .unwrap();
        let error = response.into_data().unwrap_err();
        assert_eq!(error["code"], "notExists");
    }

    #[test]
    fn test_query_serialization() {
        let query = ObjectQuery {
            filter: Some(ObjectFilter::StructType("0x1::m::T".to_owned())),
            options: ObjectDataOptions::with_content(),
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({
                "filter": { "StructType": "0x1::m::T" },
                "options": { "showType": true, "showOwner": true, "showContent": true }
            })
        );
    }

    #[test]
    fn test_coin() {
        let coin: Coin = serde_json::from_str(
            r#"{
                "coinType": "0x2::sui::SUI",
                "coinObjectId": "0x7",
                "version": "3",
                "digest": "11111111111111111111111111111111",
                "balance": "1000000000",
                "previousTransaction": "11111111111111111111111111111111"
            }"#,
        )
        .unwrap();
        assert_eq!(coin.balance, 1_000_000_000);
        assert_eq!(coin.object_ref().version, 3);
    }
}
