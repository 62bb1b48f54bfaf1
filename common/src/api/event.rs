use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    crypto::{Address, Digest, ObjectId},
    utils::serde_helpers::{option_string_u64, string_u64},
};

// Position of an event in the log: emitting transaction and index inside it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct EventId {
    pub tx_digest: Digest,
    #[serde(with = "string_u64")]
    pub event_seq: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope {
    pub id: EventId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_module: Option<String>,
    pub sender: Address,
    #[serde(rename = "type")]
    pub type_: String,
    // Event fields as decoded by the node
    #[serde(default)]
    pub parsed_json: Value,
    #[serde(
        default,
        with = "option_string_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventFilter {
    // Fully qualified event type such as `0x..::profile::ProfileCreated`
    MoveEventType(String),
    Sender(Address),
    Transaction(Digest),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_envelope() {
        let event: EventEnvelope = serde_json::from_str(
            r#"{
                "id": { "txDigest": "11111111111111111111111111111111", "eventSeq": "2" },
                "packageId": "0xabc",
                "transactionModule": "profile",
                "sender": "0x1",
                "type": "0xabc::profile::ProfileCreated",
                "parsedJson": { "profile_id": "0xbeef", "owner": "0x1" },
                "bcs": "",
                "timestampMs": "1700000000000"
            }"#,
        )
        .unwrap();

        assert_eq!(event.id.event_seq, 2);
        assert_eq!(event.parsed_json["profile_id"], "0xbeef");
        assert_eq!(event.timestamp_ms, Some(1_700_000_000_000));
        assert_eq!(event.transaction_module.as_deref(), Some("profile"));
    }

    #[test]
    fn test_event_id_as_cursor() {
        let id = EventId {
            tx_digest: Digest::zero(),
            event_seq: 7,
        };
        assert_eq!(
            serde_json::to_value(id).unwrap(),
            serde_json::json!({ "txDigest": "11111111111111111111111111111111", "eventSeq": "7" })
        );
    }

    #[test]
    fn test_event_filter() {
        let filter = EventFilter::MoveEventType("0x1::video::VideoCreated".to_owned());
        assert_eq!(
            serde_json::to_string(&filter).unwrap(),
            r#"{"MoveEventType":"0x1::video::VideoCreated"}"#
        );
    }
}
