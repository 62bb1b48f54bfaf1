//! Types exchanged with a ledger full node over JSON-RPC.
//! Field names follow the node's camelCase JSON.

mod event;
mod object;
mod transaction;

pub use event::*;
pub use object::*;
pub use transaction::*;

use serde::{Deserialize, Serialize};

use crate::{crypto::ObjectId, utils::serde_helpers::string_u64};

// A page of results from a paged query, `next_cursor` is the position to resume from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T, C> {
    pub data: Vec<T>,
    pub next_cursor: Option<C>,
    #[serde(default)]
    pub has_next_page: bool,
}

impl<T, C> Page<T, C> {
    // Cursor to request the next page, if there is one
    pub fn continuation(&self) -> Option<&C> {
        if self.has_next_page {
            self.next_cursor.as_ref()
        } else {
            None
        }
    }
}

pub type ObjectPage = Page<ObjectResponse, ObjectId>;
pub type CoinPage = Page<Coin, ObjectId>;
pub type EventPage = Page<EventEnvelope, EventId>;

// 64 bits integer rendered as a JSON string by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BigInt(#[serde(with = "string_u64")] pub u64);

impl From<BigInt> for u64 {
    fn from(value: BigInt) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_continuation() {
        let page: Page<u8, String> =
            serde_json::from_str(r#"{"data":[1,2],"nextCursor":"abc","hasNextPage":true}"#)
                .unwrap();
        assert_eq!(page.continuation().map(String::as_str), Some("abc"));

        // The node may return the last cursor even when there is nothing left
        let page: Page<u8, String> =
            serde_json::from_str(r#"{"data":[],"nextCursor":"abc","hasNextPage":false}"#)
                .unwrap();
        assert_eq!(page.continuation(), None);

        let page: Page<u8, String> = serde_json::from_str(r#"{"data":[3]}"#).unwrap();
        assert_eq!(page.continuation(), None);
        assert_eq!(page.data, vec![3]);
    }

    #[test]
    fn test_event_page_without_cursor() {
        let page: EventPage =
            serde_json::from_str(r#"{"data":[],"nextCursor":null,"hasNextPage":false}"#).unwrap();
        assert!(page.data.is_empty());
        assert!(page.next_cursor.is_none());

        let page: EventPage = serde_json::from_str(r#"{"data":[],"hasNextPage":false}"#).unwrap();
        assert_eq!(page.continuation(), None);
    }

    #[test]
    fn test_big_int() {
        let price: BigInt = serde_json::from_str(r#""750""#).unwrap();
        assert_eq!(u64::from(price), 750);
        let price: BigInt = serde_json::from_str("1000").unwrap();
        assert_eq!(price.0, 1000);
    }
}
