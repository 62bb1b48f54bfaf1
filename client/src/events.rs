//! Read path over the ledger event log.
//! Lists of profiles and videos are rebuilt from their creation events.

use futures::{stream, Stream, TryStreamExt};
use log::trace;
use reelchain_common::{
    api::{EventEnvelope, EventFilter, EventId},
    config::MAX_PAGE_SIZE,
    crypto::{Address, ObjectId},
    transaction::StructTag,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{ClientError, Result},
    ledger::{CursorTrail, EventOrder, LedgerApi},
};

// Typed payload of a contract event
pub trait EventSchema: DeserializeOwned {
    const MODULE: &'static str;
    const NAME: &'static str;

    // Entity the event is about
    fn entity_id(&self) -> ObjectId;

    fn event_type(package: ObjectId) -> StructTag {
        StructTag::new(package.into(), Self::MODULE, Self::NAME)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCreated {
    pub profile_id: ObjectId,
    #[serde(default)]
    pub owner: Option<Address>,
}

impl EventSchema for ProfileCreated {
    const MODULE: &'static str = "profile";
    const NAME: &'static str = "ProfileCreated";

    fn entity_id(&self) -> ObjectId {
        self.profile_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCreated {
    pub video_id: ObjectId,
}

impl EventSchema for VideoCreated {
    const MODULE: &'static str = "video";
    const NAME: &'static str = "VideoCreated";

    fn entity_id(&self) -> ObjectId {
        self.video_id
    }
}

pub fn decode_event<E: EventSchema>(event: &EventEnvelope) -> Result<E> {
    serde_json::from_value(event.parsed_json.clone()).map_err(|e| ClientError::MalformedEvent {
        event_type: event.type_.clone(),
        reason: e.to_string(),
    })
}

pub struct EventReader<'a> {
    ledger: &'a dyn LedgerApi,
    page_size: usize,
    order: EventOrder,
}

impl<'a> EventReader<'a> {
    pub fn new(ledger: &'a dyn LedgerApi) -> Self {
        Self {
            ledger,
            page_size: MAX_PAGE_SIZE,
            order: EventOrder::default(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_order(mut self, order: EventOrder) -> Self {
        self.order = order;
        self
    }

    // Lazily fetch every page matching `filter`, ends after the last page.
    // Each call starts again from the beginning of the log.
    pub fn pages(&self, filter: EventFilter) -> impl Stream<Item = Result<Vec<EventEnvelope>>> + 'a {
        let ledger = self.ledger;
        let limit = self.page_size;
        let order = self.order;

        // None once the last page was returned
        let start: Option<(Option<EventId>, CursorTrail<EventId>)> =
            Some((None, CursorTrail::new()));
        stream::try_unfold(start, move |state| {
            let filter = filter.clone();
            async move {
                let Some((cursor, mut trail)) = state else {
                    return Ok(None);
                };

                if log::log_enabled!(log::Level::Trace) {
                    trace!("query events {:?} after {:?}", filter, cursor);
                }
                let page = ledger
                    .query_events(&filter, cursor.as_ref(), Some(limit), order)
                    .await?;
                let next = match page.continuation() {
                    Some(next) => Some((Some(trail.advance(*next)?), trail)),
                    None => None,
                };
                Ok::<_, ClientError>(Some((page.data, next)))
            }
        })
    }

    pub fn records(&self, filter: EventFilter) -> impl Stream<Item = Result<EventEnvelope>> + 'a {
        self.pages(filter)
            .map_ok(|page| stream::iter(page.into_iter().map(Ok)))
            .try_flatten()
    }

    pub fn decoded<E: EventSchema + 'a>(
        &self,
        package: ObjectId,
    ) -> impl Stream<Item = Result<E>> + 'a {
        let filter = EventFilter::MoveEventType(E::event_type(package).to_string());
        self.records(filter)
            .and_then(|event| async move { decode_event::<E>(&event) })
    }

    // Ids of every entity announced by `E` events, in the order received
    pub async fn entity_ids<E: EventSchema + 'a>(&self, package: ObjectId) -> Result<Vec<ObjectId>> {
        self.decoded::<E>(package)
            .map_ok(|event| event.entity_id())
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLedger;
    use futures::StreamExt;
    use serde_json::json;

    fn package() -> ObjectId {
        ObjectId::from_u8(0xaa)
    }

    fn profile_event_type() -> String {
        ProfileCreated::event_type(package()).to_string()
    }

    #[tokio::test]
    async fn test_ids_across_pages_in_order() {
        let ledger = MockLedger::new();
        for i in 1..=7u8 {
            ledger.add_event(
                &profile_event_type(),
                json!({ "profile_id": ObjectId::from_u8(i), "owner": "0x1" }),
            );
        }
        // Unrelated events are filtered out by type
        ledger.add_event(
            &VideoCreated::event_type(package()).to_string(),
            json!({ "video_id": "0x99" }),
        );

        let reader = EventReader::new(&ledger).with_page_size(3);
        let ids = reader.entity_ids::<ProfileCreated>(package()).await.unwrap();
        assert_eq!(ids, (1..=7u8).map(ObjectId::from_u8).collect::<Vec<_>>());
        assert_eq!(ledger.calls("query_events"), 3);
    }

    #[tokio::test]
    async fn test_descending_order() {
        let ledger = MockLedger::new();
        for i in 1..=4u8 {
            ledger.add_event(
                &VideoCreated::event_type(package()).to_string(),
                json!({ "video_id": ObjectId::from_u8(i) }),
            );
        }

        let ids = EventReader::new(&ledger)
            .with_page_size(2)
            .with_order(EventOrder::Descending)
            .entity_ids::<VideoCreated>(package())
            .await
            .unwrap();
        assert_eq!(ids, (1..=4u8).rev().map(ObjectId::from_u8).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_missing_field_is_malformed() {
        let ledger = MockLedger::new();
        ledger.add_event(&profile_event_type(), json!({ "profile_id": "0x1" }));
        ledger.add_event(&profile_event_type(), json!({ "owner": "0x1" }));

        let err = EventReader::new(&ledger)
            .entity_ids::<ProfileCreated>(package())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::MalformedEvent { ref reason, .. } if reason.contains("profile_id")
        ));
    }

    #[tokio::test]
    async fn test_empty_log() {
        let ledger = MockLedger::new();
        let ids = EventReader::new(&ledger)
            .entity_ids::<VideoCreated>(package())
            .await
            .unwrap();
        assert!(ids.is_empty());
        assert_eq!(ledger.calls("query_events"), 1);
    }

    #[tokio::test]
    async fn test_stream_is_lazy_and_restartable() {
        let ledger = MockLedger::new();
        for i in 1..=5u8 {
            ledger.add_event(&profile_event_type(), json!({ "profile_id": ObjectId::from_u8(i) }));
        }
        let reader = EventReader::new(&ledger).with_page_size(2);

        let records = reader.records(EventFilter::MoveEventType(profile_event_type()));
        futures::pin_mut!(records);
        let first = records.next().await.unwrap().unwrap();
        assert_eq!(first.parsed_json["profile_id"], json!(ObjectId::from_u8(1)));
        // Only the first page was needed
        assert_eq!(ledger.calls("query_events"), 1);

        let again = reader.entity_ids::<ProfileCreated>(package()).await.unwrap();
        assert_eq!(again.len(), 5);
    }

    #[tokio::test]
    async fn test_repeated_cursor_stops() {
        let ledger = MockLedger::new();
        for i in 1..=3u8 {
            ledger.add_event(&profile_event_type(), json!({ "profile_id": ObjectId::from_u8(i) }));
        }
        ledger.stick_cursors();

        let err = EventReader::new(&ledger)
            .with_page_size(2)
            .entity_ids::<ProfileCreated>(package())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RemoteError(_)));
        assert_eq!(ledger.calls("query_events"), 2);
    }

    #[tokio::test]
    async fn test_remote_failure() {
        let ledger = MockLedger::new();
        ledger.fail_next_read();
        let err = EventReader::new(&ledger)
            .entity_ids::<ProfileCreated>(package())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::RemoteUnavailable(_)));
    }
}
