use std::{collections::HashSet, fmt::Debug, hash::Hash};

use async_trait::async_trait;
use reelchain_common::{
    api::{
        CoinPage, DryRunResponse, EventFilter, EventId, EventPage, ObjectDataOptions,
        ObjectPage, ObjectQuery, ObjectResponse, TransactionResponse,
    },
    crypto::{Address, ObjectId},
    rpc::RpcError,
    transaction::SignedTransaction,
};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

// Ordering of an event query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum EventOrder {
    #[default]
    Ascending,
    Descending,
}

impl EventOrder {
    pub fn is_descending(&self) -> bool {
        *self == EventOrder::Descending
    }
}

// Remote ledger as seen by the client.
// Every method is a single request, nothing is retried.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn get_owned_objects(
        &self,
        owner: &Address,
        query: &ObjectQuery,
        cursor: Option<&ObjectId>,
        limit: Option<usize>,
    ) -> Result<ObjectPage, RpcError>;

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        options: &ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>, RpcError>;

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<&EventId>,
        limit: Option<usize>,
        order: EventOrder,
    ) -> Result<EventPage, RpcError>;

    async fn get_coins(
        &self,
        owner: &Address,
        coin_type: &str,
        cursor: Option<&ObjectId>,
        limit: Option<usize>,
    ) -> Result<CoinPage, RpcError>;

    async fn get_reference_gas_price(&self) -> Result<u64, RpcError>;

    async fn execute_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<TransactionResponse, RpcError>;

    async fn dry_run_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<DryRunResponse, RpcError>;
}

// Cursors handed out by the node while following the pages of one query
pub struct CursorTrail<C> {
    seen: HashSet<C>,
}

impl<C: Copy + Eq + Hash + Debug> CursorTrail<C> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    // Accept the next cursor, a node returning one twice would never reach the last page
    pub fn advance(&mut self, cursor: C) -> Result<C, ClientError> {
        if !self.seen.insert(cursor) {
            return Err(ClientError::RemoteError(RpcError::InvalidResponse(format!(
                "cursor {:?} returned twice",
                cursor
            ))));
        }
        Ok(cursor)
    }
}

impl<C: Copy + Eq + Hash + Debug> Default for CursorTrail<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelchain_common::crypto::Digest;

    #[test]
    fn test_cursor_trail() {
        let mut trail = CursorTrail::new();
        assert_eq!(trail.advance(ObjectId::from_u8(1)).unwrap(), ObjectId::from_u8(1));
        assert_eq!(trail.advance(ObjectId::from_u8(2)).unwrap(), ObjectId::from_u8(2));
        // Going back to an earlier cursor is a cycle as well
        assert!(matches!(
            trail.advance(ObjectId::from_u8(1)),
            Err(ClientError::RemoteError(RpcError::InvalidResponse(_)))
        ));

        let mut trail = CursorTrail::new();
        let id = EventId {
            tx_digest: Digest::zero(),
            event_seq: 3,
        };
        trail.advance(id).unwrap();
        let err = trail.advance(id).unwrap_err();
        assert!(!err.is_retryable());
        assert!(!err.is_not_found());
    }
}
