//! In-memory ledger used by tests.
//! It stores objects, coins and events, pages through them like a full node,
//! and simulates the profile and video constructors of the contract.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use reelchain_common::{
    api::{
        Coin, CoinPage, DryRunResponse, EventEnvelope, EventFilter, EventId, EventPage,
        ExecutionStatus, GasCostSummary, ObjectChange, ObjectData, ObjectDataOptions,
        ObjectFilter, ObjectPage, ObjectQuery, ObjectResponse, Owner, Page, ParsedData,
        TransactionEffects, TransactionResponse,
    },
    crypto::{Address, Digest, ObjectId},
    rpc::{JsonRpcError, RpcError},
    transaction::{Command, SignedTransaction, TransactionData},
};
use serde_json::{json, Map, Value};

use crate::ledger::{EventOrder, LedgerApi};

// Scripted answer for the next submission
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    // The node refuses the transaction before executing it
    Reject { code: i64, message: String },
    // The transaction executes and aborts
    Abort(String),
    // The node does not answer
    Timeout,
}

#[derive(Debug, Clone)]
struct StoredObject {
    owner: Owner,
    data: ObjectData,
}

#[derive(Default)]
struct MockState {
    objects: Vec<StoredObject>,
    // Owned objects the node fails to render: owner, type and error payload
    unreadable: Vec<(Address, String, Value)>,
    coins: Vec<(Address, Coin)>,
    events: Vec<EventEnvelope>,
    gas_price: u64,
    next_id: u64,
    calls: HashMap<&'static str, usize>,
    fail_next_read: bool,
    stuck_cursors: bool,
    next_outcome: Option<ScriptedOutcome>,
    submitted: Vec<TransactionData>,
}

impl MockState {
    fn fresh_id(&mut self) -> ObjectId {
        self.next_id += 1;
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&(0x1000 + self.next_id).to_be_bytes());
        ObjectId::new(bytes)
    }

    fn record(&mut self, method: &'static str) -> Result<(), RpcError> {
        *self.calls.entry(method).or_default() += 1;
        if self.fail_next_read {
            self.fail_next_read = false;
            return Err(RpcError::Timeout(Duration::from_secs(30)));
        }
        Ok(())
    }

    // A stuck node ignores the cursor and always announces a next page
    fn page<T: Clone, C: Clone + PartialEq>(
        &self,
        items: &[T],
        key: impl Fn(&T) -> C,
        cursor: Option<&C>,
        limit: Option<usize>,
    ) -> Page<T, C> {
        if !self.stuck_cursors {
            return paginate(items, key, cursor, limit);
        }
        let mut page = paginate(items, key, None, limit);
        page.has_next_page = true;
        page
    }
}

pub struct MockLedger {
    state: Mutex<MockState>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

fn move_object(
    id: ObjectId,
    version: u64,
    object_type: String,
    owner: Owner,
    fields: Map<String, Value>,
) -> ObjectData {
    ObjectData {
        object_id: id,
        version,
        digest: Digest::new([version as u8; 32]),
        type_: Some(object_type.clone()),
        owner: Some(owner),
        content: Some(ParsedData::MoveObject {
            type_: object_type,
            has_public_transfer: true,
            fields,
        }),
    }
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

// Page through `items` after the element matching `cursor`
fn paginate<T: Clone, C: Clone + PartialEq>(
    items: &[T],
    key: impl Fn(&T) -> C,
    cursor: Option<&C>,
    limit: Option<usize>,
) -> Page<T, C> {
    let start = match cursor {
        Some(cursor) => items
            .iter()
            .position(|item| key(item) == *cursor)
            .map_or(items.len(), |i| i + 1),
        None => 0,
    };
    let limit = limit.unwrap_or(usize::MAX).max(1);
    let end = start.saturating_add(limit).min(items.len());
    let data = items[start..end].to_vec();

    Page {
        next_cursor: data.last().map(&key),
        has_next_page: end < items.len(),
        data,
    }
}

impl MockLedger {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                gas_price: 1_000,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only happens after a test already panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_gas_price(&self, price: u64) {
        self.state().gas_price = price;
    }

    pub fn add_object(&self, owner: Owner, data: ObjectData) {
        self.state().objects.push(StoredObject { owner, data });
    }

    // Capability owned by `owner` controlling `profile_id`
    pub fn add_profile_cap(
        &self,
        owner: Address,
        package: ObjectId,
        cap_id: ObjectId,
        profile_id: ObjectId,
    ) {
        let object_type = format!("{}::profile::ProfileOwnerCap", package);
        let data = move_object(
            cap_id,
            1,
            object_type,
            Owner::AddressOwner(owner),
            fields(json!({ "id": { "id": cap_id }, "profile_id": profile_id })),
        );
        self.add_object(Owner::AddressOwner(owner), data);
    }

    pub fn add_shared_object(&self, id: ObjectId, object_type: &str, initial_shared_version: u64) {
        let owner = Owner::Shared {
            initial_shared_version,
        };
        let data = move_object(
            id,
            initial_shared_version,
            object_type.to_owned(),
            owner.clone(),
            Map::new(),
        );
        self.add_object(owner, data);
    }

    pub fn add_coin(&self, owner: Address, id: ObjectId, balance: u64) {
        let coin = Coin {
            coin_type: "0x2::sui::SUI".to_owned(),
            coin_object_id: id,
            version: 1,
            digest: Digest::new([1; 32]),
            balance,
        };
        self.state().coins.push((owner, coin));
    }

    pub fn add_event(&self, event_type: &str, parsed_json: Value) {
        let mut state = self.state();
        let event_seq = state.events.len() as u64;
        state.events.push(EventEnvelope {
            id: EventId {
                tx_digest: Digest::new([event_seq as u8; 32]),
                event_seq,
            },
            package_id: None,
            transaction_module: None,
            sender: Address::ZERO,
            type_: event_type.to_owned(),
            parsed_json,
            timestamp_ms: Some(1_700_000_000_000 + event_seq),
        });
    }

    // Owned object listed by the node with an error instead of its data
    pub fn add_unreadable_object(&self, owner: Address, object_type: &str, error: Value) {
        self.state()
            .unreadable
            .push((owner, object_type.to_owned(), error));
    }

    pub fn fail_next_read(&self) {
        self.state().fail_next_read = true;
    }

    // From now on every page repeats the first one and claims more follow
    pub fn stick_cursors(&self) {
        self.state().stuck_cursors = true;
    }

    pub fn script_next_outcome(&self, outcome: ScriptedOutcome) {
        self.state().next_outcome = Some(outcome);
    }

    // How many times a ledger method was called
    pub fn calls(&self, method: &str) -> usize {
        self.state().calls.get(method).copied().unwrap_or(0)
    }

    // Transactions received by `execute_transaction`, in order
    pub fn submitted(&self) -> Vec<TransactionData> {
        self.state().submitted.clone()
    }

    fn effects(digest: Digest, status: ExecutionStatus) -> TransactionEffects {
        TransactionEffects {
            status,
            transaction_digest: digest,
            gas_used: GasCostSummary {
                computation_cost: 1_000_000,
                storage_cost: 2_000_000,
                storage_rebate: 500_000,
                non_refundable_storage_fee: 0,
            },
            created: Vec::new(),
            mutated: Vec::new(),
            deleted: Vec::new(),
        }
    }

    // Apply the constructors this mock knows about, other calls succeed without effects
    fn simulate(
        state: &mut MockState,
        data: &TransactionData,
        digest: Digest,
    ) -> (Vec<ObjectChange>, Vec<EventEnvelope>) {
        let sender = *data.sender();
        let mut changes = Vec::new();
        let mut events = Vec::new();

        for command in &data.programmable().commands {
            let Command::MoveCall(call) = command else {
                continue;
            };

            let package = call.package;
            let (entity, cap, event, field) =
                match (call.module.as_str(), call.function.as_str()) {
                    ("profile", "create_profile") => {
                        ("Profile", "ProfileOwnerCap", "ProfileCreated", "profile_id")
                    }
                    ("video", "create_video") => {
                        ("Video", "VideoStats", "VideoCreated", "video_id")
                    }
                    _ => continue,
                };

            let entity_id = state.fresh_id();
            let second_id = state.fresh_id();
            let entity_type = format!("{}::{}::{}", package, call.module, entity);
            let second_type = format!("{}::{}::{}", package, call.module, cap);

            let shared = Owner::Shared {
                initial_shared_version: 1,
            };
            state.objects.push(StoredObject {
                owner: shared.clone(),
                data: move_object(entity_id, 1, entity_type.clone(), shared.clone(), Map::new()),
            });

            let owned = Owner::AddressOwner(sender);
            state.objects.push(StoredObject {
                owner: owned.clone(),
                data: move_object(
                    second_id,
                    1,
                    second_type.clone(),
                    owned.clone(),
                    fields(json!({ "id": { "id": second_id }, field: entity_id })),
                ),
            });

            for (id, object_type, owner) in [
                (entity_id, entity_type, shared),
                (second_id, second_type, owned),
            ] {
                changes.push(ObjectChange::Created {
                    sender,
                    owner,
                    object_type,
                    object_id: id,
                    version: 1,
                    digest: Digest::new([1; 32]),
                });
            }

            let event = EventEnvelope {
                id: EventId {
                    tx_digest: digest,
                    event_seq: events.len() as u64,
                },
                package_id: Some(package),
                transaction_module: Some(call.module.clone()),
                sender,
                type_: format!("{}::{}::{}", package, call.module, event),
                parsed_json: json!({ field: entity_id, "owner": sender }),
                timestamp_ms: Some(1_700_000_000_000),
            };
            state.events.push(event.clone());
            events.push(event);
        }

        (changes, events)
    }
}

#[async_trait]
impl LedgerApi for MockLedger {
    async fn get_owned_objects(
        &self,
        owner: &Address,
        query: &ObjectQuery,
        cursor: Option<&ObjectId>,
        limit: Option<usize>,
    ) -> Result<ObjectPage, RpcError> {
        let mut state = self.state();
        state.record("get_owned_objects")?;

        let mut matching: Vec<ObjectResponse> = state
            .objects
            .iter()
            .filter(|o| o.owner.address() == Some(owner))
            .filter(|o| match &query.filter {
                Some(ObjectFilter::StructType(t)) => o.data.type_.as_deref() == Some(t.as_str()),
                Some(ObjectFilter::Package(p)) => o
                    .data
                    .type_
                    .as_deref()
                    .is_some_and(|t| t.starts_with(&p.to_string())),
                None => true,
            })
            .map(|o| ObjectResponse {
                data: Some(o.data.clone()),
                error: None,
            })
            .collect();
        matching.extend(
            state
                .unreadable
                .iter()
                .filter(|(o, t, _)| {
                    o == owner
                        && match &query.filter {
                            Some(ObjectFilter::StructType(filter)) => t == filter,
                            _ => true,
                        }
                })
                .map(|(_, _, error)| ObjectResponse {
                    data: None,
                    error: Some(error.clone()),
                }),
        );

        Ok(state.page(
            &matching,
            |o| o.data.as_ref().map(|d| d.object_id).unwrap_or_default(),
            cursor,
            limit,
        ))
    }

    async fn multi_get_objects(
        &self,
        ids: &[ObjectId],
        _: &ObjectDataOptions,
    ) -> Result<Vec<ObjectResponse>, RpcError> {
        let mut state = self.state();
        state.record("multi_get_objects")?;

        Ok(ids
            .iter()
            .map(|id| match state.objects.iter().find(|o| o.data.object_id == *id) {
                Some(object) => ObjectResponse {
                    data: Some(object.data.clone()),
                    error: None,
                },
                None => ObjectResponse {
                    data: None,
                    error: Some(json!({ "code": "notExists", "object_id": id })),
                },
            })
            .collect())
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        cursor: Option<&EventId>,
        limit: Option<usize>,
        order: EventOrder,
    ) -> Result<EventPage, RpcError> {
        let mut state = self.state();
        state.record("query_events")?;

        let mut matching: Vec<EventEnvelope> = state
            .events
            .iter()
            .filter(|e| match filter {
                EventFilter::MoveEventType(t) => e.type_ == *t,
                EventFilter::Sender(sender) => e.sender == *sender,
                EventFilter::Transaction(digest) => e.id.tx_digest == *digest,
            })
            .cloned()
            .collect();
        if order.is_descending() {
            matching.reverse();
        }

        Ok(state.page(&matching, |e| e.id, cursor, limit))
    }

    async fn get_coins(
        &self,
        owner: &Address,
        coin_type: &str,
        cursor: Option<&ObjectId>,
        limit: Option<usize>,
    ) -> Result<CoinPage, RpcError> {
        let mut state = self.state();
        state.record("get_coins")?;

        let matching: Vec<Coin> = state
            .coins
            .iter()
            .filter(|(o, c)| o == owner && c.coin_type == coin_type)
            .map(|(_, c)| c.clone())
            .collect();

        Ok(state.page(&matching, |c| c.coin_object_id, cursor, limit))
    }

    async fn get_reference_gas_price(&self) -> Result<u64, RpcError> {
        let mut state = self.state();
        state.record("get_reference_gas_price")?;
        Ok(state.gas_price)
    }

    async fn execute_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<TransactionResponse, RpcError> {
        let mut state = self.state();
        *state.calls.entry("execute_transaction").or_default() += 1;

        let digest = *transaction.digest();
        match state.next_outcome.take() {
            Some(ScriptedOutcome::Reject { code, message }) => {
                return Err(RpcError::Rpc(JsonRpcError {
                    code,
                    message,
                    data: None,
                }))
            }
            Some(ScriptedOutcome::Timeout) => {
                state.submitted.push(transaction.data().clone());
                return Err(RpcError::Timeout(Duration::from_secs(30)));
            }
            Some(ScriptedOutcome::Abort(error)) => {
                state.submitted.push(transaction.data().clone());
                return Ok(TransactionResponse {
                    digest,
                    effects: Some(Self::effects(digest, ExecutionStatus::Failure { error })),
                    events: Vec::new(),
                    object_changes: Vec::new(),
                    errors: Vec::new(),
                });
            }
            None => {}
        }

        state.submitted.push(transaction.data().clone());
        let (object_changes, events) = Self::simulate(&mut state, transaction.data(), digest);
        Ok(TransactionResponse {
            digest,
            effects: Some(Self::effects(digest, ExecutionStatus::Success)),
            events,
            object_changes,
            errors: Vec::new(),
        })
    }

    async fn dry_run_transaction(
        &self,
        transaction: &SignedTransaction,
    ) -> Result<DryRunResponse, RpcError> {
        let mut state = self.state();
        state.record("dry_run_transaction")?;

        Ok(DryRunResponse {
            effects: Self::effects(*transaction.digest(), ExecutionStatus::Success),
            events: Vec::new(),
            object_changes: Vec::new(),
        })
    }
}
