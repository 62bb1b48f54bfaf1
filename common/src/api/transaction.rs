use serde::{Deserialize, Serialize};

use super::{EventEnvelope, Owner};
use crate::{
    crypto::{Address, Digest, ObjectId},
    transaction::SequenceNumber,
    utils::serde_helpers::string_u64,
};

// How long the node waits before answering a submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ExecuteRequestType {
    #[default]
    WaitForLocalExecution,
    WaitForEffectsCert,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponseOptions {
    #[serde(default)]
    pub show_input: bool,
    #[serde(default)]
    pub show_effects: bool,
    #[serde(default)]
    pub show_events: bool,
    #[serde(default)]
    pub show_object_changes: bool,
    #[serde(default)]
    pub show_balance_changes: bool,
}

impl TransactionResponseOptions {
    // Everything needed to interpret the outcome of a call
    pub fn outcome() -> Self {
        Self {
            show_input: false,
            show_effects: true,
            show_events: true,
            show_object_changes: true,
            show_balance_changes: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ExecutionStatus {
    Success,
    Failure { error: String },
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GasCostSummary {
    #[serde(with = "string_u64")]
    pub computation_cost: u64,
    #[serde(with = "string_u64")]
    pub storage_cost: u64,
    #[serde(with = "string_u64")]
    pub storage_rebate: u64,
    #[serde(default, with = "string_u64")]
    pub non_refundable_storage_fee: u64,
}

impl GasCostSummary {
    // Net amount charged to the sender, a large rebate can make it negative
    pub fn net_gas_usage(&self) -> i64 {
        let cost = self.computation_cost as i128 + self.storage_cost as i128;
        (cost - self.storage_rebate as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRefResponse {
    pub object_id: ObjectId,
    #[serde(with = "string_u64")]
    pub version: SequenceNumber,
    pub digest: Digest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnedObjectRef {
    pub owner: Owner,
    pub reference: ObjectRefResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    pub transaction_digest: Digest,
    #[serde(default)]
    pub gas_used: GasCostSummary,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub mutated: Vec<OwnedObjectRef>,
    #[serde(default)]
    pub deleted: Vec<ObjectRefResponse>,
}

// Object level summary of what a transaction did
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectChange {
    #[serde(rename_all = "camelCase")]
    Created {
        sender: Address,
        owner: Owner,
        object_type: String,
        object_id: ObjectId,
        #[serde(with = "string_u64")]
        version: SequenceNumber,
        digest: Digest,
    },
    #[serde(rename_all = "camelCase")]
    Mutated {
        sender: Address,
        owner: Owner,
        object_type: String,
        object_id: ObjectId,
        #[serde(with = "string_u64")]
        version: SequenceNumber,
        #[serde(with = "string_u64")]
        previous_version: SequenceNumber,
        digest: Digest,
    },
    #[serde(rename_all = "camelCase")]
    Transferred {
        sender: Address,
        recipient: Owner,
        object_type: String,
        object_id: ObjectId,
        #[serde(with = "string_u64")]
        version: SequenceNumber,
        digest: Digest,
    },
    #[serde(rename_all = "camelCase")]
    Deleted {
        sender: Address,
        object_type: String,
        object_id: ObjectId,
        #[serde(with = "string_u64")]
        version: SequenceNumber,
    },
    #[serde(rename_all = "camelCase")]
    Wrapped {
        sender: Address,
        object_type: String,
        object_id: ObjectId,
        #[serde(with = "string_u64")]
        version: SequenceNumber,
    },
    #[serde(rename_all = "camelCase")]
    Published {
        package_id: ObjectId,
        #[serde(with = "string_u64")]
        version: SequenceNumber,
        digest: Digest,
        #[serde(default)]
        modules: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

impl ObjectChange {
    pub fn object_id(&self) -> Option<&ObjectId> {
        match self {
            ObjectChange::Created { object_id, .. }
            | ObjectChange::Mutated { object_id, .. }
            | ObjectChange::Transferred { object_id, .. }
            | ObjectChange::Deleted { object_id, .. }
            | ObjectChange::Wrapped { object_id, .. } => Some(object_id),
            ObjectChange::Published { package_id, .. } => Some(package_id),
            ObjectChange::Unknown => None,
        }
    }

    pub fn object_type(&self) -> Option<&str> {
        match self {
            ObjectChange::Created { object_type, .. }
            | ObjectChange::Mutated { object_type, .. }
            | ObjectChange::Transferred { object_type, .. }
            | ObjectChange::Deleted { object_type, .. }
            | ObjectChange::Wrapped { object_type, .. } => Some(object_type),
            ObjectChange::Published { .. } | ObjectChange::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    pub digest: Digest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<TransactionEffects>,
    #[serde(default)]
    pub events: Vec<EventEnvelope>,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
    // Set when the node could not fully process the transaction
    #[serde(default)]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DryRunResponse {
    pub effects: TransactionEffects,
    #[serde(default)]
    pub events: Vec<EventEnvelope>,
    #[serde(default)]
    pub object_changes: Vec<ObjectChange>,
}
