//! Ledger transaction data model.
//!
//! Every type here is encoded with BCS exactly as the ledger expects it:
//! enum variants are encoded by index, so variant order must never change.

pub mod builder;
mod signing;
mod type_tag;


pub use signing::*;
pub use type_tag::*;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{blake2b256_parts, Address, Digest, ObjectId};

pub type SequenceNumber = u64;

// Prefix used when hashing the transaction data to obtain its digest
const TRANSACTION_DATA_DIGEST_SALT: &[u8] = b"TransactionData::";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub object_id: ObjectId,
    pub version: SequenceNumber,
    pub digest: Digest,
}

impl ObjectRef {
    pub fn new(object_id: ObjectId, version: SequenceNumber, digest: Digest) -> Self {
        Self {
            object_id,
            version,
            digest,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum ObjectArg {
    // Owned or immutable object, pinned at a version
    ImmOrOwnedObject(ObjectRef),
    // Shared object, sequenced by consensus
    SharedObject {
        id: ObjectId,
        initial_shared_version: SequenceNumber,
        mutable: bool,
    },
    Receiving(ObjectRef),
}

impl ObjectArg {
    pub fn id(&self) -> ObjectId {
        match self {
            ObjectArg::ImmOrOwnedObject(reference) | ObjectArg::Receiving(reference) => {
                reference.object_id
            }
            ObjectArg::SharedObject { id, .. } => *id,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum CallArg {
    // BCS encoded value
    Pure(Vec<u8>),
    Object(ObjectArg),
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Argument {
    // The coin used to pay for gas
    GasCoin,
    // Index into the transaction inputs
    Input(u16),
    // Result of a previous command
    Result(u16),
    // One value of a previous command returning several
    NestedResult(u16, u16),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ProgrammableMoveCall {
    pub package: ObjectId,
    pub module: String,
    pub function: String,
    pub type_arguments: Vec<TypeTag>,
    pub arguments: Vec<Argument>,
}

impl fmt::Display for ProgrammableMoveCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.package, self.module, self.function)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    MoveCall(Box<ProgrammableMoveCall>),
    // (objects, recipient)
    TransferObjects(Vec<Argument>, Argument),
    // (coin, amounts)
    SplitCoins(Argument, Vec<Argument>),
    // (destination, sources)
    MergeCoins(Argument, Vec<Argument>),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ProgrammableTransaction {
    pub inputs: Vec<CallArg>,
    pub commands: Vec<Command>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    ProgrammableTransaction(ProgrammableTransaction),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct GasData {
    pub payment: Vec<ObjectRef>,
    pub owner: Address,
    pub price: u64,
    pub budget: u64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TransactionExpiration {
    #[default]
    None,
    Epoch(u64),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TransactionDataV1 {
    pub kind: TransactionKind,
    pub sender: Address,
    pub gas_data: GasData,
    pub expiration: TransactionExpiration,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TransactionData {
    V1(TransactionDataV1),
}

impl TransactionData {
    pub fn new_programmable(
        sender: Address,
        payment: Vec<ObjectRef>,
        transaction: ProgrammableTransaction,
        budget: u64,
        price: u64,
    ) -> Self {
        TransactionData::V1(TransactionDataV1 {
            kind: TransactionKind::ProgrammableTransaction(transaction),
            sender,
            gas_data: GasData {
                payment,
                owner: sender,
                price,
                budget,
            },
            expiration: TransactionExpiration::None,
        })
    }

    pub fn sender(&self) -> &Address {
        match self {
            TransactionData::V1(data) => &data.sender,
        }
    }

    pub fn gas_data(&self) -> &GasData {
        match self {
            TransactionData::V1(data) => &data.gas_data,
        }
    }

    pub fn programmable(&self) -> &ProgrammableTransaction {
        match self {
            TransactionData::V1(data) => match &data.kind {
                TransactionKind::ProgrammableTransaction(pt) => pt,
            },
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, bcs::Error> {
        bcs::to_bytes(self)
    }

    // Digest under which the ledger will record this transaction
    pub fn digest(&self) -> Result<Digest, bcs::Error> {
        let bytes = self.to_bytes()?;
        Ok(Digest::new(blake2b256_parts(&[
            TRANSACTION_DATA_DIGEST_SALT,
            &bytes,
        ])))
    }
}
