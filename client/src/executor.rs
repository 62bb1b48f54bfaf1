use log::{debug, info, trace, warn};
use reelchain_common::{
    api::{
        EventEnvelope, ExecutionStatus, GasCostSummary, ObjectChange, Owner, TransactionEffects,
    },
    crypto::{Digest, KeyPair, ObjectId},
    rpc::RpcError,
    transaction::{SignedTransaction, TransactionData},
};
use serde::Serialize;

use crate::{
    error::{ClientError, Result},
    ledger::LedgerApi,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedObject {
    pub object_id: ObjectId,
    pub object_type: Option<String>,
    pub owner: Owner,
}

// What a call did on the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionOutcome {
    pub digest: Digest,
    pub status: ExecutionStatus,
    pub created: Vec<CreatedObject>,
    pub mutated: Vec<ObjectId>,
    pub events: Vec<EventEnvelope>,
    pub gas_used: GasCostSummary,
    // Simulated only, nothing was committed
    pub dry_run: bool,
}

impl TransactionOutcome {
    fn new(
        digest: Digest,
        effects: TransactionEffects,
        object_changes: Vec<ObjectChange>,
        events: Vec<EventEnvelope>,
        dry_run: bool,
    ) -> Self {
        let mut created = Vec::new();
        let mut mutated = Vec::new();
        for change in object_changes {
            match change {
                ObjectChange::Created {
                    object_id,
                    object_type,
                    owner,
                    ..
                } => created.push(CreatedObject {
                    object_id,
                    object_type: Some(object_type),
                    owner,
                }),
                ObjectChange::Mutated { object_id, .. } => mutated.push(object_id),
                _ => {}
            }
        }

        // Older nodes only report references in the effects
        if created.is_empty() && mutated.is_empty() {
            created = effects
                .created
                .iter()
                .map(|o| CreatedObject {
                    object_id: o.reference.object_id,
                    object_type: None,
                    owner: o.owner.clone(),
                })
                .collect();
            mutated = effects
                .mutated
                .iter()
                .map(|o| o.reference.object_id)
                .collect();
        }

        Self {
            digest,
            status: effects.status,
            created,
            mutated,
            events,
            gas_used: effects.gas_used,
            dry_run,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    // First created object whose type is `module::name`, whatever its package
    pub fn created_of_type(&self, module: &str, name: &str) -> Option<ObjectId> {
        let suffix = format!("::{}::{}", module, name);
        self.created
            .iter()
            .find(|o| o.object_type.as_deref().is_some_and(|t| t.ends_with(&suffix)))
            .map(|o| o.object_id)
    }

    fn into_result(self) -> Result<Self> {
        match &self.status {
            ExecutionStatus::Success => Ok(self),
            ExecutionStatus::Failure { error } => Err(ClientError::ConfirmationError {
                digest: self.digest,
                error: error.clone(),
            }),
        }
    }
}

// Signs and submits transactions, each exactly once
pub struct Executor<'a> {
    ledger: &'a dyn LedgerApi,
    keypair: &'a KeyPair,
}

impl<'a> Executor<'a> {
    pub fn new(ledger: &'a dyn LedgerApi, keypair: &'a KeyPair) -> Self {
        Self { ledger, keypair }
    }

    fn sign(&self, data: TransactionData) -> Result<SignedTransaction> {
        let signed = SignedTransaction::sign(data, self.keypair)?;
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Signed transaction {} ({} bytes)",
                signed.digest(),
                signed.tx_bytes().len()
            );
        }
        Ok(signed)
    }

    pub async fn execute(&self, data: TransactionData) -> Result<TransactionOutcome> {
        let signed = self.sign(data)?;
        let digest = *signed.digest();
        info!("Submitting transaction {}", digest);

        let response = match self.ledger.execute_transaction(&signed).await {
            Ok(response) => response,
            Err(error) => return Err(submission_error(digest, error)),
        };

        if response.digest != digest {
            warn!(
                "Node reported digest {} for transaction {}",
                response.digest, digest
            );
        }

        let Some(effects) = response.effects else {
            return Err(ClientError::ConfirmationError {
                digest,
                error: if response.errors.is_empty() {
                    "no effects returned".to_owned()
                } else {
                    response.errors.join(", ")
                },
            });
        };

        let outcome = TransactionOutcome::new(
            response.digest,
            effects,
            response.object_changes,
            response.events,
            false,
        );
        if log::log_enabled!(log::Level::Debug) {
            debug!(
                "Transaction {} executed: {} created, {} mutated, {} events",
                outcome.digest,
                outcome.created.len(),
                outcome.mutated.len(),
                outcome.events.len()
            );
        }
        outcome.into_result()
    }

    // Execute in simulation, nothing is committed
    pub async fn dry_run(&self, data: TransactionData) -> Result<TransactionOutcome> {
        let signed = self.sign(data)?;
        if log::log_enabled!(log::Level::Trace) {
            trace!("dry run of {}", signed.digest());
        }

        let response = self
            .ledger
            .dry_run_transaction(&signed)
            .await
            .map_err(|e| {
                if e.is_rejection() {
                    ClientError::SubmissionError(e)
                } else {
                    ClientError::remote(e)
                }
            })?;

        TransactionOutcome::new(
            *signed.digest(),
            response.effects,
            response.object_changes,
            response.events,
            true,
        )
        .into_result()
    }

    pub async fn run(&self, data: TransactionData, dry_run: bool) -> Result<TransactionOutcome> {
        if dry_run {
            self.dry_run(data).await
        } else {
            self.execute(data).await
        }
    }
}

// Map a failed submission: the node either refused the transaction,
// or we cannot know whether it was executed
fn submission_error(digest: Digest, error: RpcError) -> ClientError {
    match &error {
        RpcError::Rpc(_) => ClientError::SubmissionError(error),
        RpcError::Http { .. } if !error.is_transient() => ClientError::SubmissionError(error),
        RpcError::InvalidAddress(..) | RpcError::ClientBuild(_) => ClientError::remote(error),
        _ => ClientError::ConfirmationUnknown {
            digest,
            source: error,
        },
    }
}
