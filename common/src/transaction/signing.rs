use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use super::TransactionData;
use crate::crypto::{blake2b256_parts, Digest, KeyPair, UserSignature};

// Intent prepended to the transaction bytes before signing:
// scope = transaction data, version = 0, app = ledger
pub const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Failed to encode transaction data: {0}")]
    Encoding(#[from] bcs::Error),
    #[error("Transaction sender {sender} does not match signer {signer}")]
    SenderMismatch { sender: String, signer: String },
}

// Message the signer actually signs: hash of the intent followed by the transaction bytes
pub fn signing_message(tx_bytes: &[u8]) -> [u8; 32] {
    blake2b256_parts(&[&TRANSACTION_INTENT, tx_bytes])
}

// Transaction ready to be submitted to a node
#[derive(Debug, Clone)]
pub struct SignedTransaction {
    data: TransactionData,
    tx_bytes: Vec<u8>,
    signatures: Vec<UserSignature>,
    digest: Digest,
}

impl SignedTransaction {
    pub fn sign(data: TransactionData, keypair: &KeyPair) -> Result<Self, SigningError> {
        let signer = keypair.address();
        if *data.sender() != signer {
            return Err(SigningError::SenderMismatch {
                sender: data.sender().to_string(),
                signer: signer.to_string(),
            });
        }

        let tx_bytes = data.to_bytes()?;
        let digest = data.digest()?;
        let signature = keypair.sign(&signing_message(&tx_bytes));

        Ok(Self {
            data,
            tx_bytes,
            signatures: vec![signature],
            digest,
        })
    }

    pub fn data(&self) -> &TransactionData {
        &self.data
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn tx_bytes(&self) -> &[u8] {
        &self.tx_bytes
    }

    pub fn signatures(&self) -> &[UserSignature] {
        &self.signatures
    }

    pub fn tx_bytes_base64(&self) -> String {
        STANDARD.encode(&self.tx_bytes)
    }

    pub fn signatures_base64(&self) -> Vec<String> {
        self.signatures.iter().map(UserSignature::to_base64).collect()
    }
}
