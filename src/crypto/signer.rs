//! Transaction signing
//!
//! Turns an unsigned [`TransactionRequest`] into EIP-155 signed, EIP-2718
//! encoded bytes ready for `eth_sendRawTransaction`. Nothing here touches
//! the network.

use crate::chain::types::{SignedTransaction, TransactionRequest};
use crate::crypto::keys::{KeyError, KeyPair};
use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, TxKind};
use thiserror::Error;

/// Signing errors
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("Transaction sender {request} does not match signing key {key}")]
    SenderMismatch { request: Address, key: Address },
}

/// Build the legacy transaction body for a request
pub fn to_legacy(request: &TransactionRequest) -> TxLegacy {
    TxLegacy {
        chain_id: Some(request.chain_id),
        nonce: request.nonce,
        gas_price: request.gas_price,
        gas_limit: request.gas_limit,
        to: match request.to {
            Some(address) => TxKind::Call(address),
            None => TxKind::Create,
        },
        value: request.value,
        input: request.input.clone(),
    }
}

/// Sign a transaction request with the given key
pub fn sign_transaction(
    request: &TransactionRequest,
    key: &KeyPair,
) -> Result<SignedTransaction, SigningError> {
    let key_address = key.address();
    if request.from != key_address {
        return Err(SigningError::SenderMismatch {
            request: request.from,
            key: key_address,
        });
    }

    let tx = to_legacy(request);
    let signature = key.sign_hash(&tx.signature_hash())?;
    let signed = tx.into_signed(signature);
    let hash = *signed.hash();
    let raw = TxEnvelope::from(signed).encoded_2718();

    log::debug!(
        "Signed transaction {} (nonce {}, {} bytes)",
        hash,
        request.nonce,
        raw.len()
    );

    Ok(SignedTransaction {
        raw: raw.into(),
        hash,
        nonce: request.nonce,
    })
}
