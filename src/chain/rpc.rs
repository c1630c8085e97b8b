//! JSON-RPC access to an EVM node
//!
//! [`ChainRpc`] is the narrow set of node methods the deployer needs. The
//! production implementation, [`AlloyRpc`], speaks HTTP JSON-RPC through an
//! alloy provider.

use crate::chain::types::{CallRequest, TransactionReceipt, TransactionRequest};
use crate::contract::abi::AbiError;
use crate::crypto::SigningError;
use alloy_primitives::{Address, Bytes, TxKind, B256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types::{TransactionInput, TransactionRequest as RpcTransactionRequest};
use alloy_transport::{RpcError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Chain client errors
#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Node rejected request ({code}): {message}")]
    Rpc { code: i64, message: String },
    #[error("Malformed node response: {0}")]
    MalformedResponse(String),
    #[error("No receipt for {hash} after {waited:?}")]
    ReceiptTimeout { hash: B256, waited: Duration },
    #[error("Transaction {0} reverted")]
    Reverted(B256),
    #[error("Receipt for {0} has no contract address")]
    MissingContractAddress(B256),
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),
}

impl ChainError {
    /// Whether repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChainError::Network(_) | ChainError::ReceiptTimeout { .. }
        )
    }
}

impl From<TransportError> for ChainError {
    fn from(err: TransportError) -> Self {
        match err {
            RpcError::ErrorResp(payload) => ChainError::Rpc {
                code: payload.code,
                message: payload.message.to_string(),
            },
            err @ RpcError::Transport(_) => ChainError::Network(err.to_string()),
            other => ChainError::MalformedResponse(other.to_string()),
        }
    }
}

/// Node methods used by the deployer
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `eth_chainId`
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// `eth_getTransactionCount`
    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError>;

    /// `eth_gasPrice`
    async fn gas_price(&self) -> Result<u128, ChainError>;

    /// `eth_estimateGas`
    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, ChainError>;

    /// `eth_sendRawTransaction`
    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, ChainError>;

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending
    async fn transaction_receipt(&self, hash: B256)
        -> Result<Option<TransactionReceipt>, ChainError>;

    /// `eth_call` against the latest block
    async fn call(&self, request: &CallRequest) -> Result<Bytes, ChainError>;
}

/// HTTP JSON-RPC backend built on an alloy provider
pub struct AlloyRpc {
    provider: RootProvider,
    endpoint: String,
}

impl AlloyRpc {
    /// Create a provider for `rpc_url`. No request is made until first use.
    pub fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let endpoint = redact_url(rpc_url);
        let provider = RootProvider::new_http(
            rpc_url
                .parse()
                .map_err(|e| ChainError::InvalidUrl(format!("{}: {}", endpoint, e)))?,
        );

        Ok(Self { provider, endpoint })
    }

    /// Endpoint with any embedded credential removed, safe to log
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChainRpc for AlloyRpc {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError> {
        Ok(self.provider.get_transaction_count(address).await?)
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, ChainError> {
        Ok(self.provider.estimate_gas(to_rpc_request(request)).await?)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, ChainError> {
        let pending = self.provider.send_raw_transaction(raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.map(|receipt| TransactionReceipt {
            transaction_hash: receipt.transaction_hash,
            contract_address: receipt.contract_address,
            block_number: receipt.block_number,
            status: receipt.status(),
        }))
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ChainError> {
        let rpc_request = RpcTransactionRequest {
            from: request.from,
            to: Some(TxKind::Call(request.to)),
            input: TransactionInput::new(request.input.clone()),
            ..Default::default()
        };
        Ok(self.provider.call(rpc_request).await?)
    }
}

fn to_rpc_request(request: &TransactionRequest) -> RpcTransactionRequest {
    RpcTransactionRequest {
        from: Some(request.from),
        to: Some(match request.to {
            Some(address) => TxKind::Call(address),
            None => TxKind::Create,
        }),
        gas_price: Some(request.gas_price),
        gas: (request.gas_limit > 0).then_some(request.gas_limit),
        value: Some(request.value),
        input: TransactionInput::new(request.input.clone()),
        nonce: Some(request.nonce),
        chain_id: Some(request.chain_id),
        ..Default::default()
    }
}

/// Strip userinfo and path from an endpoint URL.
///
/// Hosted node URLs commonly carry the project credential in the path.
pub fn redact_url(url: &str) -> String {
    let (scheme, rest) = match url.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, url),
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or(authority);
    let redacted = match &rest[authority.len()..] {
        "" | "/" => host.to_string(),
        _ => format!("{}/…", host),
    };

    match scheme {
        Some(scheme) => format!("{}://{}", scheme, redacted),
        None => redacted,
    }
}
