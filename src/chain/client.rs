//! Chain client
//!
//! The per-transaction building blocks used by the sequencers: query the
//! account state, build and sign a request, broadcast it and wait for the
//! receipt. Every operation is a single step so callers can attribute a
//! failure to the stage that produced it.

use crate::chain::rpc::{AlloyRpc, ChainError, ChainRpc};
use crate::chain::types::{
    CallRequest, SignedTransaction, TransactionReceipt, TransactionRequest, TxParams,
};
use crate::contract::abi::encode_call;
use crate::crypto::{sign_transaction, KeyPair};
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, B256};
use std::time::Duration;
use tokio::time::Instant;

/// Default delay between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Percentage added on top of the node's gas estimate
pub const GAS_HEADROOM_PERCENT: u64 = 20;

/// Client for a single node endpoint
pub struct ChainClient<R = AlloyRpc> {
    rpc: R,
    poll_interval: Duration,
    receipt_timeout: Option<Duration>,
}

impl ChainClient<AlloyRpc> {
    /// Connect to an HTTP JSON-RPC endpoint
    pub fn connect(rpc_url: &str) -> Result<Self, ChainError> {
        let rpc = AlloyRpc::connect(rpc_url)?;
        log::info!("Using RPC endpoint {}", rpc.endpoint());
        Ok(Self::new(rpc))
    }
}

impl<R: ChainRpc> ChainClient<R> {
    pub fn new(rpc: R) -> Self {
        Self {
            rpc,
            poll_interval: DEFAULT_POLL_INTERVAL,
            receipt_timeout: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Bound the receipt wait. `None` waits until the node reports one.
    pub fn with_receipt_timeout(mut self, receipt_timeout: Option<Duration>) -> Self {
        self.receipt_timeout = receipt_timeout;
        self
    }

    /// Underlying RPC backend
    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub async fn chain_id(&self) -> Result<u64, ChainError> {
        self.rpc.chain_id().await
    }

    /// Next nonce for `address`, queried from the node
    pub async fn get_nonce(&self, address: Address) -> Result<u64, ChainError> {
        let nonce = self.rpc.transaction_count(address).await?;
        log::debug!("Nonce for {}: {}", address, nonce);
        Ok(nonce)
    }

    /// Current gas price in wei
    pub async fn get_gas_price(&self) -> Result<u128, ChainError> {
        let gas_price = self.rpc.gas_price().await?;
        log::debug!("Gas price: {} wei", gas_price);
        Ok(gas_price)
    }

    /// Attach a payload to `params` and fill in the gas limit.
    ///
    /// `to == None` builds a contract creation from `input`.
    pub async fn build_transaction(
        &self,
        to: Option<Address>,
        input: Bytes,
        params: TxParams,
    ) -> Result<TransactionRequest, ChainError> {
        let mut request = match to {
            Some(address) => TransactionRequest::call(params, address, input),
            None => TransactionRequest::create(params, input),
        };

        let estimate = self.rpc.estimate_gas(&request).await?;
        request.gas_limit = with_headroom(estimate);
        log::debug!(
            "Built {} (nonce {}, gas {} from estimate {})",
            if request.is_create() { "deployment" } else { "call" },
            request.nonce,
            request.gas_limit,
            estimate
        );

        Ok(request)
    }

    /// Encode `method(args)` against `abi` and build a transaction to `address`
    pub async fn build_call(
        &self,
        address: Address,
        abi: &JsonAbi,
        method: &str,
        args: &[String],
        params: TxParams,
    ) -> Result<TransactionRequest, ChainError> {
        let call = encode_call(abi, method, args)?;
        self.build_transaction(Some(address), call.data, params)
            .await
    }

    /// Sign locally; no network access
    pub fn sign(
        &self,
        request: &TransactionRequest,
        key: &KeyPair,
    ) -> Result<SignedTransaction, ChainError> {
        Ok(sign_transaction(request, key)?)
    }

    /// Submit a signed transaction and return the hash the node reports
    pub async fn broadcast(&self, signed: &SignedTransaction) -> Result<B256, ChainError> {
        let hash = self.rpc.send_raw_transaction(&signed.raw).await?;
        log::info!("Broadcast transaction {} (nonce {})", hash, signed.nonce);
        Ok(hash)
    }

    /// Poll until the node returns a receipt for `hash`.
    ///
    /// The receipt is returned whatever its status; callers decide whether
    /// a revert is an error.
    pub async fn await_receipt(&self, hash: B256) -> Result<TransactionReceipt, ChainError> {
        let started = Instant::now();
        log::info!("Waiting for receipt of {}", hash);

        loop {
            if let Some(receipt) = self.rpc.transaction_receipt(hash).await? {
                log::info!(
                    "Transaction {} included in block {} (status: {})",
                    hash,
                    receipt
                        .block_number
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    if receipt.status { "success" } else { "reverted" }
                );
                return Ok(receipt);
            }

            if let Some(timeout) = self.receipt_timeout {
                let waited = started.elapsed();
                if waited >= timeout {
                    return Err(ChainError::ReceiptTimeout { hash, waited });
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Read-only call of `method(args)` on the contract at `address`
    pub async fn call(
        &self,
        address: Address,
        abi: &JsonAbi,
        method: &str,
        args: &[String],
    ) -> Result<Vec<DynSolValue>, ChainError> {
        let encoded = encode_call(abi, method, args)?;
        if !encoded.is_read_only() {
            log::warn!(
                "{} is not view or pure; state changes from this call are discarded",
                encoded.function.signature()
            );
        }
        let output = self
            .rpc
            .call(&CallRequest {
                from: None,
                to: address,
                input: encoded.data.clone(),
            })
            .await?;

        Ok(encoded.decode_output(&output)?)
    }
}

fn with_headroom(estimate: u64) -> u64 {
    estimate.saturating_add(estimate.saturating_mul(GAS_HEADROOM_PERCENT) / 100)
}
