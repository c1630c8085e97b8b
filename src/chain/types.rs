//! Transaction and receipt types exchanged with the node

use alloy_primitives::{Address, Bytes, B256, U256};

/// Fields shared by every transaction the sender submits.
///
/// Fixed before the payload (constructor or method call) is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    pub from: Address,
    pub gas_price: u128,
    pub chain_id: u64,
    pub nonce: u64,
}

/// An unsigned legacy transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub from: Address,
    /// Destination; `None` creates a contract from `input`
    pub to: Option<Address>,
    pub input: Bytes,
    pub value: U256,
    pub gas_price: u128,
    /// Zero until the gas limit has been estimated
    pub gas_limit: u64,
    pub chain_id: u64,
    pub nonce: u64,
}

impl TransactionRequest {
    /// Contract creation carrying init code
    pub fn create(params: TxParams, init_code: Bytes) -> Self {
        Self::new(params, None, init_code)
    }

    /// Call of an existing contract
    pub fn call(params: TxParams, to: Address, input: Bytes) -> Self {
        Self::new(params, Some(to), input)
    }

    fn new(params: TxParams, to: Option<Address>, input: Bytes) -> Self {
        Self {
            from: params.from,
            to,
            input,
            value: U256::ZERO,
            gas_price: params.gas_price,
            gas_limit: 0,
            chain_id: params.chain_id,
            nonce: params.nonce,
        }
    }

    /// Whether this transaction deploys a contract
    pub fn is_create(&self) -> bool {
        self.to.is_none()
    }
}

/// A read-only `eth_call`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub from: Option<Address>,
    pub to: Address,
    pub input: Bytes,
}

/// A signed transaction ready for broadcast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// EIP-2718 encoded bytes
    pub raw: Bytes,
    pub hash: B256,
    pub nonce: u64,
}

/// Node confirmation that a transaction was included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    /// Set only for contract creations
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
    pub status: bool,
}
