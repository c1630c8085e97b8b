//! In-memory chain used by the integration tests
//!
//! Accepts signed legacy transactions, enforces nonces and the chain id, and
//! executes a SimpleStorage-shaped contract: `retrieve()` and `store(uint256)`.

#![allow(dead_code)]

use alloy_consensus::{SignableTransaction, TxEnvelope};
use alloy_eips::eip2718::Decodable2718;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, TxKind, B256, U256};
use async_trait::async_trait;
use contract_deployer::chain::{
    CallRequest, ChainClient, ChainError, ChainRpc, TransactionReceipt, TransactionRequest,
};
use contract_deployer::contract::CompiledArtifact;
use contract_deployer::crypto::recover_address;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const CHAIN_ID: u64 = 31337;

/// First anvil development account (FOR TESTING ONLY!)
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

const RETRIEVE: [u8; 4] = [0x2e, 0x64, 0xce, 0xc1];
const STORE: [u8; 4] = [0x60, 0x57, 0x36, 0x1d];

pub const SIMPLE_STORAGE_ABI: &str = r#"[
    {"inputs":[],"name":"retrieve","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
    {"inputs":[{"internalType":"uint256","name":"_favoriteNumber","type":"uint256"}],"name":"store","outputs":[],"stateMutability":"nonpayable","type":"function"}
]"#;

pub fn simple_storage() -> CompiledArtifact {
    let abi: JsonAbi = serde_json::from_str(SIMPLE_STORAGE_ABI).unwrap();
    CompiledArtifact {
        contract_name: "SimpleStorage".to_string(),
        bytecode: Bytes::from(vec![0x60, 0x80, 0x60, 0x40, 0x52, 0x34, 0x80, 0x15]),
        abi,
    }
}

pub fn dev_address() -> Address {
    DEV_ADDRESS.parse().unwrap()
}

#[derive(Default)]
struct State {
    nonces: HashMap<Address, u64>,
    storage: HashMap<Address, U256>,
    receipts: HashMap<B256, TransactionReceipt>,
    block_number: u64,
}

pub struct MockChain {
    chain_id: u64,
    network_down: bool,
    state: Mutex<State>,
    requests: AtomicUsize,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            chain_id: CHAIN_ID,
            network_down: false,
            state: Mutex::new(State::default()),
            requests: AtomicUsize::new(0),
        }
    }

    /// Every request fails as if the endpoint were unreachable
    pub fn unreachable() -> Self {
        Self {
            network_down: true,
            ..Self::new()
        }
    }

    /// Number of RPC requests received
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn nonce_of(&self, address: Address) -> u64 {
        self.state
            .lock()
            .unwrap()
            .nonces
            .get(&address)
            .copied()
            .unwrap_or(0)
    }

    fn request(&self) -> Result<(), ChainError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.network_down {
            return Err(ChainError::Network("connection refused".to_string()));
        }
        Ok(())
    }

    fn rejected(message: &str) -> ChainError {
        ChainError::Rpc {
            code: -32000,
            message: message.to_string(),
        }
    }
}

pub fn client(chain: MockChain) -> ChainClient<MockChain> {
    ChainClient::new(chain)
        .with_poll_interval(Duration::from_millis(1))
        .with_receipt_timeout(Some(Duration::from_secs(5)))
}

#[async_trait]
impl ChainRpc for MockChain {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.request()?;
        Ok(self.chain_id)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, ChainError> {
        self.request()?;
        Ok(self.nonce_of(address))
    }

    async fn gas_price(&self) -> Result<u128, ChainError> {
        self.request()?;
        Ok(1_000_000_000)
    }

    async fn estimate_gas(&self, request: &TransactionRequest) -> Result<u64, ChainError> {
        self.request()?;
        let base = if request.is_create() { 53_000 } else { 21_000 };
        Ok(base + 16 * request.input.len() as u64)
    }

    async fn send_raw_transaction(&self, raw: &Bytes) -> Result<B256, ChainError> {
        self.request()?;

        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| Self::rejected(&format!("invalid transaction: {}", e)))?;
        let signed = envelope
            .as_legacy()
            .ok_or_else(|| Self::rejected("only legacy transactions are accepted"))?;
        let tx = signed.tx();
        let sender = recover_address(&tx.signature_hash(), signed.signature())
            .map_err(|_| Self::rejected("invalid signature"))?;

        if tx.chain_id != Some(self.chain_id) {
            return Err(Self::rejected("invalid chain id"));
        }

        let mut state = self.state.lock().unwrap();
        let expected = state.nonces.get(&sender).copied().unwrap_or(0);
        if tx.nonce < expected {
            return Err(Self::rejected("nonce too low"));
        }
        if tx.nonce > expected {
            return Err(Self::rejected("nonce too high"));
        }

        let hash = *envelope.tx_hash();
        let (contract_address, status) = match tx.to {
            TxKind::Create => {
                let address = sender.create(tx.nonce);
                state.storage.insert(address, U256::ZERO);
                (Some(address), true)
            }
            TxKind::Call(to) => {
                let input = tx.input.as_ref();
                let stored = input.len() == 36 && input[..4] == STORE;
                match state.storage.get_mut(&to) {
                    Some(slot) if stored => {
                        *slot = U256::from_be_slice(&input[4..36]);
                        (None, true)
                    }
                    _ => (None, false),
                }
            }
        };

        state.nonces.insert(sender, expected + 1);
        state.block_number += 1;
        let block_number = state.block_number;
        state.receipts.insert(
            hash,
            TransactionReceipt {
                transaction_hash: hash,
                contract_address,
                block_number: Some(block_number),
                status,
            },
        );

        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        self.request()?;
        Ok(self.state.lock().unwrap().receipts.get(&hash).cloned())
    }

    async fn call(&self, request: &CallRequest) -> Result<Bytes, ChainError> {
        self.request()?;
        let state = self.state.lock().unwrap();
        match state.storage.get(&request.to) {
            Some(value) if request.input.as_ref() == RETRIEVE => {
                Ok(Bytes::from(value.to_be_bytes::<32>().to_vec()))
            }
            _ => Err(Self::rejected("execution reverted")),
        }
    }
}
