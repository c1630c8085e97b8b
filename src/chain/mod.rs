//! Node access: JSON-RPC backend, transaction types and the client the
//! sequencers drive

pub mod client;
pub mod rpc;
pub mod types;

pub use client::{ChainClient, DEFAULT_POLL_INTERVAL, GAS_HEADROOM_PERCENT};
pub use rpc::{redact_url, AlloyRpc, ChainError, ChainRpc};
pub use types::{CallRequest, SignedTransaction, TransactionReceipt, TransactionRequest, TxParams};
