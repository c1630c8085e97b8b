//! Cryptographic utilities for transaction signing
//!
//! This module provides:
//! - ECDSA key management (secp256k1) with Ethereum addresses
//! - EIP-155 legacy transaction signing

pub mod keys;
pub mod signer;

pub use keys::{public_key_to_address, recover_address, KeyError, KeyPair};
pub use signer::{sign_transaction, to_legacy, SigningError};
