//! ECDSA key management for transaction signing
//!
//! Provides key pair handling, recoverable signing, and Ethereum address
//! derivation using the secp256k1 elliptic curve.

use alloy_primitives::{keccak256, Address, Signature, B256, U256};
use rand::rngs::OsRng;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Private key is empty")]
    EmptyPrivateKey,
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// A key pair consisting of a private key and its corresponding public key.
///
/// The secret is overwritten when the key pair is dropped, so callers should
/// keep a `KeyPair` alive only for as long as they need to sign.
pub struct KeyPair {
    secret_key: SecretKey,
    pub public_key: PublicKey,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
        }
    }

    /// Create a key pair from a hex-encoded private key, with or without `0x`
    pub fn from_private_key_hex(hex_key: &str) -> Result<Self, KeyError> {
        let trimmed = hex_key.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() {
            return Err(KeyError::EmptyPrivateKey);
        }

        let bytes = hex::decode(digits).map_err(|_| KeyError::InvalidPrivateKey)?;
        if bytes.len() != 32 {
            return Err(KeyError::InvalidPrivateKey);
        }
        let secret_key =
            SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key))
    }

    /// Get the private key as a `0x`-prefixed hex string
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.secret_key.secret_bytes()))
    }

    /// Get the public key as a hex string (uncompressed format)
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key.serialize_uncompressed())
    }

    /// Ethereum address of this key pair
    pub fn address(&self) -> Address {
        public_key_to_address(&self.public_key)
    }

    /// Sign a 32-byte digest, returning a signature with its recovery parity
    pub fn sign_hash(&self, hash: &B256) -> Result<Signature, KeyError> {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest_slice(hash.as_slice())?;
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret_key);
        Ok(to_eth_signature(&signature))
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.secret_key.non_secure_erase();
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Convert a public key to an Ethereum address: the last 20 bytes of
/// keccak256 over the uncompressed key without its `0x04` tag.
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    Address::from_slice(&hash[12..])
}

/// Recover the signing address from a digest and signature
pub fn recover_address(hash: &B256, signature: &Signature) -> Result<Address, KeyError> {
    let recovery_id = RecoveryId::from_i32(signature.v() as i32)?;

    let mut compact = [0u8; 64];
    compact[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
    compact[32..].copy_from_slice(&signature.s().to_be_bytes::<32>());
    let signature = RecoverableSignature::from_compact(&compact, recovery_id)
        .map_err(|_| KeyError::InvalidSignature)?;

    let message = Message::from_digest_slice(hash.as_slice())?;
    let public_key = Secp256k1::verification_only().recover_ecdsa(&message, &signature)?;
    Ok(public_key_to_address(&public_key))
}

fn to_eth_signature(signature: &RecoverableSignature) -> Signature {
    let (recovery_id, compact) = signature.serialize_compact();
    Signature::new(
        U256::from_be_slice(&compact[..32]),
        U256::from_be_slice(&compact[32..]),
        recovery_id.to_i32() == 1,
    )
}
