//! Contract deployment
//!
//! Drives one creation transaction through nonce lookup, build, sign,
//! broadcast and confirmation, tracking where it got to.

use crate::chain::{ChainClient, ChainError, ChainRpc, TransactionReceipt};
use crate::contract::CompiledArtifact;
use crate::crypto::KeyPair;
use crate::deploy::fresh_params;
use crate::error::{DeployError, Stage, StageExt};
use alloy_primitives::{Address, B256};
use std::fmt;

/// Progress of a deployment. Moves forward only; any failure ends in `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentState {
    NotStarted,
    Compiled,
    Built,
    Signed,
    Broadcast,
    Confirmed,
    Failed,
}

impl fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A confirmed contract creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub address: Address,
    pub receipt: TransactionReceipt,
    pub nonce: u64,
    pub chain_id: u64,
    pub deployer: Address,
}

impl Deployment {
    pub fn transaction_hash(&self) -> B256 {
        self.receipt.transaction_hash
    }
}

/// Deploys compiled artifacts through a [`ChainClient`]
pub struct DeploymentSequencer<'a, R: ChainRpc> {
    client: &'a ChainClient<R>,
    chain_id: u64,
    state: DeploymentState,
}

impl<'a, R: ChainRpc> DeploymentSequencer<'a, R> {
    pub fn new(client: &'a ChainClient<R>, chain_id: u64) -> Self {
        Self {
            client,
            chain_id,
            state: DeploymentState::NotStarted,
        }
    }

    pub fn state(&self) -> DeploymentState {
        self.state
    }

    /// Deploy `artifact`, signing with `key`.
    ///
    /// Nothing is undone on failure: a transaction that was broadcast stays
    /// broadcast.
    pub async fn deploy(
        &mut self,
        artifact: &CompiledArtifact,
        constructor_args: &[String],
        key: &KeyPair,
    ) -> Result<Deployment, DeployError> {
        self.state = DeploymentState::Compiled;

        let result = self.run(artifact, constructor_args, key).await;
        match result {
            Ok(deployment) => Ok(deployment),
            Err(e) => {
                log::error!(
                    "Deployment of {} failed after {}: {}",
                    artifact.contract_name,
                    self.state,
                    e
                );
                self.state = DeploymentState::Failed;
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        artifact: &CompiledArtifact,
        constructor_args: &[String],
        key: &KeyPair,
    ) -> Result<Deployment, DeployError> {
        let init_code = artifact
            .deploy_code(constructor_args)
            .map_err(|e| DeployError::chain(Stage::Build, e.into()))?;

        let params = fresh_params(self.client, key.address(), self.chain_id).await?;
        let request = self
            .client
            .build_transaction(None, init_code, params)
            .await
            .at(Stage::Build)?;
        self.advance(DeploymentState::Built);

        let signed = self.client.sign(&request, key).at(Stage::Sign)?;
        self.advance(DeploymentState::Signed);

        let hash = self.client.broadcast(&signed).await.at(Stage::Broadcast)?;
        self.advance(DeploymentState::Broadcast);

        let receipt = self
            .client
            .await_receipt(hash)
            .await
            .at(Stage::AwaitReceipt)?;
        if !receipt.status {
            return Err(DeployError::chain(
                Stage::AwaitReceipt,
                ChainError::Reverted(hash),
            ));
        }
        let address = receipt
            .contract_address
            .ok_or(ChainError::MissingContractAddress(hash))
            .at(Stage::AwaitReceipt)?;
        self.advance(DeploymentState::Confirmed);

        log::info!(
            "Deployed {} at {} (nonce {})",
            artifact.contract_name,
            address,
            params.nonce
        );

        Ok(Deployment {
            address,
            receipt,
            nonce: params.nonce,
            chain_id: self.chain_id,
            deployer: params.from,
        })
    }

    fn advance(&mut self, next: DeploymentState) {
        log::debug!("Deployment {} -> {}", self.state, next);
        self.state = next;
    }
}
