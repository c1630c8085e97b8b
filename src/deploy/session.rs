//! One full run: deploy, then read/write/read

use crate::chain::{ChainClient, ChainRpc, TransactionReceipt};
use crate::config::DeployConfig;
use crate::contract::CompiledArtifact;
use crate::crypto::{KeyPair, SigningError};
use crate::deploy::deployment::{Deployment, DeploymentSequencer};
use crate::deploy::interaction::{ContractHandle, InteractionReport, InteractionSequencer};
use crate::error::{DeployError, Stage, StageExt};
use alloy_primitives::Address;

/// What a session deploys and calls
#[derive(Debug, Clone)]
pub struct SessionPlan {
    pub constructor_args: Vec<String>,
    pub getter: String,
    pub setter: String,
    pub setter_args: Vec<String>,
    /// Checked against the key's address before anything is sent
    pub expected_sender: Option<Address>,
    /// Checked against the node's chain id
    pub expected_chain_id: Option<u64>,
}

impl SessionPlan {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            constructor_args: Vec::new(),
            getter: config.getter.clone(),
            setter: config.setter.clone(),
            setter_args: vec![config.store_value.clone()],
            expected_sender: config.sender,
            expected_chain_id: config.chain_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionReport {
    pub deployment: Deployment,
    pub interaction: InteractionReport,
}

/// Deployment followed by the getter/setter/getter interaction
pub struct Session<'a, R: ChainRpc> {
    client: &'a ChainClient<R>,
    plan: SessionPlan,
}

impl<'a, R: ChainRpc> Session<'a, R> {
    pub fn new(client: &'a ChainClient<R>, plan: SessionPlan) -> Self {
        Self { client, plan }
    }

    /// Run the session with the hex private key `private_key`.
    ///
    /// The key is parsed before any request reaches the node and is erased
    /// when this returns.
    pub async fn run(
        &self,
        artifact: &CompiledArtifact,
        private_key: &str,
    ) -> Result<SessionReport, DeployError> {
        let key = self.signer(private_key)?;
        let chain_id = self.resolve_chain_id().await?;

        let deployment = self.deploy_with(artifact, &key, chain_id).await?;

        let contract = ContractHandle::new(deployment.address, artifact.abi.clone());
        let interaction = InteractionSequencer::new(self.client, chain_id, &contract)
            .read_write_read(
                &self.plan.getter,
                &self.plan.setter,
                &self.plan.setter_args,
                &key,
            )
            .await?;

        Ok(SessionReport {
            deployment,
            interaction,
        })
    }

    /// Deploy only
    pub async fn deploy(
        &self,
        artifact: &CompiledArtifact,
        private_key: &str,
    ) -> Result<Deployment, DeployError> {
        let key = self.signer(private_key)?;
        let chain_id = self.resolve_chain_id().await?;
        self.deploy_with(artifact, &key, chain_id).await
    }

    /// Send one transaction to an already deployed contract
    pub async fn send(
        &self,
        contract: &ContractHandle,
        method: &str,
        args: &[String],
        private_key: &str,
    ) -> Result<TransactionReceipt, DeployError> {
        let key = self.signer(private_key)?;
        let chain_id = self.resolve_chain_id().await?;
        InteractionSequencer::new(self.client, chain_id, contract)
            .transact(method, args, &key)
            .await
    }

    async fn deploy_with(
        &self,
        artifact: &CompiledArtifact,
        key: &KeyPair,
        chain_id: u64,
    ) -> Result<Deployment, DeployError> {
        DeploymentSequencer::new(self.client, chain_id)
            .deploy(artifact, &self.plan.constructor_args, key)
            .await
    }

    fn signer(&self, private_key: &str) -> Result<KeyPair, DeployError> {
        let key = KeyPair::from_private_key_hex(private_key).map_err(DeployError::signing)?;
        self.check_sender(&key)?;
        Ok(key)
    }

    fn check_sender(&self, key: &KeyPair) -> Result<(), DeployError> {
        match self.plan.expected_sender {
            Some(expected) if expected != key.address() => {
                Err(DeployError::signing(SigningError::SenderMismatch {
                    request: expected,
                    key: key.address(),
                }))
            }
            _ => Ok(()),
        }
    }

    async fn resolve_chain_id(&self) -> Result<u64, DeployError> {
        let chain_id = self.client.chain_id().await.at(Stage::QueryChainId)?;
        match self.plan.expected_chain_id {
            Some(expected) if expected != chain_id => Err(DeployError::config(format!(
                "configured chain id {} but node reports {}",
                expected, chain_id
            ))),
            _ => {
                log::info!("Connected to chain {}", chain_id);
                Ok(chain_id)
            }
        }
    }
}
