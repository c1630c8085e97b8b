//! Calls and transactions against a deployed contract

use crate::chain::{ChainClient, ChainError, ChainRpc, TransactionReceipt};
use crate::crypto::KeyPair;
use crate::deploy::fresh_params;
use crate::error::{DeployError, Stage, StageExt};
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Address;

/// Address and interface of a deployed contract
#[derive(Debug, Clone)]
pub struct ContractHandle {
    pub address: Address,
    pub abi: JsonAbi,
}

impl ContractHandle {
    pub fn new(address: Address, abi: JsonAbi) -> Self {
        Self { address, abi }
    }
}

/// Getter values around one state-changing transaction
#[derive(Debug, Clone)]
pub struct InteractionReport {
    pub before: Vec<DynSolValue>,
    pub after: Vec<DynSolValue>,
    pub receipt: TransactionReceipt,
}

pub struct InteractionSequencer<'a, R: ChainRpc> {
    client: &'a ChainClient<R>,
    chain_id: u64,
    contract: &'a ContractHandle,
}

impl<'a, R: ChainRpc> InteractionSequencer<'a, R> {
    pub fn new(client: &'a ChainClient<R>, chain_id: u64, contract: &'a ContractHandle) -> Self {
        Self {
            client,
            chain_id,
            contract,
        }
    }

    /// Read-only call; never signs and never changes state
    pub async fn read(&self, method: &str, args: &[String]) -> Result<Vec<DynSolValue>, DeployError> {
        self.client
            .call(self.contract.address, &self.contract.abi, method, args)
            .await
            .at(Stage::Call)
    }

    /// Send `method(args)` as a transaction and wait for it to succeed.
    ///
    /// The nonce is queried from the node for this transaction alone.
    pub async fn transact(
        &self,
        method: &str,
        args: &[String],
        key: &KeyPair,
    ) -> Result<TransactionReceipt, DeployError> {
        let params = fresh_params(self.client, key.address(), self.chain_id).await?;
        let request = self
            .client
            .build_call(self.contract.address, &self.contract.abi, method, args, params)
            .await
            .at(Stage::Build)?;
        let signed = self.client.sign(&request, key).at(Stage::Sign)?;
        let hash = self.client.broadcast(&signed).await.at(Stage::Broadcast)?;

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

        log::info!("{} confirmed in {}", method, hash);
        Ok(receipt)
    }

    /// Read the getter, send the setter, read the getter again
    pub async fn read_write_read(
        &self,
        getter: &str,
        setter: &str,
        setter_args: &[String],
        key: &KeyPair,
    ) -> Result<InteractionReport, DeployError> {
        let before = self.read(getter, &[]).await?;
        let receipt = self.transact(setter, setter_args, key).await?;
        let after = self.read(getter, &[]).await?;

        Ok(InteractionReport {
            before,
            after,
            receipt,
        })
    }
}
