//! Deployment and interaction sequencing
//!
//! Each transaction goes through the same cycle: fresh nonce and gas
//! price, build, sign, broadcast, wait for the receipt.

pub mod deployment;
pub mod interaction;
pub mod session;

pub use deployment::{Deployment, DeploymentSequencer, DeploymentState};
pub use interaction::{ContractHandle, InteractionReport, InteractionSequencer};
pub use session::{Session, SessionPlan, SessionReport};

use crate::chain::{ChainClient, ChainRpc, TxParams};
use crate::error::{DeployError, Stage, StageExt};
use alloy_primitives::Address;

/// Query the nonce and gas price for the next transaction from `from`
pub(crate) async fn fresh_params<R: ChainRpc>(
    client: &ChainClient<R>,
    from: Address,
    chain_id: u64,
) -> Result<TxParams, DeployError> {
    let nonce = client.get_nonce(from).await.at(Stage::QueryNonce)?;
    let gas_price = client.get_gas_price().await.at(Stage::QueryGasPrice)?;

    Ok(TxParams {
        from,
        gas_price,
        chain_id,
        nonce,
    })
}
