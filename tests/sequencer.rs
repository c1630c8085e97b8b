mod common;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, U256};
use common::{client, dev_address, simple_storage, MockChain, CHAIN_ID, DEV_PRIVATE_KEY};
use contract_deployer::chain::{ChainError, TxParams};
use contract_deployer::deploy::{
    ContractHandle, DeploymentSequencer, DeploymentState, InteractionSequencer, Session,
    SessionPlan,
};
use contract_deployer::error::{DeployError, Stage, StageExt};
use contract_deployer::{DeployConfig, KeyPair};

fn plan() -> SessionPlan {
    SessionPlan::from_config(&DeployConfig::default())
}

fn uint(value: u64) -> Vec<DynSolValue> {
    vec![DynSolValue::Uint(U256::from(value), 256)]
}

#[tokio::test]
async fn test_getter_before_and_after_store() {
    let client = client(MockChain::new());
    let artifact = simple_storage();

    let report = Session::new(&client, plan())
        .run(&artifact, DEV_PRIVATE_KEY)
        .await
        .unwrap();

    assert_eq!(report.interaction.before, uint(0));
    assert_eq!(report.interaction.after, uint(15));
    assert!(report.interaction.receipt.status);
    assert_eq!(report.deployment.nonce, 0);
    assert_eq!(report.deployment.deployer, dev_address());
    assert_eq!(report.deployment.address, dev_address().create(0));
    assert_eq!(client.rpc().nonce_of(dev_address()), 2);
}

#[tokio::test]
async fn test_redeploy_gives_new_address() {
    let client = client(MockChain::new());
    let artifact = simple_storage();
    let session = Session::new(&client, plan());

    let first = session.deploy(&artifact, DEV_PRIVATE_KEY).await.unwrap();
    let second = session.deploy(&artifact, DEV_PRIVATE_KEY).await.unwrap();

    assert_ne!(first.address, second.address);
    assert_eq!((first.nonce, second.nonce), (0, 1));
}

#[tokio::test]
async fn test_stale_nonce_rejected() {
    let client = client(MockChain::new());
    let key = KeyPair::from_private_key_hex(DEV_PRIVATE_KEY).unwrap();
    let params = |nonce| TxParams {
        from: key.address(),
        gas_price: 1_000_000_000,
        chain_id: CHAIN_ID,
        nonce,
    };
    let code = Bytes::from(vec![0x60, 0x80]);

    let request = client
        .build_transaction(None, code.clone(), params(0))
        .await
        .unwrap();
    let signed = client.sign(&request, &key).unwrap();
    client.broadcast(&signed).await.unwrap();

    // Same nonce again, different payload
    let request = client
        .build_transaction(None, Bytes::from(vec![0x60, 0x40]), params(0))
        .await
        .unwrap();
    let signed = client.sign(&request, &key).unwrap();
    let err = client.broadcast(&signed).await.at(Stage::Broadcast).unwrap_err();

    match &err {
        DeployError::Rpc { stage, message, .. } => {
            assert_eq!(*stage, Stage::Broadcast);
            assert!(message.contains("nonce too low"));
        }
        other => panic!("expected node rejection, got {:?}", other),
    }
    assert!(!err.is_retryable());

    // The correct next nonce goes through
    let next = client.get_nonce(key.address()).await.unwrap();
    assert_eq!(next, 1);
    let request = client.build_transaction(None, code, params(next)).await.unwrap();
    let signed = client.sign(&request, &key).unwrap();
    assert!(client.broadcast(&signed).await.is_ok());
}

#[tokio::test]
async fn test_invalid_key_fails_before_network() {
    let artifact = simple_storage();

    for bad_key in ["", "0x", "not-a-key", "0x1234"] {
        let client = client(MockChain::new());
        let err = Session::new(&client, plan())
            .run(&artifact, bad_key)
            .await
            .unwrap_err();

        assert!(matches!(err, DeployError::Signing { .. }), "{}", bad_key);
        assert_eq!(err.stage(), Stage::Sign);
        assert_eq!(client.rpc().requests(), 0);
    }
}

#[tokio::test]
async fn test_sender_mismatch_fails_before_network() {
    let client = client(MockChain::new());
    let plan = SessionPlan {
        expected_sender: Some(Address::from([0x11; 20])),
        ..plan()
    };

    let err = Session::new(&client, plan)
        .run(&simple_storage(), DEV_PRIVATE_KEY)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Sign);
    assert_eq!(client.rpc().requests(), 0);
}

#[tokio::test]
async fn test_chain_id_mismatch() {
    let client = client(MockChain::new());
    let plan = SessionPlan {
        expected_chain_id: Some(4),
        ..plan()
    };

    let err = Session::new(&client, plan)
        .run(&simple_storage(), DEV_PRIVATE_KEY)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Config { .. }));
    assert_eq!(client.rpc().nonce_of(dev_address()), 0);
}

#[tokio::test]
async fn test_unreachable_node_is_retryable() {
    let client = client(MockChain::unreachable());

    let err = Session::new(&client, plan())
        .run(&simple_storage(), DEV_PRIVATE_KEY)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Network { .. }));
    assert_eq!(err.stage(), Stage::QueryChainId);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_deployment_states() {
    let client = client(MockChain::new());
    let key = KeyPair::from_private_key_hex(DEV_PRIVATE_KEY).unwrap();

    let mut sequencer = DeploymentSequencer::new(&client, CHAIN_ID);
    assert_eq!(sequencer.state(), DeploymentState::NotStarted);
    sequencer.deploy(&simple_storage(), &[], &key).await.unwrap();
    assert_eq!(sequencer.state(), DeploymentState::Confirmed);

    // The node refuses transactions signed for another chain
    let mut sequencer = DeploymentSequencer::new(&client, 1);
    let err = sequencer
        .deploy(&simple_storage(), &[], &key)
        .await
        .unwrap_err();
    assert_eq!(sequencer.state(), DeploymentState::Failed);
    assert_eq!(err.stage(), Stage::Broadcast);
    assert!(matches!(err, DeployError::Rpc { .. }));
}

#[tokio::test]
async fn test_constructor_args_rejected_without_constructor() {
    let client = client(MockChain::new());
    let key = KeyPair::from_private_key_hex(DEV_PRIVATE_KEY).unwrap();

    let mut sequencer = DeploymentSequencer::new(&client, CHAIN_ID);
    let err = sequencer
        .deploy(&simple_storage(), &["1".to_string()], &key)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Build);
    assert_eq!(sequencer.state(), DeploymentState::Failed);
    assert_eq!(client.rpc().requests(), 0);
}

#[tokio::test]
async fn test_reverted_transaction_is_error() {
    let client = client(MockChain::new());
    let key = KeyPair::from_private_key_hex(DEV_PRIVATE_KEY).unwrap();
    let artifact = simple_storage();

    let deployment = DeploymentSequencer::new(&client, CHAIN_ID)
        .deploy(&artifact, &[], &key)
        .await
        .unwrap();
    let contract = ContractHandle::new(deployment.address, artifact.abi.clone());
    let interaction = InteractionSequencer::new(&client, CHAIN_ID, &contract);

    // The contract only changes state through store()
    let err = interaction.transact("retrieve", &[], &key).await.unwrap_err();
    match err {
        DeployError::Chain { stage, cause } => {
            assert_eq!(stage, Stage::AwaitReceipt);
            assert!(matches!(cause, ChainError::Reverted(_)));
        }
        other => panic!("expected revert, got {:?}", other),
    }

    // Each transaction queried its own nonce
    interaction
        .transact("store", &["7".to_string()], &key)
        .await
        .unwrap();
    assert_eq!(interaction.read("retrieve", &[]).await.unwrap(), uint(7));
    assert_eq!(client.rpc().nonce_of(key.address()), 3);
}

#[tokio::test]
async fn test_bad_setter_argument() {
    let client = client(MockChain::new());
    let plan = SessionPlan {
        setter_args: vec!["fifteen".to_string()],
        ..plan()
    };

    let err = Session::new(&client, plan)
        .run(&simple_storage(), DEV_PRIVATE_KEY)
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Stage::Build);
    assert!(matches!(
        err,
        DeployError::Chain {
            cause: ChainError::Abi(_),
            ..
        }
    ));
}
