//! Drives the compiler adapter against a stand-in `solc` script

#![cfg(unix)]

use contract_deployer::cli::compile_contract;
use contract_deployer::contract::{CompilerError, SolcCompiler};
use contract_deployer::error::{DeployError, Stage};
use contract_deployer::DeployConfig;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const OUTPUT: &str = r#"{
  "contracts": {
    "SimpleStorage.sol": {
      "SimpleStorage": {
        "abi": [
          {"inputs":[],"name":"retrieve","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],"stateMutability":"view","type":"function"},
          {"inputs":[{"internalType":"uint256","name":"_favoriteNumber","type":"uint256"}],"name":"store","outputs":[],"stateMutability":"nonpayable","type":"function"}
        ],
        "evm": {"bytecode": {"object": "6080604052348015600f57600080fd5b50", "sourceMap": "25:1:0:-:0"}}
      }
    }
  },
  "errors": [{"component": "general", "type": "Warning", "severity": "warning", "message": "SPDX license identifier not provided"}],
  "sources": {"SimpleStorage.sol": {"id": 0}}
}"#;

fn fake_solc(dir: &Path, version: &str) -> PathBuf {
    let path = dir.join(format!("solc-{}", version));
    let script = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"--version\" ]; then\n\
         echo 'solc, the solidity compiler commandline interface'\n\
         echo 'Version: {}+commit.26b70077.Linux.g++'\n\
         exit 0\n\
         fi\n\
         cat > /dev/null\n\
         cat <<'JSON'\n{}\nJSON\n",
        version, OUTPUT
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// One test so no other thread can hold a script open for writing while it runs
#[test]
fn test_compile_with_external_solc() {
    let temp_dir = tempfile::tempdir().unwrap();
    let source_path = temp_dir.path().join("SimpleStorage.sol");
    fs::copy("SimpleStorage.sol", &source_path).unwrap();

    let solc = fake_solc(temp_dir.path(), "0.6.0");
    let config = DeployConfig {
        source_path: source_path.clone(),
        solc_path: Some(solc.clone()),
        output_path: temp_dir.path().join("build").join("compiled_code.json"),
        ..Default::default()
    };

    // Writes the full output and extracts the artifact
    let artifact = compile_contract(&config).unwrap();
    assert_eq!(artifact.contract_name, "SimpleStorage");
    assert_eq!(
        artifact.function_signatures(),
        vec!["retrieve()", "store(uint256)"]
    );
    let written: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config.output_path).unwrap()).unwrap();
    assert_eq!(
        written["contracts"]["SimpleStorage.sol"]["SimpleStorage"]["evm"]["bytecode"]["sourceMap"],
        "25:1:0:-:0"
    );

    // Same source and compiler, same artifact
    let again = compile_contract(&config).unwrap();
    assert_eq!(again, artifact);

    // A compiler of another version is refused
    let newer = fake_solc(temp_dir.path(), "0.8.24");
    match SolcCompiler::resolve("0.6.0", Some(&newer)) {
        Err(CompilerError::VersionMismatch { found, .. }) => assert_eq!(found, "0.8.24"),
        other => panic!("expected version mismatch, got {:?}", other),
    }

    // Missing source
    let missing = DeployConfig {
        source_path: temp_dir.path().join("Missing.sol"),
        ..config
    };
    let err = compile_contract(&missing).unwrap_err();
    assert!(matches!(err, DeployError::Source(_)));
    assert_eq!(err.stage(), Stage::LoadSource);
}
