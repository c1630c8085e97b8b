//! Compiled contract artifact
//!
//! The two pieces of compiler output needed on chain: init bytecode and the
//! ABI describing the contract's functions.

use crate::contract::abi::{encode_constructor, AbiError};
use crate::contract::compiler::CompilerError;
use alloy_json_abi::JsonAbi;
use alloy_primitives::Bytes;
use serde_json::Value;

/// Bytecode and interface of a single compiled contract
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledArtifact {
    pub contract_name: String,
    pub bytecode: Bytes,
    pub abi: JsonAbi,
}

impl CompiledArtifact {
    /// Extract a contract from standard-JSON compiler output
    pub fn from_standard_output(
        output: &Value,
        file_name: &str,
        contract_name: &str,
    ) -> Result<Self, CompilerError> {
        let contract = output
            .get("contracts")
            .and_then(|contracts| contracts.get(file_name))
            .and_then(|file| file.get(contract_name))
            .ok_or_else(|| CompilerError::ContractNotFound {
                file: file_name.to_string(),
                contract: contract_name.to_string(),
            })?;

        let abi_value = contract
            .get("abi")
            .cloned()
            .ok_or_else(|| CompilerError::InvalidOutput(format!("{} has no abi", contract_name)))?;
        let abi: JsonAbi = serde_json::from_value(abi_value)?;

        let object = contract
            .pointer("/evm/bytecode/object")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CompilerError::InvalidOutput(format!("{} has no evm.bytecode.object", contract_name))
            })?;

        if object.is_empty() {
            return Err(CompilerError::EmptyBytecode(contract_name.to_string()));
        }
        // Library placeholders look like __$<hash>$__
        if object.contains("__") {
            return Err(CompilerError::UnlinkedLibraries(contract_name.to_string()));
        }

        let bytecode = hex::decode(object.trim_start_matches("0x")).map_err(|e| {
            CompilerError::InvalidOutput(format!("bytecode of {}: {}", contract_name, e))
        })?;

        Ok(Self {
            contract_name: contract_name.to_string(),
            bytecode: bytecode.into(),
            abi,
        })
    }

    /// Init code with ABI-encoded constructor arguments appended
    pub fn deploy_code(&self, constructor_args: &[String]) -> Result<Bytes, AbiError> {
        encode_constructor(&self.abi, &self.bytecode, constructor_args)
    }

    /// Human-readable function signatures, sorted by name
    pub fn function_signatures(&self) -> Vec<String> {
        self.abi.functions().map(|f| f.signature()).collect()
    }
}
