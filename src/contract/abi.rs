//! ABI encoding and decoding for constructor and method calls
//!
//! Arguments arrive as strings (from the command line or configuration) and
//! are coerced against the parameter types declared in the ABI.

use alloy_dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi, Param};
use alloy_primitives::Bytes;
use thiserror::Error;

/// ABI errors
#[derive(Error, Debug)]
pub enum AbiError {
    #[error("Method not found in ABI: {0}")]
    UnknownMethod(String),
    #[error("{method} takes {expected} argument(s), got {actual}")]
    ArgumentCount {
        method: String,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid argument {index} for {method}: {reason}")]
    InvalidArgument {
        method: String,
        index: usize,
        reason: String,
    },
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Decoding error: {0}")]
    Decoding(String),
}

/// Calldata for a resolved ABI function
#[derive(Debug, Clone)]
pub struct EncodedCall {
    pub function: Function,
    pub data: Bytes,
}

impl EncodedCall {
    /// Decode data returned by this function
    pub fn decode_output(&self, data: &[u8]) -> Result<Vec<DynSolValue>, AbiError> {
        self.function
            .abi_decode_output(data)
            .map_err(|e| AbiError::Decoding(format!("{}: {}", self.function.signature(), e)))
    }

    /// Whether the function is declared `view` or `pure`
    pub fn is_read_only(&self) -> bool {
        use alloy_json_abi::StateMutability;
        matches!(
            self.function.state_mutability,
            StateMutability::View | StateMutability::Pure
        )
    }
}

/// Find a function by name (or full signature) that accepts `arity` arguments
pub fn find_function<'a>(
    abi: &'a JsonAbi,
    method: &str,
    arity: usize,
) -> Result<&'a Function, AbiError> {
    if method.contains('(') {
        return abi
            .functions()
            .find(|function| function.signature() == method)
            .ok_or_else(|| AbiError::UnknownMethod(method.to_string()));
    }

    let overloads = abi
        .function(method)
        .ok_or_else(|| AbiError::UnknownMethod(method.to_string()))?;

    match overloads.iter().find(|f| f.inputs.len() == arity) {
        Some(function) => Ok(function),
        None => Err(AbiError::ArgumentCount {
            method: method.to_string(),
            expected: overloads[0].inputs.len(),
            actual: arity,
        }),
    }
}

/// Encode a method call (selector + arguments)
pub fn encode_call(abi: &JsonAbi, method: &str, args: &[String]) -> Result<EncodedCall, AbiError> {
    let function = find_function(abi, method, args.len())?;
    let values = coerce_args(&function.name, &function.inputs, args)?;
    let data = function
        .abi_encode_input(&values)
        .map_err(|e| AbiError::Encoding(e.to_string()))?;

    Ok(EncodedCall {
        function: function.clone(),
        data: data.into(),
    })
}

/// Append ABI-encoded constructor arguments to init code
pub fn encode_constructor(
    abi: &JsonAbi,
    bytecode: &Bytes,
    args: &[String],
) -> Result<Bytes, AbiError> {
    let encoded_args = match abi.constructor() {
        Some(constructor) => {
            let values = coerce_args("constructor", &constructor.inputs, args)?;
            constructor
                .abi_encode_input(&values)
                .map_err(|e| AbiError::Encoding(e.to_string()))?
        }
        None if args.is_empty() => Vec::new(),
        None => {
            return Err(AbiError::ArgumentCount {
                method: "constructor".to_string(),
                expected: 0,
                actual: args.len(),
            })
        }
    };

    let mut code = Vec::with_capacity(bytecode.len() + encoded_args.len());
    code.extend_from_slice(bytecode);
    code.extend_from_slice(&encoded_args);
    Ok(code.into())
}

fn coerce_args(method: &str, params: &[Param], args: &[String]) -> Result<Vec<DynSolValue>, AbiError> {
    if params.len() != args.len() {
        return Err(AbiError::ArgumentCount {
            method: method.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }

    params
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, arg))| {
            let invalid = |reason: String| AbiError::InvalidArgument {
                method: method.to_string(),
                index,
                reason,
            };
            let ty = param.resolve().map_err(|e| invalid(e.to_string()))?;
            ty.coerce_str(arg.trim()).map_err(|e| invalid(e.to_string()))
        })
        .collect()
}

/// Split a comma-separated argument list
pub fn parse_args(args: Option<&str>) -> Vec<String> {
    args.map(|s| {
        s.split(',')
            .map(|arg| arg.trim().to_string())
            .filter(|arg| !arg.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Render a decoded value for display
pub fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Address(a) => a.to_checksum(None),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Bytes(b) => format!("0x{}", hex::encode(b)),
        DynSolValue::FixedBytes(word, size) => format!("0x{}", hex::encode(&word[..*size])),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            format!("[{}]", format_values(items))
        }
        DynSolValue::Tuple(items) => format!("({})", format_values(items)),
        other => format!("{:?}", other),
    }
}

/// Render several decoded values, comma separated
pub fn format_values(values: &[DynSolValue]) -> String {
    values
        .iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(", ")
}
