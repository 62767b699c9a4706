//! Compiled contract: creation bytecode plus the interface description used
//! to encode calls and decode their results.

use {
    alloy::{
        dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt, Specifier},
        json_abi::{Function, JsonAbi},
        primitives::{Bytes, hex},
    },
    anyhow::{Context, Result, ensure},
    std::path::Path,
};

#[derive(Debug, Clone)]
pub struct Artifact {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl Artifact {
    pub fn new(abi: serde_json::Value, bytecode: &str) -> Result<Self> {
        let abi: JsonAbi = serde_json::from_value(abi).context("malformed contract abi")?;
        let bytecode = Bytes::from(hex::decode(bytecode).context("malformed contract bytecode")?);
        ensure!(!bytecode.is_empty(), "contract has no bytecode");
        Ok(Self { abi, bytecode })
    }

    pub fn from_output(
        output: &solc::Output,
        file_name: &str,
        contract_name: &str,
    ) -> Result<Self> {
        let contract = output.contract(file_name, contract_name)?;
        Self::new(contract.abi, &contract.bytecode)
            .with_context(|| format!("invalid artifact for {contract_name}"))
    }

    /// Loads a compiler output previously written to disk.
    pub async fn load(path: &Path, file_name: &str, contract_name: &str) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read artifact {path:?}"))?;
        let output = solc::Output::from_slice(&bytes)?;
        Self::from_output(&output, file_name, contract_name)
    }

    /// Creation transaction input. Constructors taking arguments are not
    /// supported.
    pub fn deploy_code(&self) -> Result<Bytes> {
        if let Some(constructor) = &self.abi.constructor {
            ensure!(
                constructor.inputs.is_empty(),
                "constructor expects {} arguments",
                constructor.inputs.len()
            );
        }
        Ok(self.bytecode.clone())
    }

    /// Encodes a call to `name`, parsing every argument according to the
    /// declared parameter type.
    pub fn encode_call(&self, name: &str, args: &[&str]) -> Result<Bytes> {
        let function = self.function(name, args.len())?;
        let values = function
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| {
                let ty = param.resolve()?;
                ty.coerce_str(arg)
                    .with_context(|| format!("{arg:?} is not a valid {}", ty.sol_type_name()))
            })
            .collect::<Result<Vec<_>>>()?;
        let input = function
            .abi_encode_input(&values)
            .with_context(|| format!("failed to encode {name} call"))?;
        Ok(input.into())
    }

    /// Decodes the return data of `name`. Multiple return values are
    /// returned as a tuple.
    pub fn decode_output(&self, name: &str, arity: usize, data: &[u8]) -> Result<DynSolValue> {
        let function = self.function(name, arity)?;
        let mut values = function
            .abi_decode_output(data)
            .with_context(|| format!("failed to decode {name} result"))?;
        Ok(match values.len() {
            1 => values.remove(0),
            _ => DynSolValue::Tuple(values),
        })
    }

    fn function(&self, name: &str, arity: usize) -> Result<&Function> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arity))
            .with_context(|| format!("contract has no function {name} with {arity} arguments"))
    }
}
