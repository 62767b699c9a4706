//! The `solc --standard-json` input and output documents.

use {
    anyhow::{Context, Result},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    std::collections::BTreeMap,
};

#[derive(Debug, Clone, Serialize)]
pub struct Input {
    language: Language,
    sources: BTreeMap<String, Source>,
    settings: Settings,
}

#[derive(Debug, Clone, Copy, Serialize)]
enum Language {
    Solidity,
}

#[derive(Debug, Clone, Serialize)]
struct Source {
    content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    /// File name (or `*`) => contract name (or `*`) => requested outputs.
    output_selection: BTreeMap<String, BTreeMap<String, Vec<Flag>>>,
}

/// Compiler output requested for every contract.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
enum Flag {
    #[serde(rename = "abi")]
    Abi,
    #[serde(rename = "metadata")]
    Metadata,
    #[serde(rename = "evm.bytecode")]
    Bytecode,
    #[serde(rename = "evm.sourceMap")]
    SourceMap,
}

impl Input {
    /// Input compiling a single source file, selecting the interface
    /// description, metadata, creation bytecode and source map of every
    /// contract in it.
    pub fn new(file_name: &str, content: String) -> Self {
        let flags = vec![Flag::Abi, Flag::Metadata, Flag::Bytecode, Flag::SourceMap];
        Self {
            language: Language::Solidity,
            sources: BTreeMap::from([(file_name.to_string(), Source { content })]),
            settings: Settings {
                output_selection: BTreeMap::from([(
                    "*".to_string(),
                    BTreeMap::from([("*".to_string(), flags)]),
                )]),
            },
        }
    }
}

/// The full compiler output. Kept as raw JSON so it can be persisted for
/// inspection without losing any field the compiler produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Output(Value);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Diagnostic {
    severity: String,
    message: String,
    formatted_message: Option<String>,
}

/// The parts of a compiled contract needed to deploy and call it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledContract {
    /// The JSON interface description.
    pub abi: Value,
    /// Hex encoded creation bytecode.
    pub bytecode: String,
}

impl Output {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("malformed compiler output")
    }

    /// Messages of all diagnostics with `error` severity.
    pub fn errors(&self) -> Vec<String> {
        let Some(diagnostics) = self.0.get("errors") else {
            return Vec::new();
        };
        let diagnostics: Vec<Diagnostic> = match serde_json::from_value(diagnostics.clone()) {
            Ok(diagnostics) => diagnostics,
            Err(err) => return vec![format!("unreadable compiler diagnostics: {err}")],
        };
        diagnostics
            .into_iter()
            .filter(|diagnostic| diagnostic.severity == "error")
            .map(|diagnostic| diagnostic.formatted_message.unwrap_or(diagnostic.message))
            .collect()
    }

    pub fn contract(&self, file_name: &str, contract_name: &str) -> Result<CompiledContract> {
        let contract = self
            .0
            .get("contracts")
            .and_then(|contracts| contracts.get(file_name))
            .and_then(|file| file.get(contract_name))
            .with_context(|| format!("contract {file_name}:{contract_name} not in output"))?;
        let abi = contract
            .get("abi")
            .cloned()
            .context("contract output has no abi")?;
        let bytecode = contract
            .pointer("/evm/bytecode/object")
            .and_then(Value::as_str)
            .context("contract output has no bytecode")?
            .to_string();
        Ok(CompiledContract { abi, bytecode })
    }
}
