pub mod account;
pub mod arguments;
pub mod artifact;
pub mod compilation;
pub mod deployer;
pub mod node;

use {
    account::Account,
    anyhow::{Context, Result},
    artifact::Artifact,
    compilation::{Compile, Install},
    deployer::{Deployer, Outcome},
    node::{Confirmation, Rpc},
    std::path::Path,
};

/// Compiles (or loads) the contract, deploys it, stores the configured value
/// and reads it back. Returns `None` when the run ended after installing the
/// compiler.
pub async fn run(args: arguments::Arguments) -> Result<Option<Outcome>> {
    let compiler = solc::Compiler::new(&args.solc_dir, &args.solc_version);
    let installer = solc::Installer::new(
        reqwest::Client::new(),
        &args.solc_bin_url,
        &args.solc_dir,
    );
    tracing::info!(version = compiler.version(), "using solc");
    run_with(args, &compiler, &installer).await
}

async fn run_with(
    args: arguments::Arguments,
    compiler: &dyn Compile,
    installer: &dyn Install,
) -> Result<Option<Outcome>> {
    let Some(artifact) = load_artifact(&args, compiler, installer).await? else {
        return Ok(None);
    };

    let account = Account::new(args.my_address, args.private_key)?;
    let node = Rpc::new(
        args.endpoint_uri,
        Confirmation {
            timeout: args.confirmation_timeout,
            poll_interval: args.confirmation_poll_interval,
        },
    );
    let deployer = Deployer::new(node, account, args.chain_id);
    let outcome = deployer
        .deploy_and_update(&artifact, &args.store_value)
        .await?;
    tracing::info!(
        contract = %outcome.contract_address,
        value = ?outcome.final_value,
        "Transaction completed!"
    );
    Ok(Some(outcome))
}

/// Loads the configured artifact, or compiles the contract source and writes
/// the full compiler output before extracting the contract from it.
async fn load_artifact(
    args: &arguments::Arguments,
    compiler: &dyn Compile,
    installer: &dyn Install,
) -> Result<Option<Artifact>> {
    let file_name = source_file_name(&args.contract_source)?;
    if let Some(path) = &args.artifact {
        tracing::info!(?path, "loading compiled contract");
        return Artifact::load(path, file_name, &args.contract_name)
            .await
            .map(Some);
    }

    let source = tokio::fs::read_to_string(&args.contract_source)
        .await
        .with_context(|| format!("failed to read {:?}", args.contract_source))?;
    let input = solc::Input::new(file_name, source);
    tracing::info!(?file_name, "compiling contract");
    let Some(output) =
        compilation::compile(compiler, installer, &input, args.continue_after_install).await?
    else {
        return Ok(None);
    };

    let json = serde_json::to_vec(&output).context("failed to serialize compiler output")?;
    tokio::fs::write(&args.compiled_output, json)
        .await
        .with_context(|| format!("failed to write {:?}", args.compiled_output))?;
    tracing::debug!(path = ?args.compiled_output, "wrote compiler output");

    Artifact::from_output(&output, file_name, &args.contract_name).map(Some)
}

fn source_file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{path:?} does not name a source file"))
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            artifact::tests::{simple_storage, simple_storage_abi},
            compilation::{MockCompile, MockInstall},
        },
        clap::Parser,
        serde_json::{Value, json},
        std::path::PathBuf,
    };

    const SOURCE: &str = "contract SimpleStorage {}";

    fn compiler_output() -> Value {
        json!({
            "contracts": {
                "SimpleStorage.sol": {
                    "SimpleStorage": {
                        "abi": simple_storage_abi(),
                        "evm": {
                            "bytecode": { "object": "6080604052", "sourceMap": "" }
                        },
                        "metadata": "{}"
                    }
                }
            },
            "sources": { "SimpleStorage.sol": { "id": 0 } }
        })
    }

    /// Arguments pointing every path into `dir`. The endpoint refuses
    /// connections, so any node access fails the run.
    fn arguments(dir: &Path, extra: &[&str]) -> arguments::Arguments {
        let source = dir.join("SimpleStorage.sol");
        std::fs::write(&source, SOURCE).unwrap();
        let compiled_output = dir.join("compiled_sol.json");
        let mut args = vec![
            "deployer".to_string(),
            "--endpoint-uri".to_string(),
            "http://127.0.0.1:1".to_string(),
            "--my-address".to_string(),
            account::tests::ADDRESS.to_string(),
            "--private-key".to_string(),
            account::tests::KEY.to_string(),
            "--contract-source".to_string(),
            source.to_str().unwrap().to_string(),
            "--compiled-output".to_string(),
            compiled_output.to_str().unwrap().to_string(),
        ];
        args.extend(extra.iter().map(|arg| arg.to_string()));
        arguments::Arguments::try_parse_from(args).unwrap()
    }

    fn not_installed() -> solc::Error {
        solc::Error::NotInstalled {
            version: "0.8.0".to_string(),
            path: PathBuf::from(".solc/solc-v0.8.0"),
        }
    }

    #[test]
    fn source_units_are_named_after_the_file() {
        assert_eq!(
            source_file_name(Path::new("./contracts/SimpleStorage.sol")).unwrap(),
            "SimpleStorage.sol"
        );
        assert!(source_file_name(Path::new("/")).is_err());
    }

    #[tokio::test]
    async fn writes_full_compiler_output() {
        let dir = tempfile::tempdir().unwrap();
        let args = arguments(dir.path(), &[]);
        let mut compiler = MockCompile::new();
        compiler.expect_compile().times(1).returning(|input| {
            let input = serde_json::to_value(input).unwrap();
            assert_eq!(input["sources"]["SimpleStorage.sol"]["content"], SOURCE);
            Ok(serde_json::from_value(compiler_output()).unwrap())
        });
        let mut installer = MockInstall::new();
        installer.expect_install().never();

        let artifact = load_artifact(&args, &compiler, &installer)
            .await
            .unwrap()
            .unwrap();

        let written: Value =
            serde_json::from_slice(&std::fs::read(&args.compiled_output).unwrap()).unwrap();
        assert_eq!(written, compiler_output());
        assert_eq!(artifact.bytecode, simple_storage().bytecode);
    }

    #[tokio::test]
    async fn prebuilt_artifact_skips_compilation() {
        let dir = tempfile::tempdir().unwrap();
        let prebuilt = dir.path().join("prebuilt.json");
        std::fs::write(&prebuilt, serde_json::to_vec(&compiler_output()).unwrap()).unwrap();
        let args = arguments(dir.path(), &["--artifact", prebuilt.to_str().unwrap()]);
        let mut compiler = MockCompile::new();
        compiler.expect_compile().never();
        let mut installer = MockInstall::new();
        installer.expect_install().never();

        let artifact = load_artifact(&args, &compiler, &installer)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(artifact.bytecode, simple_storage().bytecode);
        assert!(!args.compiled_output.exists());
    }

    #[tokio::test]
    async fn run_stops_after_installing_compiler() {
        let dir = tempfile::tempdir().unwrap();
        let args = arguments(dir.path(), &[]);
        let compiled_output = args.compiled_output.clone();
        let mut compiler = MockCompile::new();
        compiler
            .expect_compile()
            .times(1)
            .returning(|_| Err(not_installed()));
        let mut installer = MockInstall::new();
        installer
            .expect_install()
            .times(1)
            .returning(|_| Ok(PathBuf::from(".solc/solc-v0.8.0")));

        let outcome = run_with(args, &compiler, &installer).await.unwrap();

        assert!(outcome.is_none());
        assert!(!compiled_output.exists());
    }

    #[tokio::test]
    async fn unreachable_node_fails_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let args = arguments(dir.path(), &["--confirmation-timeout", "1s"]);
        let mut compiler = MockCompile::new();
        compiler
            .expect_compile()
            .returning(|_| Ok(serde_json::from_value(compiler_output()).unwrap()));
        let installer = MockInstall::new();

        assert!(run_with(args, &compiler, &installer).await.is_err());
    }
}
