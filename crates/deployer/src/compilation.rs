//! Turns the contract source into compiler output, installing a missing
//! compiler once.

use {
    anyhow::{Context, Result},
    std::path::PathBuf,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Compile: Send + Sync {
    async fn compile(&self, input: &solc::Input) -> Result<solc::Output, solc::Error>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Install: Send + Sync {
    async fn install(&self, version: &str) -> Result<PathBuf>;
}

#[async_trait::async_trait]
impl Compile for solc::Compiler {
    async fn compile(&self, input: &solc::Input) -> Result<solc::Output, solc::Error> {
        solc::Compiler::compile(self, input).await
    }
}

#[async_trait::async_trait]
impl Install for solc::Installer {
    async fn install(&self, version: &str) -> Result<PathBuf> {
        solc::Installer::install(self, version).await
    }
}

/// Compiles the input. A missing compiler gets installed exactly once; after
/// that the output is `None` unless `continue_after_install` asks for a
/// second compilation attempt.
pub async fn compile(
    compiler: &dyn Compile,
    installer: &dyn Install,
    input: &solc::Input,
    continue_after_install: bool,
) -> Result<Option<solc::Output>> {
    match compiler.compile(input).await {
        Ok(output) => Ok(Some(output)),
        Err(solc::Error::NotInstalled { version, path }) => {
            tracing::info!(%version, ?path, "Solc Installing ...");
            installer
                .install(&version)
                .await
                .with_context(|| format!("failed to install solc {version}"))?;
            if !continue_after_install {
                tracing::info!(%version, "solc installed, run again to deploy");
                return Ok(None);
            }
            let output = compiler
                .compile(input)
                .await
                .context("compilation after installing solc failed")?;
            Ok(Some(output))
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, mockall::Sequence, serde_json::json};

    fn input() -> solc::Input {
        solc::Input::new("SimpleStorage.sol", "contract SimpleStorage {}".to_string())
    }

    fn not_installed() -> solc::Error {
        solc::Error::NotInstalled {
            version: "0.8.0".to_string(),
            path: PathBuf::from(".solc/solc-v0.8.0"),
        }
    }

    fn output() -> solc::Output {
        serde_json::from_value(json!({ "contracts": {} })).unwrap()
    }

    #[tokio::test]
    async fn installed_compiler_is_used_directly() {
        let mut compiler = MockCompile::new();
        compiler.expect_compile().times(1).returning(|_| Ok(output()));
        let mut installer = MockInstall::new();
        installer.expect_install().never();

        let result = compile(&compiler, &installer, &input(), false).await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn missing_compiler_is_installed_and_run_stops() {
        let mut compiler = MockCompile::new();
        compiler
            .expect_compile()
            .times(1)
            .returning(|_| Err(not_installed()));
        let mut installer = MockInstall::new();
        installer
            .expect_install()
            .times(1)
            .returning(|version| {
                assert_eq!(version, "0.8.0");
                Ok(PathBuf::from(".solc/solc-v0.8.0"))
            });

        let result = compile(&compiler, &installer, &input(), false).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn continues_after_install_when_asked() {
        let mut seq = Sequence::new();
        let mut compiler = MockCompile::new();
        compiler
            .expect_compile()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(not_installed()));
        compiler
            .expect_compile()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(output()));
        let mut installer = MockInstall::new();
        installer
            .expect_install()
            .times(1)
            .returning(|_| Ok(PathBuf::from(".solc/solc-v0.8.0")));

        let result = compile(&compiler, &installer, &input(), true).await.unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn installs_at_most_once() {
        let mut compiler = MockCompile::new();
        compiler
            .expect_compile()
            .times(2)
            .returning(|_| Err(not_installed()));
        let mut installer = MockInstall::new();
        installer
            .expect_install()
            .times(1)
            .returning(|_| Ok(PathBuf::from(".solc/solc-v0.8.0")));

        assert!(compile(&compiler, &installer, &input(), true).await.is_err());
    }

    #[tokio::test]
    async fn failed_install_is_an_error() {
        let mut compiler = MockCompile::new();
        compiler
            .expect_compile()
            .times(1)
            .returning(|_| Err(not_installed()));
        let mut installer = MockInstall::new();
        installer
            .expect_install()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("network unreachable")));

        assert!(compile(&compiler, &installer, &input(), true).await.is_err());
    }

    #[tokio::test]
    async fn compilation_errors_are_not_recovered() {
        let mut compiler = MockCompile::new();
        compiler
            .expect_compile()
            .times(1)
            .returning(|_| Err(solc::Error::Compilation(vec!["Expected ';'".to_string()])));
        let mut installer = MockInstall::new();
        installer.expect_install().never();

        let err = compile(&compiler, &installer, &input(), true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Expected ';'"));
    }
}
