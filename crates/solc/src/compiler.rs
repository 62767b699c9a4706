use {
    crate::{Error, Input, Output},
    anyhow::{Context, anyhow},
    std::{
        path::{Path, PathBuf},
        process::Stdio,
    },
    tokio::{io::AsyncWriteExt, process::Command},
};

/// A specific solc release installed in a local directory.
#[derive(Debug, Clone)]
pub struct Compiler {
    version: String,
    executable: PathBuf,
}

impl Compiler {
    pub fn new(dir: &Path, version: &str) -> Self {
        Self {
            version: version.to_string(),
            executable: executable_path(dir, version),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Runs `solc --standard-json` on the input. Diagnostics with `error`
    /// severity fail the compilation even if solc exits successfully.
    pub async fn compile(&self, input: &Input) -> Result<Output, Error> {
        if !self.executable.is_file() {
            return Err(Error::NotInstalled {
                version: self.version.clone(),
                path: self.executable.clone(),
            });
        }

        let input_json = serde_json::to_vec(input).context("failed to serialize solc input")?;
        let mut process = Command::new(&self.executable)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {:?}", self.executable))?;

        let mut stdin = process.stdin.take().context("solc stdin unavailable")?;
        stdin
            .write_all(&input_json)
            .await
            .context("failed to write solc input")?;
        drop(stdin);

        let output = process
            .wait_with_output()
            .await
            .context("failed to wait for solc")?;
        if !output.status.success() {
            return Err(anyhow!(
                "solc exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )
            .into());
        }

        let output = Output::from_slice(&output.stdout)?;
        let errors = output.errors();
        if !errors.is_empty() {
            return Err(Error::Compilation(errors));
        }
        tracing::debug!(version = %self.version, "compiled sources");
        Ok(output)
    }
}

pub(crate) fn executable_path(dir: &Path, version: &str) -> PathBuf {
    let name = format!("solc-v{version}{}", std::env::consts::EXE_SUFFIX);
    dir.join(name)
}
