use {
    crate::compiler::executable_path,
    anyhow::{Context, Result, bail, ensure},
    serde::Deserialize,
    sha2::{Digest, Sha256},
    std::{
        collections::BTreeMap,
        fmt::{self, Display, Formatter},
        path::{Path, PathBuf},
    },
};

/// Directory names of the official binary mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Linux,
    MacOs,
    Windows,
}

impl Platform {
    pub fn current() -> Result<Self> {
        match (std::env::consts::OS, std::env::consts::ARCH) {
            ("linux", "x86_64") => Ok(Self::Linux),
            // Apple silicon runs the amd64 builds through Rosetta.
            ("macos", "x86_64" | "aarch64") => Ok(Self::MacOs),
            ("windows", "x86_64") => Ok(Self::Windows),
            (os, arch) => bail!("no solc builds published for {os}-{arch}"),
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linux => "linux-amd64",
            Self::MacOs => "macosx-amd64",
            Self::Windows => "windows-amd64",
        })
    }
}

/// The `list.json` index published per platform.
#[derive(Debug, Deserialize)]
struct List {
    builds: Vec<Build>,
    /// Version => file name of the release build.
    releases: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Build {
    path: String,
    sha256: String,
}

impl List {
    fn release(&self, version: &str) -> Result<&Build> {
        let path = self
            .releases
            .get(version)
            .with_context(|| format!("solc {version} is not a published release"))?;
        self.builds
            .iter()
            .find(|build| &build.path == path)
            .with_context(|| format!("no build listed for {path}"))
    }
}

/// Downloads solc releases into a local directory.
#[derive(Debug, Clone)]
pub struct Installer {
    client: reqwest::Client,
    base_url: String,
    dir: PathBuf,
}

impl Installer {
    pub fn new(client: reqwest::Client, base_url: &str, dir: &Path) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            dir: dir.to_path_buf(),
        }
    }

    /// Installs the release for the host platform and returns the path of the
    /// executable.
    pub async fn install(&self, version: &str) -> Result<PathBuf> {
        let platform = Platform::current()?;
        let list_url = format!("{}/{platform}/list.json", self.base_url);
        tracing::debug!(%list_url, "fetching solc release list");
        let list: List = self
            .client
            .get(&list_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("failed to fetch {list_url}"))?
            .json()
            .await
            .context("malformed solc release list")?;
        let build = list.release(version)?;

        let binary_url = format!("{}/{platform}/{}", self.base_url, build.path);
        tracing::info!(%binary_url, "downloading solc");
        let binary = self
            .client
            .get(&binary_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("failed to fetch {binary_url}"))?
            .bytes()
            .await
            .context("failed to download solc")?;
        verify_checksum(&binary, &build.sha256)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("failed to create {:?}", self.dir))?;
        let destination = executable_path(&self.dir, version);
        tokio::fs::write(&destination, &binary)
            .await
            .with_context(|| format!("failed to write {destination:?}"))?;
        make_executable(&destination).await?;

        tracing::info!(?destination, %version, "installed solc");
        Ok(destination)
    }
}

fn verify_checksum(binary: &[u8], expected: &str) -> Result<()> {
    let expected = hex::decode(expected.trim_start_matches("0x"))
        .with_context(|| format!("invalid checksum {expected}"))?;
    let actual = Sha256::digest(binary);
    ensure!(
        actual[..] == expected[..],
        "checksum mismatch: expected 0x{}, got 0x{}",
        hex::encode(expected),
        hex::encode(actual)
    );
    Ok(())
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .with_context(|| format!("failed to mark {path:?} executable"))
}

#[cfg(not(unix))]
async fn make_executable(_: &Path) -> Result<()> {
    Ok(())
}
