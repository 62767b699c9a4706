use {
    alloy::{primitives::Address, signers::local::PrivateKeySigner},
    std::{path::PathBuf, time::Duration},
    tracing::level_filters::LevelFilter,
    url::Url,
};

#[derive(clap::Parser)]
pub struct Arguments {
    #[clap(long, env, default_value = "warn,deployer=info,solc=info,observe=info")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    /// Emit log events as JSON lines.
    #[clap(long, env)]
    pub log_json: bool,

    /// JSON-RPC endpoint of the node to deploy to.
    #[clap(long, env)]
    pub endpoint_uri: Url,

    /// Address sending the transactions. Must be controlled by the private
    /// key.
    #[clap(long, env)]
    pub my_address: Address,

    /// Hex encoded private key signing the transactions.
    #[clap(long, env)]
    pub private_key: PrivateKeySigner,

    /// Chain id to sign for. Queried from the node when omitted.
    #[clap(long, env)]
    pub chain_id: Option<u64>,

    #[clap(long, env, default_value = "./contracts/SimpleStorage.sol")]
    pub contract_source: PathBuf,

    #[clap(long, env, default_value = "SimpleStorage")]
    pub contract_name: String,

    /// Previously written compiler output to deploy from instead of
    /// compiling the contract source.
    #[clap(long, env)]
    pub artifact: Option<PathBuf>,

    /// Where the full compiler output gets written.
    #[clap(long, env, default_value = "./compiled_sol.json")]
    pub compiled_output: PathBuf,

    #[clap(long, env, default_value = "0.8.0")]
    pub solc_version: String,

    /// Directory holding installed solc releases.
    #[clap(long, env, default_value = ".solc")]
    pub solc_dir: PathBuf,

    #[clap(long, env, default_value = "https://binaries.soliditylang.org")]
    pub solc_bin_url: String,

    /// Compile and deploy right after installing a missing compiler instead
    /// of stopping.
    #[clap(long, env)]
    pub continue_after_install: bool,

    /// Value passed to `store`, parsed according to its parameter type.
    #[clap(long, env, default_value = "10")]
    pub store_value: String,

    /// How long to wait for a transaction receipt.
    #[clap(long, env, default_value = "2m", value_parser = humantime::parse_duration)]
    pub confirmation_timeout: Duration,

    /// Delay between two receipt lookups.
    #[clap(long, env, default_value = "100ms", value_parser = humantime::parse_duration)]
    pub confirmation_poll_interval: Duration,
}

impl std::fmt::Display for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            log_json,
            endpoint_uri,
            my_address,
            private_key: _,
            chain_id,
            contract_source,
            contract_name,
            artifact,
            compiled_output,
            solc_version,
            solc_dir,
            solc_bin_url,
            continue_after_install,
            store_value,
            confirmation_timeout,
            confirmation_poll_interval,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        writeln!(f, "log_json: {log_json}")?;
        writeln!(f, "endpoint_uri: {endpoint_uri}")?;
        writeln!(f, "my_address: {my_address}")?;
        writeln!(f, "private_key: SECRET")?;
        writeln!(f, "chain_id: {chain_id:?}")?;
        writeln!(f, "contract_source: {contract_source:?}")?;
        writeln!(f, "contract_name: {contract_name}")?;
        writeln!(f, "artifact: {artifact:?}")?;
        writeln!(f, "compiled_output: {compiled_output:?}")?;
        writeln!(f, "solc_version: {solc_version}")?;
        writeln!(f, "solc_dir: {solc_dir:?}")?;
        writeln!(f, "solc_bin_url: {solc_bin_url}")?;
        writeln!(f, "continue_after_install: {continue_after_install}")?;
        writeln!(f, "store_value: {store_value}")?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        writeln!(f, "confirmation_poll_interval: {confirmation_poll_interval:?}")?;
        Ok(())
    }
}
