//! Everything the deployer needs from a network endpoint.

use {
    alloy::{
        network::ReceiptResponse,
        primitives::{Address, Bytes, TxHash},
        providers::{
            DynProvider,
            PendingTransactionBuilder,
            PendingTransactionError,
            Provider,
            ProviderBuilder,
            WatchTxError,
        },
        rpc::{client::ClientBuilder, types::TransactionRequest},
    },
    anyhow::{Context, Result},
    std::time::Duration,
    url::Url,
};

/// A confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub block_number: Option<u64>,
    /// Set for contract creations.
    pub contract_address: Option<Address>,
    /// Whether the transaction executed successfully.
    pub status: bool,
}

/// EIP-1559 fee parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fees {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("transaction {hash} not confirmed within {timeout:?}")]
    Timeout { hash: TxHash, timeout: Duration },
    #[error("transaction {0} reverted")]
    Reverted(TxHash),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Node: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    /// Number of transactions the account sent that the node has seen mined.
    async fn transaction_count(&self, address: Address) -> Result<u64>;

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64>;

    async fn estimate_fees(&self) -> Result<Fees>;

    /// Submits a signed transaction and returns its hash.
    async fn send_raw_transaction(&self, transaction: Bytes) -> Result<TxHash>;

    /// Blocks until the transaction is mined.
    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt>;

    /// Executes a read-only call against the latest block.
    async fn call(&self, request: TransactionRequest) -> Result<Bytes>;
}

/// How receipts are awaited.
#[derive(Debug, Clone, Copy)]
pub struct Confirmation {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

/// [`Node`] backed by a JSON-RPC endpoint.
pub struct Rpc {
    provider: DynProvider,
    confirmation: Confirmation,
}

impl Rpc {
    pub fn new(url: Url, confirmation: Confirmation) -> Self {
        let client = ClientBuilder::default()
            .http(url)
            .with_poll_interval(confirmation.poll_interval);
        let provider = ProviderBuilder::new().connect_client(client).erased();
        Self::with_provider(provider, confirmation)
    }

    pub fn with_provider(provider: DynProvider, confirmation: Confirmation) -> Self {
        Self {
            provider,
            confirmation,
        }
    }
}

#[async_trait::async_trait]
impl Node for Rpc {
    async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .context("eth_chainId failed")
    }

    async fn transaction_count(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .context("eth_getTransactionCount failed")
    }

    async fn estimate_gas(&self, request: TransactionRequest) -> Result<u64> {
        self.provider
            .estimate_gas(request)
            .await
            .context("eth_estimateGas failed")
    }

    async fn estimate_fees(&self) -> Result<Fees> {
        let estimate = self
            .provider
            .estimate_eip1559_fees()
            .await
            .context("fee estimation failed")?;
        Ok(Fees {
            max_fee_per_gas: estimate.max_fee_per_gas,
            max_priority_fee_per_gas: estimate.max_priority_fee_per_gas,
        })
    }

    async fn send_raw_transaction(&self, transaction: Bytes) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(&transaction)
            .await
            .context("eth_sendRawTransaction failed")?;
        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, hash: TxHash) -> Result<Receipt> {
        let timeout = self.confirmation.timeout;
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .with_timeout(Some(timeout))
            .get_receipt()
            .await
            .map_err(|err| receipt_error(hash, timeout, err))?;
        Ok(Receipt {
            transaction_hash: ReceiptResponse::transaction_hash(&receipt),
            block_number: ReceiptResponse::block_number(&receipt),
            contract_address: ReceiptResponse::contract_address(&receipt),
            status: ReceiptResponse::status(&receipt),
        })
    }

    async fn call(&self, request: TransactionRequest) -> Result<Bytes> {
        self.provider.call(request).await.context("eth_call failed")
    }
}

fn receipt_error(hash: TxHash, timeout: Duration, err: PendingTransactionError) -> anyhow::Error {
    match err {
        PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
            ReceiptError::Timeout { hash, timeout }.into()
        }
        err => anyhow::Error::new(err).context(format!("failed to await receipt of {hash}")),
    }
}
