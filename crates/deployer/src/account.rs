use {
    alloy::{
        eips::eip2718::Encodable2718,
        network::{Ethereum, EthereumWallet, TransactionBuilder},
        primitives::{Address, Bytes, TxHash},
        rpc::types::TransactionRequest,
        signers::local::PrivateKeySigner,
    },
    anyhow::{Context, Result, ensure},
};

/// A sender address together with the key controlling it. The key only lives
/// in memory.
pub struct Account {
    address: Address,
    wallet: EthereumWallet,
}

/// A transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// EIP-2718 encoded transaction.
    pub raw: Bytes,
    pub hash: TxHash,
}

impl Account {
    pub fn new(address: Address, signer: PrivateKeySigner) -> Result<Self> {
        ensure!(
            signer.address() == address,
            "private key controls {} but the configured address is {address}",
            signer.address()
        );
        Ok(Self {
            address,
            wallet: EthereumWallet::new(signer),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs a fully specified transaction (nonce, chain id, gas and fees
    /// must be set).
    pub async fn sign(&self, request: TransactionRequest) -> Result<SignedTransaction> {
        let request = request.with_from(self.address);
        let envelope = <TransactionRequest as TransactionBuilder<Ethereum>>::build(
            request,
            &self.wallet,
        )
        .await
        .context("failed to sign transaction")?;
        Ok(SignedTransaction {
            hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
