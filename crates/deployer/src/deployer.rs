use {
    crate::{
        account::Account,
        artifact::Artifact,
        node::{Node, Receipt, ReceiptError},
    },
    alloy::{
        dyn_abi::DynSolValue,
        network::TransactionBuilder,
        primitives::Address,
        rpc::types::TransactionRequest,
    },
    anyhow::{Context, Result},
};

const STORE: &str = "store";
const RETRIEVE: &str = "retrieve";

/// Result of a deploy-store-retrieve run.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub contract_address: Address,
    /// Value read right after deployment, before `store` ran.
    pub initial_value: DynSolValue,
    /// Value read after `store` was confirmed.
    pub final_value: DynSolValue,
}

pub struct Deployer<N> {
    node: N,
    account: Account,
    chain_id: Option<u64>,
}

impl<N: Node> Deployer<N> {
    /// `chain_id` overrides the id reported by the node.
    pub fn new(node: N, account: Account, chain_id: Option<u64>) -> Self {
        Self {
            node,
            account,
            chain_id,
        }
    }

    /// Deploys the contract, stores `store_value` in it and reads it back.
    pub async fn deploy_and_update(
        &self,
        artifact: &Artifact,
        store_value: &str,
    ) -> Result<Outcome> {
        let chain_id = match self.chain_id {
            Some(chain_id) => chain_id,
            None => self.node.chain_id().await?,
        };
        let nonce = self
            .node
            .transaction_count(self.account.address())
            .await
            .context("failed to fetch account nonce")?;

        tracing::info!(sender = %self.account.address(), nonce, chain_id, "Deploying contract...");
        let deployment = TransactionRequest::default().with_deploy_code(artifact.deploy_code()?);
        let receipt = self
            .submit(deployment, chain_id, nonce)
            .await
            .context("contract deployment failed")?;
        let contract_address = receipt
            .contract_address
            .context("deployment receipt carries no contract address")?;
        tracing::info!(%contract_address, tx = %receipt.transaction_hash, "Contract deployed!");

        let initial_value = self.retrieve(artifact, contract_address).await?;
        tracing::info!(value = ?initial_value, "stored value");

        tracing::info!(value = store_value, "Updating contract...");
        let store = TransactionRequest::default()
            .with_to(contract_address)
            .with_input(artifact.encode_call(STORE, &[store_value])?);
        // The node's transaction count may not include the deployment yet.
        let receipt = self
            .submit(store, chain_id, nonce + 1)
            .await
            .context("store transaction failed")?;
        tracing::info!(tx = %receipt.transaction_hash, "Contract Updated!");

        let final_value = self.retrieve(artifact, contract_address).await?;
        tracing::info!(value = ?final_value, "updated value");

        Ok(Outcome {
            contract_address,
            initial_value,
            final_value,
        })
    }

    async fn submit(
        &self,
        request: TransactionRequest,
        chain_id: u64,
        nonce: u64,
    ) -> Result<Receipt> {
        let request = request
            .with_from(self.account.address())
            .with_chain_id(chain_id)
            .with_nonce(nonce);
        let gas = self.node.estimate_gas(request.clone()).await?;
        let fees = self.node.estimate_fees().await?;
        let signed = self
            .account
            .sign(
                request
                    .with_gas_limit(gas)
                    .with_max_fee_per_gas(fees.max_fee_per_gas)
                    .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas),
            )
            .await?;

        tracing::debug!(hash = %signed.hash, nonce, gas, "sending transaction");
        let hash = self.node.send_raw_transaction(signed.raw).await?;
        let receipt = self.node.wait_for_receipt(hash).await?;
        if !receipt.status {
            return Err(ReceiptError::Reverted(hash).into());
        }
        tracing::debug!(%hash, block = ?receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }

    async fn retrieve(&self, artifact: &Artifact, contract: Address) -> Result<DynSolValue> {
        let request = TransactionRequest::default()
            .with_from(self.account.address())
            .with_to(contract)
            .with_input(artifact.encode_call(RETRIEVE, &[])?);
        let output = self
            .node
            .call(request)
            .await
            .context("failed to read stored value")?;
        artifact.decode_output(RETRIEVE, 0, &output)
    }
}
