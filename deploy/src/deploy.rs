use std::{io::Write, sync::Arc};

use anyhow::Result;
use ethers::{
    contract::ContractFactory,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{H160, H256},
};

use crate::{
    artifact::{Artifact, ArtifactStore},
    utils::wallet_from_hex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deployment {
    pub address: H160,
    pub transaction_hash: H256,
}

/// Chain access needed by a deployment run.
#[allow(async_fn_in_trait)]
pub trait Network {
    async fn signer(&self) -> Result<H160>;

    async fn deploy(&self, artifact: &Artifact) -> Result<Deployment>;
}

pub struct EthersNetwork<M> {
    client: Arc<SignerMiddleware<M, LocalWallet>>,
    confirmations: usize,
    legacy: bool,
}

impl EthersNetwork<Provider<Http>> {
    pub async fn new(rpc: &str, sk: &str, confirmations: usize, legacy: bool) -> Result<Self> {
        let wallet = wallet_from_hex(sk)?;
        let provider = Provider::<Http>::try_from(rpc)?;
        let chain_id = provider.get_chainid().await?.as_u64();
        log::info!("connected to {} chain id:{}", rpc, chain_id);

        let client = Arc::new(SignerMiddleware::new(
            provider,
            wallet.with_chain_id(chain_id),
        ));

        Ok(Self::from_client(client, confirmations, legacy))
    }
}

impl<M: Middleware> EthersNetwork<M> {
    pub fn from_client(
        client: Arc<SignerMiddleware<M, LocalWallet>>,
        confirmations: usize,
        legacy: bool,
    ) -> Self {
        Self {
            client,
            confirmations,
            legacy,
        }
    }
}

impl<M: Middleware + 'static> Network for EthersNetwork<M> {
    async fn signer(&self) -> Result<H160> {
        let address = self.client.address();
        match self.client.get_balance(address, None).await {
            Ok(balance) => log::info!("deployer {:?} balance:{}", address, balance),
            Err(e) => log::warn!("deployer {:?} balance unavailable: {}", address, e),
        }
        Ok(address)
    }

    async fn deploy(&self, artifact: &Artifact) -> Result<Deployment> {
        let factory = ContractFactory::new(
            artifact.abi.clone(),
            artifact.bytecode.clone(),
            self.client.clone(),
        );
        let mut deployer = factory.deploy(())?.confirmations(self.confirmations);
        if self.legacy {
            deployer = deployer.legacy();
        }

        let (contract, receipt) = deployer.send_with_receipt().await?;
        log::info!(
            "transaction hash:{:?} block:{:?} gas used:{:?}",
            receipt.transaction_hash,
            receipt.block_number,
            receipt.gas_used
        );

        Ok(Deployment {
            address: contract.address(),
            transaction_hash: receipt.transaction_hash,
        })
    }
}

pub struct Deploy<N> {
    network: N,
    artifacts: ArtifactStore,
}

impl<N: Network> Deploy<N> {
    pub fn new(network: N, artifacts: ArtifactStore) -> Self {
        Self { network, artifacts }
    }

    pub async fn run(&self, contract_name: &str, out: &mut impl Write) -> Result<H160> {
        let deployer = self.network.signer().await?;
        writeln!(out, "Deploying contracts with account: {:?}", deployer)?;

        let artifact = self.artifacts.contract_factory(contract_name)?;
        let deployment = self.network.deploy(&artifact).await?;
        log::info!(
            "{} deployed in transaction {:?}",
            artifact.fully_qualified_name(),
            deployment.transaction_hash
        );

        writeln!(
            out,
            "{} contract address: {:?}",
            artifact.contract_name, deployment.address
        )?;
        Ok(deployment.address)
    }
}
