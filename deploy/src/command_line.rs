use anyhow::Result;
use clap::Parser;
use ethers::types::H160;

use crate::{
    artifact::ArtifactStore,
    deploy::{Deploy, EthersNetwork},
};

#[derive(Debug, Parser)]
pub struct CommandLine {
    #[clap(short, long, env = "RPC_URL", default_value = "http://127.0.0.1:8545")]
    rpc: String,

    #[clap(long, env = "PRIVATE_KEY", hide_env_values = true)]
    sk: String,

    #[clap(short, long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    artifacts: String,

    #[clap(short, long, env = "CONTRACT_NAME", default_value = "Funding")]
    contract: String,

    #[clap(long, env = "CONFIRMATIONS", default_value_t = 1)]
    confirmations: usize,

    #[clap(long, env = "LEGACY_TX")]
    legacy: bool,
}

impl CommandLine {
    pub async fn execute(self) -> Result<H160> {
        let network =
            EthersNetwork::new(&self.rpc, &self.sk, self.confirmations, self.legacy).await?;
        let deploy = Deploy::new(network, ArtifactStore::new(&self.artifacts));
        deploy.run(&self.contract, &mut std::io::stdout()).await
    }
}
