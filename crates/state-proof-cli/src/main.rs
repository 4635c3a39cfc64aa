use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;
use eyre::{eyre, Result, WrapErr};
use proof_generator::{
    BlockSelector, EncodedBundle, HttpRpcClient, ProofLayout, ProofPipeline, ProofRequest,
    ProofTarget, RpcConfig, SlotKey,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Patricia Merkle Trie proof generating tool.
///
/// Prints the RLP-encoded block header and proof section for an account and
/// its storage slots at a verified block.
#[derive(Parser, Debug)]
#[command(name = "state-proof", version)]
struct Cli {
    /// URL of a full node RPC endpoint, e.g. http://localhost:8545
    #[arg(short, long, env = "ETH_RPC_URL")]
    rpc: String,

    /// Block number (decimal or 0x hex), `latest` or `earliest`
    #[arg(short, long, default_value = "latest")]
    block_number: BlockSelector,

    /// Account address
    #[arg(short, long)]
    address: String,

    /// Storage slot positions (decimal or 0x hex)
    #[arg(short, long, num_args = 0..)]
    slot_positions: Vec<SlotKey>,

    /// Another account to prove at the same block, as ADDRESS[:SLOT,SLOT...]
    #[arg(long = "extra-target")]
    extra_targets: Vec<ProofTarget>,

    /// Proof section layout: grouped, flat or accounts-first
    #[arg(long, default_value = "grouped")]
    layout: ProofLayout,

    /// Timeout for each RPC request, in seconds
    #[arg(long, env = "ETH_RPC_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

impl Cli {
    fn request(&self) -> Result<ProofRequest> {
        let mut targets = vec![ProofTarget::new(
            &self.address,
            self.slot_positions.clone(),
        )?];
        targets.extend(self.extra_targets.iter().cloned());
        Ok(ProofRequest::new(self.block_number, targets).with_layout(self.layout))
    }

    fn rpc_config(&self) -> RpcConfig {
        RpcConfig::new(&self.rpc).with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "state_proof_cli=info,proof_generator=info,block_header=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tokio::select! {
        result = run(&cli) => result,
        _ = tokio::signal::ctrl_c() => Err(eyre!("Interrupted before the proof was complete")),
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let request = cli.request()?;
    let client = HttpRpcClient::new(&cli.rpc_config())
        .wrap_err("Failed to build the RPC client")?;

    info!(
        block = %request.block,
        targets = request.targets.len(),
        layout = %request.layout,
        "Generating state proof"
    );
    let encoded = ProofPipeline::new(client)
        .run(&request)
        .await
        .wrap_err("Failed to generate the state proof")?;

    print!("{}", render(&encoded));
    Ok(())
}

fn render(encoded: &EncodedBundle) -> String {
    format!(
        "\nBlock number: {}\n\nHeader:\n\n{}\n\nProof:\n\n{}\n\n",
        encoded.block_number(),
        encoded.header_hex(),
        encoded.proofs_hex()
    )
}
