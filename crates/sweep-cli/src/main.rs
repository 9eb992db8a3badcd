//! hlsweep - sell a spot asset into USDC, move it to perps, optionally
//! withdraw to a chain address.
//!
//! One invocation runs exactly one mode to completion or failure; there
//! is no state across runs. Re-running with the default "ALL available"
//! amounts finishes whatever a failed run left behind.

mod config;
mod logging;

use anyhow::Result;
use clap::Parser;
use rust_decimal::Decimal;
use sweep_exchange::{HttpExchange, RequestSigner};
use sweep_flow::{Mode, RunConfig, Runner, SettleWait};
use tracing::info;

/// Sell spot PURR to USDC, transfer USDC to perps, withdraw if needed.
#[derive(Parser, Debug)]
#[command(name = "hlsweep", version, about, long_about = None)]
struct Args {
    /// What to do this run.
    #[arg(long, value_enum)]
    mode: ArgMode,

    /// Amount of PURR to sell. Defaults to ALL available.
    #[arg(long = "purr-amount")]
    purr_amount: Option<Decimal>,

    /// Amount of USDC to transfer or withdraw. Defaults to ALL available
    /// minus a safety buffer.
    #[arg(long = "usdc-amount")]
    usdc_amount: Option<Decimal>,

    /// Price cushion for the IOC order (sell at reference * (1 - bps/1e4)).
    #[arg(long = "slippage-bps", default_value_t = 30)]
    slippage_bps: u32,

    /// Destination EVM address, required for --mode withdraw.
    #[arg(long)]
    dest: Option<String>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
#[value(rename_all = "snake_case")]
enum ArgMode {
    SellAndTransfer,
    TransferOnly,
    Withdraw,
}

impl From<ArgMode> for Mode {
    fn from(mode: ArgMode) -> Self {
        match mode {
            ArgMode::SellAndTransfer => Self::SellAndTransfer,
            ArgMode::TransferOnly => Self::TransferOnly,
            ArgMode::Withdraw => Self::Withdraw,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init()?;

    info!("Starting hlsweep v{}", env!("CARGO_PKG_VERSION"));

    let mode = Mode::from(args.mode);
    let cfg = config::Config::from_env(mode)?;
    info!(
        mode = %mode,
        api_url = %cfg.api_url,
        pair = %cfg.pair_name,
        "Configuration loaded"
    );

    let signer = RequestSigner::from_hex_key(
        &cfg.secret_key,
        cfg.network.is_mainnet(),
        cfg.signature_chain_id,
    )?;
    let exchange = HttpExchange::new(&cfg.api_url, cfg.account_address.clone(), signer)?;

    let run_cfg = RunConfig {
        mode,
        pair_name: cfg.pair_name,
        base_token: cfg.base_token,
        quote_token: cfg.quote_token,
        base_amount: args.purr_amount,
        quote_amount: args.usdc_amount,
        slippage_bps: args.slippage_bps,
        destination: args.dest,
        settle_wait: SettleWait::from_millis(cfg.settle_wait_ms),
        price_source: cfg.price_source,
    };

    let mut runner = Runner::new(exchange, run_cfg);
    runner.run().await?;

    info!("Run complete");
    Ok(())
}
