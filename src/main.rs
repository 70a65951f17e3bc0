//! Command-line front end: one task per invocation, one line of output

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use hashlock_tx::codec::{self, display_hash, parse_txid};
use hashlock_tx::script::{classify, to_asm};
use hashlock_tx::{BuilderConfig, HashLock, Network, OutPoint, Transaction, DEFAULT_FUNDING_TXID};
use log::{debug, LevelFilter};
use serde::Serialize;

#[derive(Parser, Debug)]
#[clap(name = "hashlock-tx", version, about = "Build hash-locked P2SH transactions")]
struct Cli {
    /// Network whose address and key prefixes are used
    #[clap(long, global = true, value_parser, default_value = "testnet")]
    network: Network,

    /// Increase log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    task: Task,
}

#[derive(Subcommand, Debug)]
enum Task {
    /// Print the hex redeem script locking to a preimage
    Redeem {
        #[clap(long)]
        preimage: String,
        /// Print opcodes instead of hex
        #[clap(long)]
        asm: bool,
    },
    /// Print the P2SH address of the redeem script
    Derive {
        #[clap(long)]
        preimage: String,
    },
    /// Build and sign a transaction funding the P2SH address
    Transaction {
        #[clap(long)]
        preimage: String,
        #[clap(long, value_parser)]
        amount: i64,
        /// Hex scalar or WIF
        #[clap(long)]
        private_key: String,
        #[clap(long, default_value = DEFAULT_FUNDING_TXID)]
        prev_txid: String,
        #[clap(long, value_parser, default_value_t = 0)]
        prev_index: u32,
        /// Hex locking script of the spent output, P2PKH of the key if omitted
        #[clap(long)]
        prev_script: Option<String>,
    },
    /// Build and sign a transaction spending the funded P2SH output
    Spending {
        #[clap(long)]
        preimage: String,
        /// Hex of the funding transaction
        #[clap(long)]
        funding_tx: String,
        #[clap(long)]
        dest: String,
        #[clap(long)]
        change: String,
        #[clap(long, value_parser)]
        change_amount: Option<i64>,
        #[clap(long, value_parser)]
        fee: Option<i64>,
        #[clap(long)]
        private_key: String,
    },
    /// Print a hex transaction as JSON
    Decode {
        #[clap(long)]
        tx: String,
    },
}

#[derive(Serialize)]
struct InputView {
    prev_txid: String,
    prev_index: u32,
    script_sig: String,
    script_sig_asm: String,
    sequence: u32,
}

#[derive(Serialize)]
struct OutputView {
    value: i64,
    script_pubkey: String,
    kind: String,
}

#[derive(Serialize)]
struct TransactionView {
    txid: String,
    size: usize,
    version: i32,
    inputs: Vec<InputView>,
    outputs: Vec<OutputView>,
    lock_time: u32,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            txid: codec::txid_hex(tx),
            size: codec::serialized_size(tx),
            version: tx.version,
            inputs: tx
                .inputs
                .iter()
                .map(|input| InputView {
                    prev_txid: display_hash(&input.prevout.hash),
                    prev_index: input.prevout.index,
                    script_sig: hex::encode(&input.script_sig),
                    script_sig_asm: to_asm(&input.script_sig),
                    sequence: input.sequence,
                })
                .collect(),
            outputs: tx
                .outputs
                .iter()
                .map(|output| OutputView {
                    value: output.value,
                    script_pubkey: hex::encode(&output.script_pubkey),
                    kind: format!("{:?}", classify(&output.script_pubkey)),
                })
                .collect(),
            lock_time: tx.lock_time,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<String> {
    let mut config = BuilderConfig::for_network(cli.network);

    match cli.task {
        Task::Redeem { preimage, asm } => {
            let redeem = HashLock::new(config).redeem_script(preimage.as_bytes());
            Ok(if asm {
                to_asm(redeem.as_bytes())
            } else {
                redeem.to_hex()
            })
        }
        Task::Derive { preimage } => {
            Ok(HashLock::new(config).derive_address(preimage.as_bytes()).to_string())
        }
        Task::Transaction {
            preimage,
            amount,
            private_key,
            prev_txid,
            prev_index,
            prev_script,
        } => {
            let prevout = OutPoint {
                hash: parse_txid(&prev_txid).context("invalid --prev-txid")?,
                index: prev_index,
            };
            let prev_script = prev_script
                .map(|s| codec::decode_hex(&s))
                .transpose()
                .context("invalid --prev-script")?;
            debug!("funding from {}:{}", prev_txid, prev_index);

            let tx = HashLock::new(config)
                .fund(
                    preimage.as_bytes(),
                    amount,
                    prevout,
                    prev_script.as_deref(),
                    &private_key,
                )
                .context("failed to build funding transaction")?;
            Ok(codec::to_hex(&tx))
        }
        Task::Spending {
            preimage,
            funding_tx,
            dest,
            change,
            change_amount,
            fee,
            private_key,
        } => {
            if let Some(fee) = fee {
                config.fee = fee;
            }
            let tx = HashLock::new(config)
                .spend(
                    preimage.as_bytes(),
                    &funding_tx,
                    &dest,
                    &change,
                    change_amount,
                    &private_key,
                )
                .context("failed to build spending transaction")?;
            Ok(codec::to_hex(&tx))
        }
        Task::Decode { tx } => {
            let tx = codec::from_hex(&tx).context("invalid transaction hex")?;
            serde_json::to_string(&TransactionView::from(&tx)).context("failed to render JSON")
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output = run(cli)?;
    println!("{}", output);
    Ok(())
}
