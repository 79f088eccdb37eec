use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

mod cmd;

#[derive(Parser)]
#[command(name = "palletline")]
#[command(version, about = "End-of-line pallet scanning and inventory counting")]
pub struct Cli {
    /// Path to the workplace config (JSON). Uses the built-in config if omitted.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true, env = "PALLETLINE_DB")]
    pub database: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a box label onto the open pallet
    Scan {
        #[arg(short, long)]
        workplace: String,

        /// Operator id, repeatable
        #[arg(short, long = "operator")]
        operators: Vec<String>,

        code: String,
    },
    /// Inspect, label and close open pallets
    Pallet {
        #[command(subcommand)]
        command: PalletCommands,
    },
    /// Take a box off its open pallet for rework
    Rework {
        #[arg(short, long)]
        reason: String,

        #[arg(short, long = "operator")]
        operators: Vec<String>,

        batch: String,
    },
    /// Inventory cards and article master data
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
    /// Validate configuration files
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum PalletCommands {
    /// Fill level of the open pallet
    Status {
        #[arg(short, long)]
        workplace: String,
        #[arg(short, long)]
        article: String,
    },
    /// Boxes on the open pallet, newest first
    Boxes {
        #[arg(short, long)]
        workplace: String,
        #[arg(short, long)]
        article: String,
    },
    /// Mint a pallet label for the open pallet
    Label {
        #[arg(short, long)]
        workplace: String,
        #[arg(short, long)]
        article: String,
    },
    /// Close the open pallet by scanning its label
    Close {
        #[arg(short, long)]
        workplace: String,
        #[arg(short, long)]
        article: String,
        #[arg(short, long = "operator")]
        operators: Vec<String>,
        code: String,
    },
}

#[derive(Subcommand)]
pub enum InventoryCommands {
    /// Open a new card in a warehouse
    NewCard {
        #[arg(short, long)]
        warehouse: String,
        #[arg(short, long = "operator")]
        operators: Vec<String>,
    },
    /// Show a card with its positions
    Show { card: u32 },
    /// Search articles by number prefix or name
    Find {
        query: String,
        #[arg(short, long, default_value = "20")]
        limit: u32,
    },
    /// Record a counted position
    Save {
        #[arg(long)]
        card: u32,
        /// Slot on the card; the lowest free one if omitted
        #[arg(short, long)]
        position: Option<u32>,
        #[arg(short, long)]
        article: String,
        #[arg(short, long)]
        quantity: f64,
        #[arg(short, long)]
        bin: Option<String>,
        /// Work in progress
        #[arg(long)]
        wip: bool,
        #[arg(short, long = "operator")]
        operators: Vec<String>,
    },
    /// Bin options of a warehouse
    Bins {
        #[arg(short, long)]
        warehouse: String,
    },
    /// Import article master data from a JSON array
    Import { file: PathBuf },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Load and validate a config file
    Check { file: PathBuf },
}

fn init_tracing(verbose: bool, log_json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if log_json {
        tracing::subscriber::set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
        )
    } else {
        tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
    };
    if installed.is_ok() {
        // Route `log` records from the database layer into tracing.
        let _ = tracing_log::LogTracer::init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match &cli.command {
        Commands::Scan {
            workplace,
            operators,
            code,
        } => {
            let app = cmd::App::open(&cli)?;
            cmd::print_json(&app.station.save_hydra_batch(workplace, code, operators))
        }
        Commands::Pallet { command } => cmd::cmd_pallet(&cmd::App::open(&cli)?, command),
        Commands::Rework {
            reason,
            operators,
            batch,
        } => {
            let app = cmd::App::open(&cli)?;
            cmd::print_json(&app.station.rework_hydra_batch(batch, reason, operators))
        }
        Commands::Inventory { command } => cmd::cmd_inventory(&cmd::App::open(&cli)?, command),
        Commands::Config { command } => match command {
            ConfigCommands::Check { file } => cmd::cmd_config_check(file),
        },
    }
}
