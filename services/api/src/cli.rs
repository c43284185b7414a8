use crate::commands::{run_import, run_normalize, ImportArgs, NormalizeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use merchant_ledger::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "merchant-ledger",
    about = "Normalize merchant names and ingest bank transaction exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with raw merchant names
    Merchant {
        #[command(subcommand)]
        command: MerchantCommand,
    },
    /// Work with bank transaction exports
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum MerchantCommand {
    /// Print the canonical form of each raw merchant name
    Normalize(NormalizeArgs),
}

#[derive(Subcommand, Debug)]
enum TransactionsCommand {
    /// Import a bank CSV export and write it back with normalized merchants
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Merchant {
            command: MerchantCommand::Normalize(args),
        } => run_normalize(args),
        Command::Transactions {
            command: TransactionsCommand::Import(args),
        } => run_import(args),
    }
}
