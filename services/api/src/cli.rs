use crate::quote::{run_quote, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use freight_pricing::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Freight Pricing Service",
    about = "Run the freight pricing service or price a shipment from the command line",
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
    /// Price a single shipment against a rule file or the built-in catalog
    Quote(QuoteArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Start with an empty rule set instead of the built-in catalog
    #[arg(long)]
    pub(crate) no_seed: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Quote(args) => run_quote(args),
    }
}
