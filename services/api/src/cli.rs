use crate::collect::{run_collect, run_openings, CollectArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use hiring_reviews::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Candidate Review Collector",
    about = "Collect candidate reviews from Base Hiring and export them as CSV",
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
    /// List the active job openings
    Openings,
    /// Collect candidates for the active openings and write a CSV export
    Collect(CollectArgs),
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

    // The blocking HTTP client must live outside the async runtime.
    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Openings => tokio::task::spawn_blocking(run_openings).await?,
        Command::Collect(args) => tokio::task::spawn_blocking(move || run_collect(args)).await?,
    }
}
