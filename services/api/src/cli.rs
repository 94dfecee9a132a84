use crate::report::{run_generate, run_report, GenerateArgs, ReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lifecycle_risk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "lifecycle-risk",
    about = "Score district Aadhaar lifecycle health and serve the results",
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
    /// Score an extract and print summary, rankings, flags and distribution
    Report(ReportArgs),
    /// Write a seeded synthetic district extract
    Generate(GenerateArgs),
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
        Command::Report(args) => run_report(args),
        Command::Generate(args) => run_generate(args),
    }
}
