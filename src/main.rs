use clap::Parser;
use resourcehub_dashboard::adapter::inbound::cli::command::{
    CheckCommand, Cli, ColorChoice, Commands,
};
use resourcehub_dashboard::adapter::inbound::cli::output::{self, OutputConfig};
use resourcehub_dashboard::adapter::inbound::cli::{check, snapshot, watch};
use resourcehub_dashboard::error::Result;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    // tokio-tungstenite and reqwest both pull in rustls; pick one provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = run(cli.command).await {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Watch(args) => watch::execute(&args).await,
        Commands::Snapshot(args) => snapshot::execute(&args).await,
        Commands::Check(CheckCommand::Config(args)) => check::execute_config(&args.path),
    }
}
