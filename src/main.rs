use clap::Parser;
use stackdeploy::adapter::inbound::cli::command::{CheckCommand, Cli, Commands};
use stackdeploy::adapter::inbound::cli::output::{self, OutputConfig};
use stackdeploy::adapter::inbound::cli::{check, deploy};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    output::configure(OutputConfig::detect(cli.quiet));
    output::set_color(cli.color.forced());

    let result = match &cli.command {
        Commands::Deploy(args) => deploy::execute(args).await,
        Commands::Check(CheckCommand::Config(arg)) => check::execute_config(arg.config.as_deref()),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
