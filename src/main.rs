use clap::{Parser, Subcommand};

use qrmenu::config::{self, StaticConfig};
use qrmenu::{runtime, system};

#[derive(Parser)]
#[command(name = "qrmenu", version, about = "Digital restaurant menu platform backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print a sample config.toml and exit
    ConfigGen,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::ConfigGen => {
            println!("{}", StaticConfig::generate_sample_config());
            Ok(())
        }
        Command::Serve => {
            let config = config::init_config();
            let _log_guard = system::init_logging(config);
            runtime::run_server().await
        }
    }
}
