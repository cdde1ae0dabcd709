use clap::Parser;

use ephemeral_link::cli::{Cli, Commands};
use ephemeral_link::config::AppConfig;
use ephemeral_link::runtime::{self, modes::generate_config};
use ephemeral_link::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::GenerateConfig { output, force } => {
            if let Err(e) = generate_config(output.as_deref(), force) {
                eprintln!("{}", e.format_colored());
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Serve => {
            let config = match AppConfig::load_from(&cli.config) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("{}", e.format_colored());
                    std::process::exit(1);
                }
            };

            // guard 必须存活到进程结束，保证日志刷新
            let _log_guard = init_logging(&config.logging)?;
            runtime::run_server(config).await
        }
    }
}
