mod cli;

use clap::Parser;
use scangate::config;
use scangate::errors::ScanGateError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    debug!(
        built = env!("BUILD_TIMESTAMP"),
        git = option_env!("GIT_HASH").unwrap_or("unknown"),
        "scangate {}",
        env!("CARGO_PKG_VERSION")
    );

    let result = match cli.command {
        cli::Commands::Scan(args) => cli::scan::handle_scan(args).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.classify().exit_code);
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), ScanGateError> {
    let path = std::path::PathBuf::from(&args.config);
    let config = config::parse_config(&path).await?;
    let scan = config.scan();
    println!("Configuration is valid: {}", args.config);
    if let Some(app) = scan.application_name {
        println!("  application: {}", app);
    }
    if let Some(includes) = scan.includes {
        println!("  includes:    {}", includes);
    }
    Ok(())
}
