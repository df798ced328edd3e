//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `rank_checker` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use rank_checker::config::{Command, Opt};
use rank_checker::initialization::init_logger_with;
use rank_checker::{run_checks, run_server, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // SERPER_API_KEY and friends may live in a .env file
    // Try the current directory first, then the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let opt = Opt::parse();
    let config = Config::from(&opt.engine);

    init_logger_with(config.log_level.clone().into(), config.log_format.clone())
        .context("Failed to initialize logger")?;

    let outcome = match &opt.command {
        Command::Check(check) => {
            let mut stdout = std::io::stdout().lock();
            run_checks(config, check, &mut stdout).await.map(|_| ())
        }
        Command::Serve(serve) => run_server(config, serve).await,
    };

    if let Err(e) = outcome {
        eprintln!("rank_checker error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
