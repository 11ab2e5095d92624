use clap::{ArgAction, Parser};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use whatnet::connectivity::{ConnectivityProber, ProbeClient, ProbeConfig, ReqwestProbeClient};
use whatnet::error::classify;
use whatnet::logging::{init_logging, LoggingConfig};

#[derive(Parser, Debug)]
#[command(name = "whatnet")]
#[command(version)]
#[command(about = "Tell what kind of network failure you are looking at")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Check for basic internet connectivity
    Check {
        /// Extra URL to probe after the well-known host
        #[arg(long)]
        host: Option<String>,

        /// Per-probe timeout in seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,

        /// Path to a TOML configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Send one HEAD request and classify its failure, if any
    Probe {
        /// URL to probe
        url: String,

        /// Per-probe timeout in seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },
}

/// Exit codes shared by all commands
mod exit_codes {
    use std::process::ExitCode;

    /// Connected, or the probe was answered
    pub fn ok() -> ExitCode {
        ExitCode::from(0)
    }

    /// Not connected, or the probe failed
    pub fn failed() -> ExitCode {
        ExitCode::from(1)
    }

    /// The check itself could not run
    pub fn error() -> ExitCode {
        ExitCode::from(2)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LoggingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Check {
            ref host,
            timeout,
            ref config,
        } => run_check(host.as_deref(), timeout, config.as_ref(), cli.json).await,
        Commands::Probe { ref url, timeout } => run_probe(url, timeout, cli.json).await,
    }
}

fn build_config(
    config_path: Option<&PathBuf>,
    timeout: Option<u64>,
) -> Result<ProbeConfig, String> {
    let mut config = match config_path {
        Some(path) => ProbeConfig::load(path).map_err(|e| e.to_string())?,
        None => ProbeConfig::default(),
    };
    if let Some(secs) = timeout {
        config = config.with_probe_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

async fn run_check(
    host: Option<&str>,
    timeout: Option<u64>,
    config_path: Option<&PathBuf>,
    as_json: bool,
) -> ExitCode {
    let config = match build_config(config_path, timeout) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::error();
        }
    };

    let prober = match ConnectivityProber::with_config(&config) {
        Ok(prober) => prober,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::error();
        }
    };

    match prober.check_connection_and_host(host.unwrap_or("")).await {
        Ok(status) => {
            if as_json {
                println!("{}", json!({ "status": status }));
            } else {
                println!("{}", status);
            }
            if status.is_connected() {
                exit_codes::ok()
            } else {
                exit_codes::failed()
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_codes::error()
        }
    }
}

async fn run_probe(url: &str, timeout: Option<u64>, as_json: bool) -> ExitCode {
    let config = match build_config(None, timeout) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_codes::error();
        }
    };

    let client = match ReqwestProbeClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: failed to create HTTP client: {}", e);
            return exit_codes::error();
        }
    };

    match client.head(url).await {
        Ok(()) => {
            if as_json {
                println!("{}", json!({ "url": url, "ok": true }));
            } else {
                println!("ok");
            }
            exit_codes::ok()
        }
        Err(err) => {
            let basic = classify(err);
            if as_json {
                println!(
                    "{}",
                    json!({
                        "url": url,
                        "ok": false,
                        "category": basic.category(),
                        "connection_error": basic.is_connectivity(),
                        "cause": basic.cause().to_string(),
                    })
                );
            } else {
                println!("{}", basic.category());
            }
            exit_codes::failed()
        }
    }
}
