/*!
 * thermalctl CLI - Command Line Interface
 */

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use thermal_connect::ThermalConnector;
use thermalctl::{
    commands,
    config::{ClientConfig, LogLevel, Protocol},
    error::{CliError, Result, EXIT_SUCCESS},
    logging,
};
use tracing::debug;

#[derive(Parser)]
#[command(name = "thermalctl")]
#[command(version, about = "Read and update the device thermal profile", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Service address, e.g. http://127.0.0.1:41959
    #[arg(short = 'e', long = "endpoint", value_name = "URL", global = true)]
    endpoint: Option<String>,

    /// Wire protocol spoken to the service
    #[arg(long = "protocol", value_enum, global = true)]
    protocol: Option<Protocol>,

    /// Log level
    #[arg(long = "log-level", value_enum, global = true)]
    log_level: Option<LogLevel>,

    /// Write JSON logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Verbose logging (same as --log-level debug)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the profile currently applied on the device
    Get,

    /// Replace the device profile with one read from a JSON file
    Set {
        /// Profile document
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Replace the device profile with a built-in profile
    Apply {
        /// Built-in profile name (case-insensitive)
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// List the built-in profiles
    Defaults,

    /// Write a default configuration file
    InitConfig {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("{}", e.report());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => ClientConfig::from_file(path)?,
        None => ClientConfig::default(),
    };

    // CLI flags override file values
    if let Some(endpoint) = cli.endpoint.clone() {
        config.endpoint = endpoint;
    }
    if let Some(protocol) = cli.protocol {
        config.protocol = protocol;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.log_file.is_some() {
        config.log_file = cli.log_file.clone();
    }
    config.verbose |= cli.verbose;

    match cli.command {
        Commands::Defaults => {
            println!("{}", commands::defaults()?);
            return Ok(());
        }
        Commands::InitConfig { ref path } => {
            ClientConfig::default().to_file(path)?;
            println!("Wrote default configuration to {}", path.display());
            return Ok(());
        }
        _ => {}
    }

    logging::init_logging(&config)?;
    let endpoint = config.endpoint()?;
    debug!("Using thermal service at {}", endpoint);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Config(format!("Failed to start async runtime: {}", e)))?;

    runtime.block_on(async {
        let connector = ThermalConnector::with_options(endpoint, config.transport_options())?;

        let profile = match cli.command {
            Commands::Get => commands::get(&connector).await?,
            Commands::Set { ref file } => commands::set(&connector, file).await?,
            Commands::Apply { ref name } => commands::apply(&connector, name).await?,
            Commands::Defaults | Commands::InitConfig { .. } => return Ok(()),
        };

        println!("{}", commands::render_profile(&profile)?);
        Ok::<(), CliError>(())
    })
}
