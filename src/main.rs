//! ddns-sync - single-pass dynamic DNS updater for Cloudflare.

use clap::{Parser, Subcommand};
use ddns_sync::cloudflare::CloudflareUpdater;
use ddns_sync::config::Config;
use ddns_sync::fetcher::IpFetcher;
use ddns_sync::sync;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Exit code for configuration problems.
const EXIT_CONFIG: u8 = 1;
/// Exit code for a failed sync pass.
const EXIT_SYNC: u8 = 2;

#[derive(Parser)]
#[command(name = "ddns-sync")]
#[command(about = "Keep a Cloudflare DNS record pointed at this machine's public IP")]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the cache file location
    #[arg(long, value_name = "FILE")]
    cache_file: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration template
    Init {
        /// Where to write the template
        #[arg(default_value = "config.toml")]
        output: PathBuf,
    },
}

/// Install the global tracing subscriber.
///
/// With a log file, events go through a non-blocking file appender; the
/// returned guard must stay alive until the process exits or buffered
/// lines are lost. Without one, events go to stderr.
fn init_tracing(log_file: Option<&Path>, verbose: bool) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(file) => {
            let dir = match file.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let name = file
                .file_name()
                .unwrap_or_else(|| OsStr::new("ddns-sync.log"));

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();

            None
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Commands::Init { output }) = cli.command {
        return match Config::example().save_to(&output) {
            Ok(()) => {
                println!("Configuration template written to: {}", output.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                ExitCode::from(EXIT_CONFIG)
            }
        };
    }

    // Logging is configured from the resolved config, so configuration
    // failures can only go to stderr.
    let config = match Config::resolve(
        cli.config.as_deref(),
        cli.cache_file.as_deref(),
        cli.log_file.as_deref(),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let _guard = init_tracing(config.log_file.as_deref(), cli.verbose);

    let fetcher = IpFetcher::new(config.ip_url.clone());
    let updater = CloudflareUpdater::new(config.record.clone());

    match sync::run(&fetcher, &updater, &config.cache_file).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_SYNC)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_run_flags() {
        let cli = Cli::try_parse_from([
            "ddns-sync",
            "--config",
            "/etc/ddns-sync/config.toml",
            "--cache-file",
            "/tmp/last-ip",
            "--verbose",
        ])
        .unwrap();

        assert_eq!(
            cli.config,
            Some(PathBuf::from("/etc/ddns-sync/config.toml"))
        );
        assert_eq!(cli.cache_file, Some(PathBuf::from("/tmp/last-ip")));
        assert!(cli.verbose);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parses_init_subcommand() {
        let cli = Cli::try_parse_from(["ddns-sync", "init", "custom.toml"]).unwrap();

        match cli.command {
            Some(Commands::Init { output }) => assert_eq!(output, PathBuf::from("custom.toml")),
            _ => panic!("expected init subcommand"),
        }
    }

    #[test]
    fn test_cli_init_defaults_output_path() {
        let cli = Cli::try_parse_from(["ddns-sync", "init"]).unwrap();

        match cli.command {
            Some(Commands::Init { output }) => assert_eq!(output, PathBuf::from("config.toml")),
            _ => panic!("expected init subcommand"),
        }
    }
}
