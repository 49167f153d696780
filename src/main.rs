//! stubhttp - configurable HTTP response stub
//!
//! Parses flags, sets up logging and runs the server until it is interrupted or has served the
//! configured number of responses.

#![allow(missing_docs)]

use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use stubhttp::config::cli::{Cli, LogFormat};
use stubhttp::server::{StubServer, forward_os_signals};
use stubhttp::StubConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version land here too
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(&cli.log_level, cli.log_format);

    let server = match StubConfig::try_from(cli).and_then(StubServer::new) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{}\n\n{}", e, Cli::command().render_usage());
            return ExitCode::FAILURE;
        }
    };

    forward_os_signals(server.shutdown_signal());

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// An unparsable `--log-level` falls back to `info`
fn init_logging(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_thread_ids(false);

    let _ = match format {
        LogFormat::Text => subscriber.try_init(),
        LogFormat::Json => subscriber.json().try_init(),
    };
}
