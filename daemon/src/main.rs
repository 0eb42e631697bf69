use std::{path::PathBuf, process, thread};

use clap::Parser;
use shared::ServerConfig;
use signal_hook::{
    consts::{SIGINT, SIGTERM},
    iterator::Signals,
};
use smol::channel::{self, Receiver};
use thiserror::Error;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "httpd", about = "Serves a document root over HTTP/1.x")]
struct Args {
    /// Configuration file with port, root, defaultPage and maxThreads.
    #[arg(short, long, env = "HTTPD_CONFIG", default_value = "config.ini")]
    config: PathBuf,

    /// Overrides the configured port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Error, Debug)]
enum DaemonError {
    #[error(transparent)]
    Config(#[from] shared::ConfigError),

    #[error("Failed to install signal handlers: {0}")]
    Signals(std::io::Error),

    #[error(transparent)]
    Server(#[from] server::ServerError),
}

fn main() {
    let args = Args::parse();
    shared::init_logging("info");

    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), DaemonError> {
    let mut config = ServerConfig::from_file(&args.config)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    info!(
        "Loaded {}: root={} defaultPage={} maxThreads={}",
        args.config.display(),
        config.root,
        config.default_page,
        config.max_workers
    );

    let shutdown = shutdown_signal()?;
    smol::block_on(server::serve(&config, shutdown))?;
    Ok(())
}

/// Yields once on the first SIGINT or SIGTERM.
fn shutdown_signal() -> Result<Receiver<()>, DaemonError> {
    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(DaemonError::Signals)?;
    let (notify, shutdown) = channel::bounded(1);

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!("Received signal {}, shutting down", signal);
                let _ = notify.send_blocking(());
            }
        })
        .map_err(DaemonError::Signals)?;

    Ok(shutdown)
}
