//! bmstub CLI entry point

use anyhow::{Context, Result};
use bmstub::config::{self, cli::Cli, Config};
use bmstub::profile::ProfileKind;
use bmstub::{server, Dispatcher};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, Level};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .init();

    let config = config::toml::load(&cli)?;
    config::validator::validate_config(&config).context("Configuration validation failed")?;

    if cli.dry_run {
        println!("bmstub v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("{}", config);
        println!();
        println!("Effective configuration (TOML):");
        println!("{}", config::toml::to_toml_string(&config)?);
        println!("Dry run mode - configuration validated successfully");
        return Ok(());
    }

    run(config)
}

/// Serve until Ctrl-C, then drain the pool and log statistics
fn run(config: Config) -> Result<()> {
    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);

    let runtime = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;

    let address = config.server.address();
    let served = runtime.block_on({
        let dispatcher = Arc::clone(&dispatcher);
        async move {
            let listener = TcpListener::bind(&address)
                .await
                .with_context(|| format!("Failed to bind {}", address))?;

            info!(
                address = %address,
                workers = config.workers.threads,
                avg_ms = config.profiles.avg_ms,
                "bmstub v{} listening",
                env!("CARGO_PKG_VERSION")
            );
            for kind in ProfileKind::ALL {
                info!(path = kind.path(), "{} profile", kind.name());
            }

            server::serve(listener, dispatcher, async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %err, "Failed to listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            })
            .await
        }
    });

    // Queued requests still run; their sleeps return at once.
    dispatcher.interrupt();
    dispatcher.shutdown();
    drop(runtime);

    let report = dispatcher.stats_report();
    info!(requests = report.requests_issued, "Worker pool stopped");
    for summary in &report.profiles {
        info!("{}", summary);
    }

    served
}
