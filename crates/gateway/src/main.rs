use clap::Parser;
use orpheus_domain::config::{Config, ConfigSeverity};
use orpheus_gateway::{api, bootstrap};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orpheus", about = "Lecture-generation control plane")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the gateway (default).
    Serve,
    /// Print the version and exit.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Command::Serve) => {
            init_tracing();
            run_server(Config::from_env()).await
        }
        Some(Command::Version) => {
            println!("orpheus {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,orpheus_gateway=debug")),
        )
        .json()
        .init();
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    tracing::info!("orpheus starting");

    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Workspace root ───────────────────────────────────────────────
    std::fs::create_dir_all(&config.video_root)?;
    tracing::info!(path = %config.video_root.display(), "video workspace ready");

    let bind_addr = config.bind_addr.clone();
    let runtime = bootstrap::build(config)?;
    let router = api::router(runtime.state.clone());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    let shutdown = runtime.shutdown.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        })
        .await?;

    // The worker honors the token between tasks; wait for it to drain.
    let _ = runtime.worker.await;
    tracing::info!("orpheus stopped");
    Ok(())
}
