use clap::Parser;
use goscan::{cli::Cli, pipeline, ScanError};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cancel = CancellationToken::new();

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("received interrupt, cancelling scan");
            ctrl_c_cancel.cancel();
        }
    });

    match run(cli, cancel).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            tracing::error!(%err, "scan failed");
            std::process::exit(err.exit_code());
        }
    }
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<(), ScanError> {
    let config = pipeline::build_config(&cli);
    let report = pipeline::run(cli, config, cancel).await?;
    print!("{report}");
    Ok(())
}
