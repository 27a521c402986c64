//! Entry point for the `cape` binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let code = tokio::select! {
        code = cape::cli::run() => code,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted");
            130
        }
    };
    std::process::exit(code);
}
