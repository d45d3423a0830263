//! Setup shared by commands that talk to the gateway

use crate::cli::CommonArgs;
use crate::config::ClusterviewConfig;
use crate::context::AppContext;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Load configuration with CLI overrides
pub fn load_config(args: &CommonArgs) -> Result<ClusterviewConfig, Box<dyn std::error::Error>> {
    // Load from file if it exists, otherwise use defaults
    let mut config = ClusterviewConfig::load_or_default(&args.config)?;

    config = config.with_env_overrides();

    // CLI overrides win
    if let Some(ref gateway) = args.gateway {
        config.gateway.url = gateway.clone();
    }
    if let Some(ref log_level) = args.log_level {
        config.logging.level = log_level.clone();
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration, initialize tracing and build the application context.
///
/// Also installs the signal handler that cancels the context's token.
pub fn build_context(args: &CommonArgs) -> Result<Arc<AppContext>, Box<dyn std::error::Error>> {
    let config = load_config(args)?;
    crate::logging::init_tracing(&config.logging)?;
    tracing::debug!(?config, "Loaded configuration");

    let ctx = Arc::new(AppContext::new(config)?);
    tokio::spawn(shutdown_signal(ctx.cancel.clone()));
    Ok(ctx)
}

/// Wait for shutdown signal (SIGINT or SIGTERM), then cancel `cancel_token`.
///
/// Returns early if the token is cancelled elsewhere.
pub async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
        _ = cancel_token.cancelled() => return,
    }

    cancel_token.cancel();
}
