use settlement_core::error::AppError;
use settlement_core::observability::init_tracing;
use settlement_service::config::SettlementConfig;
use settlement_service::services::init_metrics;
use settlement_service::startup::Application;
use tokio::signal;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = SettlementConfig::load()?;

    init_tracing(
        "settlement-service",
        &config.common.log_level,
        &config.common.otlp_endpoint,
    );
    init_metrics();

    let app = Application::build(config).await?;
    app.run_until_shutdown(shutdown_signal()).await
}
