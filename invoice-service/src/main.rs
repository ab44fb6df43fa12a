use invoice_service::config::InvoiceConfig;
use invoice_service::services::init_metrics;
use invoice_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize metrics recorder (must be before any metrics are recorded)
    init_metrics();

    let config = InvoiceConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "invoice-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    );

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    tracing::info!(port = application.port(), "invoice-service started");

    application.run_until_stopped().await
}
