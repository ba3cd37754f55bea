use card_unlock::config::AppConfig;
use card_unlock::startup::{Application, StartupError};
use card_unlock::telemetry::init_tracing;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        return Err(StartupError::Config(e.into()));
    }

    tracing::info!(
        environment = ?config.server.environment,
        ledger = ?config.ledger.backend,
        "Starting card unlock service"
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await
}
