//! Application assembly and server lifecycle.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::adapters::http::{build_router, UnlockAppState};
use crate::adapters::ledger::{InMemoryUnlockLedger, RedisUnlockLedger};
use crate::adapters::stripe::{StripeConfig, StripePaymentAdapter};
use crate::application::handlers::unlock::CheckoutSettings;
use crate::config::{AppConfig, LedgerBackend};
use crate::ports::{LedgerError, UnlockLedger};

/// Errors that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully wired server bound to its listener.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Construct adapters, state and router, and bind the listener.
    ///
    /// Port `0` binds an ephemeral port; read it back with [`Application::port`].
    pub async fn build(config: AppConfig) -> Result<Self, StartupError> {
        let ledger = build_ledger(&config).await?;

        let stripe = StripePaymentAdapter::new(StripeConfig::from_payment_config(&config.payment));
        if config.payment.is_live_mode() {
            tracing::info!("Stripe adapter initialized in live mode");
        } else {
            tracing::info!("Stripe adapter initialized in test mode");
        }

        let state = UnlockAppState::new(
            ledger,
            Arc::new(stripe),
            CheckoutSettings::from_payment_config(&config.payment),
        );
        let router = build_router(state, &config.server);

        let listener = TcpListener::bind(config.server.bind_address()).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
    pub async fn run_until_stopped(self) -> Result<(), StartupError> {
        tracing::info!(port = self.port, "Card unlock server listening");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn build_ledger(config: &AppConfig) -> Result<Arc<dyn UnlockLedger>, StartupError> {
    match config.ledger.backend {
        LedgerBackend::Memory => {
            tracing::warn!("Using in-memory unlock ledger; unlocks are lost on restart");
            Ok(Arc::new(InMemoryUnlockLedger::new()))
        }
        LedgerBackend::Redis => {
            let url = config.ledger.redis_url.as_deref().ok_or_else(|| {
                crate::config::ConfigError::from(crate::config::ValidationError::MissingRequired(
                    "LEDGER__REDIS_URL",
                ))
            })?;
            let ledger = RedisUnlockLedger::connect(url, config.ledger.key_prefix.clone()).await?;
            tracing::info!(key_prefix = %config.ledger.key_prefix, "Using Redis unlock ledger");
            Ok(Arc::new(ledger))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LedgerConfig, PaymentConfig, ServerConfig};
    use secrecy::SecretString;

    fn test_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                ..ServerConfig::default()
            },
            payment: PaymentConfig {
                stripe_api_key: SecretString::new("sk_test_xxx".to_string()),
                stripe_webhook_secret: SecretString::new("whsec_xxx".to_string()),
                price_id: "price_123".to_string(),
                success_url: "https://game.example/success".to_string(),
                cancel_url: "https://game.example/cancel".to_string(),
                api_base_url: "https://api.stripe.com".to_string(),
                webhook_tolerance_secs: 300,
            },
            ledger: LedgerConfig::default(),
        }
    }

    #[tokio::test]
    async fn build_binds_ephemeral_port() {
        let app = Application::build(test_config()).await.unwrap();
        assert_ne!(app.port(), 0);
    }

    #[tokio::test]
    async fn redis_backend_without_url_fails() {
        let mut config = test_config();
        config.ledger.backend = LedgerBackend::Redis;
        config.ledger.redis_url = None;

        let result = Application::build(config).await;
        assert!(matches!(result, Err(StartupError::Config(_))));
    }

    #[tokio::test]
    async fn redis_backend_with_bad_url_fails() {
        let mut config = test_config();
        config.ledger.backend = LedgerBackend::Redis;
        config.ledger.redis_url = Some("not-a-url".to_string());

        let result = Application::build(config).await;
        assert!(matches!(result, Err(StartupError::Ledger(_))));
    }

    #[tokio::test]
    async fn served_app_answers_liveness() {
        let app = Application::build(test_config()).await.unwrap();
        let port = app.port();
        tokio::spawn(app.run_until_stopped());

        let body = reqwest::get(format!("http://127.0.0.1:{}/", port))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert_eq!(body, crate::adapters::http::unlock::LIVENESS_MESSAGE);
    }
}
