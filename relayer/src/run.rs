//! StylusTx relayer HTTP server entrypoint.
//!
//! Serves the relay API of [`stylustx_relay_local::handlers`] for one paymaster
//! deployment.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check |
//! | `GET` | `/info` | Chain, paymaster and relayer addresses |
//! | `POST` | `/digest` | Canonical encoding and digest of an authorization |
//! | `POST` | `/verify` | Check a signed authorization against on-chain state |
//! | `POST` | `/relay` | Verify, then submit `execute` from the relayer wallet |
//!
//! # Environment Variables
//!
//! - `HOST` - Server bind address (default: `0.0.0.0`)
//! - `PORT` - Server port (default: `9090`)
//! - `CONFIG` - Path to configuration file (default: `config.json`)
//! - `RELAYER_PRIVATE_KEY` - Relayer key, unless the config names another variable in `signerEnv`
//! - `STYLUSTX_CORS_ALLOWED_ORIGINS` - comma-separated CORS allowlist, or `*` to allow all
//! - `RUST_LOG` - log filter (when `telemetry` feature enabled)

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use dotenvy::dotenv;
use tower_http::cors;

use stylustx_chain_eip155::chain::{
    Eip155ConfigError, Eip155PaymasterConfig, Eip155PaymasterError, Eip155PaymasterProvider,
    Eip155PaymasterRelayer,
};
use stylustx_relay_local::util::SigDown;
#[cfg(feature = "telemetry")]
use stylustx_relay_local::util::Telemetry;
use stylustx_relay_local::{RelayLocal, handlers};

use crate::config::{CORS_ENV, FileConfig, ServeArgs};

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

fn build_cors_layer(raw: Option<String>) -> Result<cors::CorsLayer, io::Error> {
    let raw = raw.unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string());

    let base = cors::CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(cors::Any);

    if raw.trim() == "*" {
        return Ok(base.allow_origin(cors::Any));
    }

    let origins: Vec<HeaderValue> = raw
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(HeaderValue::from_str)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid {CORS_ENV}: {e}")))?;

    if origins.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{CORS_ENV} is empty"),
        ));
    }

    Ok(base.allow_origin(origins))
}

/// Connects to the paymaster. Refuses to start when the deployed contract hashes
/// authorizations differently. Without a relayer key the server still verifies but
/// cannot relay.
async fn build_relay(config: &Eip155PaymasterConfig) -> Result<RelayLocal, Eip155ConfigError> {
    let reader = Eip155PaymasterProvider::from_config(config)?;
    if let Err(e) = reader.check_chain_id().await {
        #[cfg(feature = "telemetry")]
        tracing::warn!(error = %e, "RPC endpoint chain check failed");
        #[cfg(not(feature = "telemetry"))]
        let _ = e;
    }
    match reader.check_message_hash().await {
        Ok(()) => {}
        Err(e @ Eip155PaymasterError::DigestMismatch { .. }) => {
            return Err(Eip155ConfigError::DigestMismatch(e.to_string()));
        }
        Err(e) => {
            #[cfg(feature = "telemetry")]
            tracing::warn!(error = %e, "Could not compare digests with the paymaster");
            #[cfg(not(feature = "telemetry"))]
            let _ = e;
        }
    }
    let relay = RelayLocal::new(config.chain.clone(), config.paymaster, Arc::new(reader));
    match Eip155PaymasterRelayer::from_config(config) {
        Ok(relayer) => Ok(relay.with_submitter(Arc::new(relayer))),
        Err(Eip155ConfigError::MissingSigner(var)) => {
            #[cfg(feature = "telemetry")]
            tracing::warn!("{var} is not set, relaying is disabled");
            #[cfg(not(feature = "telemetry"))]
            let _ = var;
            Ok(relay)
        }
        Err(e) => Err(e),
    }
}

/// Initializes the relayer server.
///
/// - Loads `.env` variables.
/// - Installs the log subscriber.
/// - Connects to the paymaster on the configured chain.
/// - Starts an Axum HTTP server with the relay handlers.
pub async fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
        .map_err(|e| io::Error::other(format!("failed to initialize rustls crypto provider: {e:?}")))?;

    dotenv().ok();

    #[cfg(feature = "telemetry")]
    let telemetry_layer = {
        let telemetry = Telemetry::new()
            .with_name(env!("CARGO_PKG_NAME"))
            .with_version(env!("CARGO_PKG_VERSION"))
            .register();
        telemetry.http_tracing()
    };

    let config = FileConfig::load(&args.config)?;
    let relay = build_relay(&config.paymaster).await?;
    let axum_state = Arc::new(relay);

    let mut http_endpoints = Router::new().merge(handlers::routes().with_state(axum_state));
    #[cfg(feature = "telemetry")]
    {
        http_endpoints = http_endpoints.layer(telemetry_layer);
    }
    let http_endpoints = http_endpoints.layer(build_cors_layer(config.cors_origins())?);

    let addr = SocketAddr::new(args.host, args.port);
    #[cfg(feature = "telemetry")]
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await;
    #[cfg(feature = "telemetry")]
    let listener = listener.inspect_err(|e| tracing::error!("Failed to bind to {}: {}", addr, e));
    let listener = listener?;

    let sig_down = SigDown::try_new()?;
    let axum_cancellation_token = sig_down.cancellation_token();
    let axum_graceful_shutdown = async move { axum_cancellation_token.cancelled().await };
    axum::serve(listener, http_endpoints)
        .with_graceful_shutdown(axum_graceful_shutdown)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_any() {
        assert!(build_cors_layer(Some("*".into())).is_ok());
    }

    #[test]
    fn test_cors_rejects_empty_list() {
        assert!(build_cors_layer(Some(" , ".into())).is_err());
    }

    #[test]
    fn test_cors_default_origins() {
        assert!(build_cors_layer(None).is_ok());
    }
}
