//! Server startup, binding and shutdown
//!
//! Binds the configured host/port, serves the router and drains in-flight
//! requests on Ctrl-C for at most `shutdown_timeout_secs`.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::config::ServerConfig;
use crate::datasets::DatasetError;
use crate::routes::{self, AppState};

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a server around prepared state
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        let router = routes::build_router(state);

        Self { config, router }
    }

    /// Create a server and load the datasets named in `config`
    pub fn from_config(config: ServerConfig) -> Result<Self, DatasetError> {
        let state = AppState::load(Arc::new(config))?;
        Ok(Self::new(state))
    }

    /// The `host:port` the server binds to
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run until Ctrl-C
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        self.run_with_listener(listener, ctrl_c()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Open connections get `shutdown_timeout_secs` to finish after the
    /// signal; whatever is still running then is dropped.
    pub async fn run_with_listener<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        let grace = Duration::from_secs(self.config.shutdown_timeout_secs);
        tracing::info!(%addr, "Server listening");

        let (signalled_tx, signalled_rx) = oneshot::channel::<()>();
        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                tracing::info!("Shutdown signal received, draining connections");
                let _ = signalled_tx.send(());
            })
            .into_future();

        tokio::select! {
            result = serve => result,
            _ = async {
                if signalled_rx.await.is_ok() {
                    tokio::time::sleep(grace).await;
                } else {
                    std::future::pending::<()>().await;
                }
            } => {
                tracing::warn!(grace_secs = grace.as_secs(), "Shutdown timeout elapsed, dropping open connections");
                Ok(())
            }
        }
    }

    /// Bind port 0, serve `state` in a background task and return the address
    #[cfg(test)]
    pub async fn spawn_test_server(
        state: AppState,
    ) -> (std::net::SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = Self::new(state);
        let handle = tokio::spawn(async move {
            server
                .run_with_listener(listener, async {
                    let _ = stop_rx.await;
                })
                .await
                .ok();
        });

        (addr, stop_tx, handle)
    }
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::test_state;
    use reqwest::StatusCode;

    #[test]
    fn test_server_socket_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..ServerConfig::default()
        };

        let server = Server::from_config(config).unwrap();

        assert_eq!(server.socket_addr(), "127.0.0.1:3000");
        assert_eq!(server.config().port, 3000);
    }

    #[test]
    fn test_from_config_reports_missing_dataset() {
        let config = ServerConfig {
            catalog_file: Some("/nonexistent/catalog.toml".into()),
            ..ServerConfig::default()
        };

        assert!(matches!(
            Server::from_config(config),
            Err(DatasetError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn test_live_server_round_trip() {
        let (addr, stop, handle) = Server::spawn_test_server(test_state()).await;
        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "healthy");

        let response = client
            .get(format!("http://{}/api/v1/dcf?ticker=ACME", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["intrinsic_value"].as_f64().unwrap() > 0.0);

        let response = client
            .post(format!("http://{}/api/v1/elasticity/simulate", addr))
            .json(&serde_json::json!({
                "product": {"avg_price": 10.0, "elasticity": -0.5, "current_volume": 100.0, "r2": 0.9},
                "pct_price_change": 10.0
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = client
            .get(format!("http://{}/unknown/path", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        stop.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_multiple_servers_on_different_ports() {
        let (addr1, stop1, handle1) = Server::spawn_test_server(test_state()).await;
        let (addr2, stop2, handle2) = Server::spawn_test_server(test_state()).await;

        assert_ne!(addr1.port(), addr2.port());

        let client = reqwest::Client::new();
        for addr in [addr1, addr2] {
            let response = client
                .get(format!("http://{}/ready", addr))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        stop1.send(()).unwrap();
        stop2.send(()).unwrap();
        handle1.await.unwrap();
        handle2.await.unwrap();
    }
}
