//! HTTP server lifecycle.
//!
//! Pattern: bind → spawn background task → return handle with shutdown
//! channel. Binding to port 0 picks an ephemeral port, which the tests use.

use std::net::{IpAddr, SocketAddr};

use tokio::sync::oneshot;

use crate::api::router::api_router;
use crate::api::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Shut down the server gracefully.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Start the API server on the given host and port.
///
/// Builds the router, binds the listener, and spawns the axum server in a
/// background tokio task. Returns an `ApiServer` handle with the bound
/// address and a shutdown channel.
pub async fn start_api_server(
    ctx: ApiContext,
    host: IpAddr,
    port: u16,
) -> Result<ApiServer, String> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::new(host, port))
        .await
        .map_err(|e| format!("Failed to bind API server: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = api_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    async fn start_test_server() -> (ApiServer, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ApiContext::new(tmp.path().join("agenda.db"));
        let server = start_api_server(ctx, IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
            .await
            .expect("server should start");
        (server, tmp)
    }

    #[tokio::test]
    async fn serves_health_over_http() {
        let (mut server, _tmp) = start_test_server().await;

        let url = format!("http://{}/health", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["status"], "ok");

        server.shutdown();
    }

    #[tokio::test]
    async fn books_and_lists_over_http() {
        let (mut server, _tmp) = start_test_server().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}", server.addr);

        let resp = client
            .post(format!("{base}/appointments"))
            .json(&serde_json::json!({
                "professionalId": "professional-1",
                "patientId": "patient-1",
                "startAt": "2099-01-10T10:30:00.000Z"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

        let resp = client
            .get(format!(
                "{base}/appointments?date=2099-01-10&professionalId=professional-1"
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        let json: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(json["items"].as_array().unwrap().len(), 1);

        server.shutdown();
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (mut server, _tmp) = start_test_server().await;

        let url = format!("http://{}/nonexistent", server.addr);
        let resp = reqwest::get(&url).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

        server.shutdown();
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let (mut server, _tmp) = start_test_server().await;
        server.shutdown();
        server.shutdown(); // Second call should be safe
    }
}
