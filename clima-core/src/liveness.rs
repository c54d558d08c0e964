//! Single-route HTTP server that keeps a port bound for the hosting platform.
//!
//! The response is static and says nothing about the health of the poll loop.

use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

use anyhow::{Context, Result};
use axum::{Router, extract::State, routing::get};
use tokio::net::TcpListener;
use tracing::info;

pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_MESSAGE: &str =
    "Weather pipeline is running successfully and rotating cities across Colombia!";

pub fn router(message: impl Into<String>) -> Router {
    let message: Arc<str> = Arc::from(message.into());

    Router::new().route("/", get(home)).with_state(message)
}

async fn home(State(message): State<Arc<str>>) -> String {
    message.to_string()
}

/// Address on all interfaces for `port`.
pub fn listen_addr(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
}

/// Serve `router` until the process exits.
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind liveness server on {addr}"))?;

    serve_on(listener, router).await
}

/// Serve `router` on an already bound listener.
pub async fn serve_on(listener: TcpListener, router: Router) -> Result<()> {
    let addr = listener.local_addr().context("Liveness listener has no local address")?;
    info!(addr = %addr, "liveness server listening");

    axum::serve(listener, router).await.context("Liveness server terminated")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_returns_static_message() {
        let app = router(DEFAULT_MESSAGE);

        let res = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let ct = res.headers().get("content-type").unwrap().to_str().unwrap();
        assert!(ct.starts_with("text/plain"));

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&body).unwrap(), DEFAULT_MESSAGE);
    }

    #[tokio::test]
    async fn other_paths_are_not_routed() {
        let res = router("ok")
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn answers_over_a_real_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(serve_on(listener, router(DEFAULT_MESSAGE)));

        let res = reqwest::get(format!("http://{addr}/")).await.unwrap();
        assert_eq!(res.status().as_u16(), 200);
        assert_eq!(res.text().await.unwrap(), DEFAULT_MESSAGE);

        handle.abort();
    }

    #[tokio::test]
    async fn bind_conflict_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap();

        let err = serve(addr, router("ok")).await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind liveness server"));
    }

    #[test]
    fn listens_on_all_interfaces() {
        assert_eq!(listen_addr(8080).to_string(), "0.0.0.0:8080");
    }
}
