//! HTTP front door
//!
//! One route per profile (any method), an index page on `/` and a JSON
//! statistics endpoint on `/stats`. Profile requests are handed to the
//! [`Dispatcher`] and answered once their delay is over.

pub mod pages;

use crate::dispatcher::Dispatcher;
use crate::profile::ProfileKind;
use crate::Result;
use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Build the route table
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/stats", get(stats));

    for kind in ProfileKind::ALL {
        router = router.route(
            kind.path(),
            any(move |State(dispatcher): State<Arc<Dispatcher>>| run_profile(dispatcher, kind)),
        );
    }

    router.with_state(dispatcher)
}

/// Serve until `shutdown` resolves
///
/// On shutdown, sleeping workers are interrupted so in-flight requests
/// complete early and their responses can still be sent. The worker pool
/// itself is left running; the caller shuts it down.
pub async fn serve<F>(listener: TcpListener, dispatcher: Arc<Dispatcher>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(Arc::clone(&dispatcher));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutting down, interrupting sleeping workers");
            dispatcher.interrupt();
        })
        .await
        .context("HTTP server failed")
}

async fn index() -> Html<String> {
    Html(pages::index())
}

async fn stats(State(dispatcher): State<Arc<Dispatcher>>) -> impl IntoResponse {
    Json(dispatcher.stats_report())
}

async fn run_profile(dispatcher: Arc<Dispatcher>, kind: ProfileKind) -> Response {
    match dispatcher.dispatch(kind).await {
        Ok(completion) => Html(pages::completion(&completion)).into_response(),
        Err(err) => {
            warn!(profile = kind.name(), error = %err, "dispatch failed");
            (StatusCode::SERVICE_UNAVAILABLE, err.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileConfig;
    use crate::profile::ProfileRegistry;
    use crate::worker::WorkerPool;
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::oneshot;
    use tokio::task::{JoinHandle, JoinSet};

    struct TestServer {
        addr: SocketAddr,
        dispatcher: Arc<Dispatcher>,
        stop: Option<oneshot::Sender<()>>,
        task: JoinHandle<Result<()>>,
    }

    impl TestServer {
        async fn start(threads: usize, avg_ms: u64) -> Self {
            let config = ProfileConfig {
                avg_ms,
                seed: Some(99),
                ..Default::default()
            };
            let dispatcher = Arc::new(Dispatcher::new(
                ProfileRegistry::from_config(&config),
                WorkerPool::new(threads).unwrap(),
            ));

            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (stop, stopped) = oneshot::channel::<()>();
            let task = tokio::spawn(serve(listener, Arc::clone(&dispatcher), async move {
                let _ = stopped.await;
            }));

            Self {
                addr,
                dispatcher,
                stop: Some(stop),
                task,
            }
        }

        async fn stop(mut self) {
            if let Some(stop) = self.stop.take() {
                let _ = stop.send(());
            }
            self.task.await.unwrap().unwrap();
        }
    }

    /// Send one HTTP/1.1 request, return (status line, body)
    async fn request(addr: SocketAddr, method: &str, path: &str) -> (String, String) {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let req = format!(
            "{} {} HTTP/1.1\r\nHost: localhost\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            method, path
        );
        stream.write_all(req.as_bytes()).await.unwrap();

        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8(raw).unwrap();

        let status = text.lines().next().unwrap_or_default().to_string();
        let body = text
            .split_once("\r\n\r\n")
            .map(|(_, body)| body.to_string())
            .unwrap_or_default();
        (status, body)
    }

    fn reported_index(body: &str) -> u64 {
        let rest = body.split("Request ").nth(1).unwrap();
        rest.split_whitespace().next().unwrap().parse().unwrap()
    }

    #[tokio::test]
    async fn test_index_page() {
        let server = TestServer::start(1, 1).await;
        let (status, body) = request(server.addr, "GET", "/").await;
        assert!(status.contains("200"));
        assert!(body.contains("<a href=\"/warmup\">WarmUp</a>"));
        server.stop().await;
    }

    #[tokio::test]
    async fn test_profile_endpoints_accept_any_method() {
        let server = TestServer::start(2, 5).await;

        let (status, body) = request(server.addr, "GET", "/constant").await;
        assert!(status.contains("200"), "{}", status);
        assert!(body.contains("Request 0 of type Constant executed."));

        let (status, body) = request(server.addr, "POST", "/stablevariable").await;
        assert!(status.contains("200"), "{}", status);
        assert!(body.contains("Request 1 of type StableVariable executed."));

        let (status, _) = request(server.addr, "DELETE", "/bimodal").await;
        assert!(status.contains("200"), "{}", status);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let server = TestServer::start(1, 1).await;
        let (status, _) = request(server.addr, "GET", "/fast").await;
        assert!(status.contains("404"), "{}", status);
        assert_eq!(server.dispatcher.requests_issued(), 0);
        server.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_requests_get_unique_indices() {
        let server = TestServer::start(5, 10).await;

        let mut set = JoinSet::new();
        for i in 0..40 {
            let addr = server.addr;
            let path = ProfileKind::ALL[i % 7].path();
            set.spawn(async move { request(addr, "GET", path).await });
        }

        let mut indices = HashSet::new();
        while let Some(joined) = set.join_next().await {
            let (status, body) = joined.unwrap();
            assert!(status.contains("200"), "{}", status);
            assert!(indices.insert(reported_index(&body)));
        }
        assert_eq!(indices, (0..40).collect::<HashSet<_>>());

        server.stop().await;
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let server = TestServer::start(1, 2).await;
        request(server.addr, "GET", "/longtail").await;
        request(server.addr, "GET", "/longtail").await;

        let (status, body) = request(server.addr, "GET", "/stats").await;
        assert!(status.contains("200"));
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["requests_issued"], 2);
        assert_eq!(json["workers"], 1);
        let long_tail = &json["profiles"][ProfileKind::LongTail as usize];
        assert_eq!(long_tail["profile"], "longtail");
        assert_eq!(long_tail["requests"], 2);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_closed_pool_is_503() {
        let server = TestServer::start(1, 1).await;
        server.dispatcher.shutdown();
        let (status, _) = request(server.addr, "GET", "/stable").await;
        assert!(status.contains("503"), "{}", status);
        server.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_shutdown_completes_sleeping_requests() {
        let server = TestServer::start(1, 60_000).await;
        let addr = server.addr;
        let pending = tokio::spawn(async move { request(addr, "GET", "/constant").await });

        tokio::time::sleep(Duration::from_millis(200)).await;
        let dispatcher = Arc::clone(&server.dispatcher);
        tokio::time::timeout(Duration::from_secs(10), server.stop())
            .await
            .unwrap();

        let (status, body) = pending.await.unwrap();
        assert!(status.contains("200"), "{}", status);
        assert!(body.contains("Request 0 of type Constant executed."));
        assert_eq!(dispatcher.stats().summary(ProfileKind::Constant).interrupted, 1);
    }
}
