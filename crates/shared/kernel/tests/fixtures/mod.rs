use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::JoinHandle;
use tokio::sync::oneshot;

/// An in-process settings endpoint running on its own runtime thread.
///
/// The blocking HTTP client used by the remote source must not run inside an async
/// runtime, so the server lives on a dedicated thread and tests stay synchronous.
pub struct SettingsEndpoint {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SettingsEndpoint {
    /// Starts the endpoint with the standard test routes.
    ///
    /// # Panics
    /// * If the listener cannot be bound or the runtime cannot be built.
    #[must_use]
    pub fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/flat",
                get(|| async {
                    Json(json!({
                        "DEBUG": true,
                        "MONGO_URL": "mongodb://remote/abc",
                        "REDIS_PORT": "6380",
                        "CORS_ALLOWED_ORIGINS": ["https://remote.example"],
                        "FEATURE_ROLLOUT": "beta"
                    }))
                }),
            )
            .route(
                "/list",
                get(|| async {
                    Json(json!([
                        { "name": "NCCM", "value": true },
                        { "name": "MONGO_URL", "value": "mongodb://listed/abc" }
                    ]))
                }),
            )
            .route("/broken", get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }))
            .route("/garbage", get(|| async { "definitely not json" }))
            .route("/array", get(|| async { Json(json!([1, 2, 3])) }))
            .route(
                "/counted",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(json!({ "ITSM": "yes" }))
                }),
            )
            .with_state(Arc::clone(&hits));

        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(1)
                .enable_all()
                .build()
                .expect("test runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
                addr_tx.send(listener.local_addr().expect("local addr")).expect("send addr");
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve settings endpoint");
            });
        });

        let addr = addr_rx.recv().expect("settings endpoint address");
        Self { addr, hits, shutdown: Some(shutdown_tx), thread: Some(thread) }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Number of requests served by `/counted`.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for SettingsEndpoint {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
