//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::any,
    Router,
};
use dkim_relay::config::RelayConfig;
use dkim_relay::resilience::{Forwarder, RecordingSleeper};
use dkim_relay::upstream::ReqwestTransport;
use dkim_relay::{RelayServer, Shutdown};
use tokio::net::TcpListener;

pub const API_KEY: &str = "test-api-key";
pub const DKIM_DOMAIN: &str = "example.com";
pub const DKIM_PRIVATE_KEY: &str = "test-private-key";

/// One request as seen by the mock upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub method: String,
    pub content_type: Option<String>,
    pub body: String,
}

type Script = Arc<dyn Fn(usize) -> (u16, String) + Send + Sync>;

#[derive(Clone)]
struct UpstreamState {
    script: Script,
    hits: Arc<AtomicUsize>,
    captured: Arc<Mutex<Vec<Captured>>>,
}

/// Programmable upstream. `script` receives the 1-based attempt number.
pub struct MockUpstream {
    pub url: String,
    hits: Arc<AtomicUsize>,
    captured: Arc<Mutex<Vec<Captured>>>,
    task: tokio::task::JoinHandle<()>,
}

impl MockUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn upstream_handler(
    State(state): State<UpstreamState>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let attempt = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    state.captured.lock().unwrap().push(Captured {
        method: method.to_string(),
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        body,
    });

    let (status, body) = (state.script)(attempt);
    (
        StatusCode::from_u16(status).unwrap(),
        [(CONTENT_TYPE, "application/json")],
        body,
    )
}

pub async fn start_programmable_upstream<F>(script: F) -> MockUpstream
where
    F: Fn(usize) -> (u16, String) + Send + Sync + 'static,
{
    let state = UpstreamState {
        script: Arc::new(script),
        hits: Arc::new(AtomicUsize::new(0)),
        captured: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/tx/v1/send", any(upstream_handler))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockUpstream {
        url: format!("http://{addr}/tx/v1/send"),
        hits: state.hits,
        captured: state.captured,
        task,
    }
}

/// An address nothing is listening on.
pub async fn closed_upstream_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/tx/v1/send")
}

pub fn test_config(upstream_url: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.url = upstream_url.into();
    config.credentials.api_key = API_KEY.into();
    config.credentials.dkim_domain = DKIM_DOMAIN.into();
    config.credentials.dkim_private_key = DKIM_PRIVATE_KEY.into();
    config
}

/// A running relay whose retry pauses are recorded instead of slept.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub sleeper: Arc<RecordingSleeper>,
    shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_relay(config: RelayConfig) -> TestRelay {
    let sleeper = Arc::new(RecordingSleeper::new());
    let forwarder = Forwarder::new(
        Arc::new(ReqwestTransport::with_client(client(), Duration::from_secs(5))),
        sleeper.clone(),
        config.upstream.retry_delay(),
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = RelayServer::with_forwarder(config, forwarder);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestRelay {
        addr,
        sleeper,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
