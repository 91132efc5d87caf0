//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use node_healthchecker::config::HealthcheckerConfig;
use node_healthchecker::{HttpServer, Shutdown};

/// Canned upstream reply.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    pub fn rpc_result(result: Value) -> Self {
        Self::json(json!({"jsonrpc": "2.0", "id": 0, "result": result}))
    }

    pub fn rpc_error(code: i64, message: &str) -> Self {
        Self::json(json!({"jsonrpc": "2.0", "id": 0, "error": {"code": code, "message": message}}))
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, [("content-type", "application/json")], self.body).into_response()
    }
}

#[derive(Default)]
struct MockState {
    /// JSON-RPC replies keyed by method.
    rpc: Mutex<HashMap<String, Reply>>,
    /// REST replies keyed by path (no leading slash).
    rest: Mutex<HashMap<String, Reply>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

/// Programmable upstream node: answers JSON-RPC on `POST /` and REST on
/// `GET /<path>`.
#[derive(Clone)]
pub struct MockUpstream {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/", post(rpc_handler))
            .route("/{*path}", get(rest_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn on_rpc(&self, method: &str, reply: Reply) -> &Self {
        self.state.rpc.lock().unwrap().insert(method.to_string(), reply);
        self
    }

    pub fn on_get(&self, path: &str, reply: Reply) -> &Self {
        self.state.rest.lock().unwrap().insert(path.to_string(), reply);
        self
    }

    /// Delay every reply.
    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = delay;
    }

    /// Number of requests received so far.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }
}

async fn rpc_handler(State(state): State<Arc<MockState>>, Json(request): Json<Value>) -> Reply {
    let delay = record_call(&state);
    tokio::time::sleep(delay).await;

    let method = request["method"].as_str().unwrap_or_default();
    let reply = state.rpc.lock().unwrap().get(method).cloned();
    reply.unwrap_or_else(|| Reply::rpc_error(-32601, "the method does not exist/is not available"))
}

async fn rest_handler(State(state): State<Arc<MockState>>, Path(path): Path<String>) -> Reply {
    let delay = record_call(&state);
    tokio::time::sleep(delay).await;

    let reply = state.rest.lock().unwrap().get(&path).cloned();
    reply.unwrap_or_else(|| Reply::raw(404, "not found"))
}

fn record_call(state: &MockState) -> Duration {
    state.calls.fetch_add(1, Ordering::SeqCst);
    *state.delay.lock().unwrap()
}

pub fn now_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

/// `eth_syncing` payload of a node that is still syncing.
pub fn eth_syncing(current: u64, highest: u64) -> Value {
    json!({
        "startingBlock": "0x0",
        "currentBlock": format!("{:#x}", current),
        "highestBlock": format!("{:#x}", highest),
    })
}

/// `eth_getBlockByNumber` payload with the given timestamp.
pub fn latest_block(timestamp: u64) -> Value {
    json!({"number": "0x10", "timestamp": format!("{:#x}", timestamp)})
}

/// `optimism_syncStatus` payload.
pub fn op_sync_status(current_l1: u64, head_l1: u64, unsafe_l2_timestamp: u64) -> Value {
    json!({
        "current_l1": {"hash": "0x01", "number": current_l1, "parentHash": "0x00", "timestamp": 0},
        "head_l1": {"hash": "0x02", "number": head_l1, "parentHash": "0x00", "timestamp": 0},
        "unsafe_l2": {"hash": "0x03", "number": 100, "timestamp": unsafe_l2_timestamp},
    })
}

/// Config with a short per-check timeout and caching disabled.
pub fn test_config() -> HealthcheckerConfig {
    let mut config = HealthcheckerConfig::default();
    config.server.listen_address = "127.0.0.1:0".into();
    config.healthcheck.timeout = Duration::from_millis(500);
    config.healthcheck.cache_cool_off = Duration::ZERO;
    config
}

/// Running healthchecker under test.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub async fn start(config: HealthcheckerConfig) -> Self {
        let server = HttpServer::new(config).expect("server builds");
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let shutdown = Shutdown::new();
        let server_shutdown = shutdown.subscribe();
        let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
