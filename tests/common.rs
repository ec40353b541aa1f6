//! Common test utilities: registries, a scripted fetcher and graph helpers.
use async_trait::async_trait;
use jsonflow::prelude::*;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::result::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A registry with every node type that needs no network access.
#[allow(dead_code)]
pub fn pure_registry() -> Arc<NodeRegistry> {
    let mut registry = NodeRegistry::new();
    registry.register(Arc::new(PropertyNode::new())).unwrap();
    registry.register(Arc::new(FilterNode::new())).unwrap();
    registry.register(Arc::new(MergeNode::new())).unwrap();
    registry.register(Arc::new(TemplateNode::new())).unwrap();
    registry.register(Arc::new(WatchNode::new())).unwrap();
    registry.register(Arc::new(StringConstantNode::new())).unwrap();
    registry.register(Arc::new(JsonConstantNode::new())).unwrap();
    Arc::new(registry)
}

/// A registry with all built-in nodes, backed by `fetcher`. Must be called
/// from inside a tokio runtime.
#[allow(dead_code)]
pub fn registry_with(fetcher: Arc<MockFetcher>) -> Arc<NodeRegistry> {
    let registry =
        NodeRegistry::with_builtin_nodes(fetcher, tokio::runtime::Handle::current()).unwrap();
    Arc::new(registry)
}

#[allow(dead_code)]
pub enum Reply {
    Json { status: u16, body: Value },
    NotJson { status: u16 },
    /// The request task dies before reporting.
    Panic,
}

/// A `Fetcher` that records every request and answers with a fixed reply.
///
/// When gated, each request waits for a permit from [`MockFetcher::release`]
/// before answering, which keeps it "in flight" for as long as a test needs.
#[allow(dead_code)]
pub struct MockFetcher {
    calls: AtomicUsize,
    requests: Mutex<Vec<FetchRequest>>,
    reply: Reply,
    gate: Option<Semaphore>,
}

#[allow(dead_code)]
impl MockFetcher {
    pub fn replying(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self::new(Reply::Json { status, body }, None))
    }

    pub fn gated(status: u16, body: Value) -> Arc<Self> {
        Arc::new(Self::new(
            Reply::Json { status, body },
            Some(Semaphore::new(0)),
        ))
    }

    pub fn not_json(status: u16) -> Arc<Self> {
        Arc::new(Self::new(Reply::NotJson { status }, None))
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self::new(Reply::Panic, None))
    }

    fn new(reply: Reply, gate: Option<Semaphore>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reply,
            gate,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Lets one gated request complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        match &self.reply {
            Reply::Json { status, body } => Ok(FetchResponse {
                status: *status,
                body: body.clone(),
            }),
            Reply::NotJson { status } => Err(FetchError::InvalidJson {
                status: *status,
                source: serde_json::from_str::<Value>("<html>").unwrap_err(),
            }),
            Reply::Panic => panic!("mock fetcher gave up"),
        }
    }
}

/// Lets spawned tasks run, then ticks, until the node's `slot` output is
/// no longer absent (or gives up after a while).
#[allow(dead_code)]
pub async fn tick_until_output(graph: &mut Graph, node: NodeId, slot: usize) {
    for _ in 0..200 {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        graph.tick();
        if !graph.output(node, slot).map_or(true, PortValue::is_absent) {
            return;
        }
    }
}

/// A graph with a single JSON constant feeding a node of `type_name` on input 0.
#[allow(dead_code)]
pub fn fed_by_constant(type_name: &str, input: Value) -> (Graph, NodeId, NodeId) {
    let mut graph = Graph::new(pure_registry());
    let source = graph.add_node(JsonConstantNode::TYPE_NAME).unwrap();
    graph
        .set_property(source, "value", Value::String(input.to_string()))
        .unwrap();
    let node = graph.add_node(type_name).unwrap();
    graph.connect(source, 0, node, 0).unwrap();
    (graph, source, node)
}

/// A sample array of todo items.
#[allow(dead_code)]
pub fn sample_todos() -> Value {
    json!([
        { "id": 1, "title": "Buy milk", "completed": true, "priority": 3 },
        { "id": 2, "title": "Write report", "completed": false, "priority": 10 },
        { "id": 3, "title": "Call MOM", "completed": true, "priority": 7 },
        { "id": 4, "title": "Fix bike", "completed": false }
    ])
}

/// Parks the test briefly so spawned request tasks get to run.
#[allow(dead_code)]
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
}

/// Serves exactly one canned HTTP response on a loopback port. Returns the
/// base URL and a handle yielding the raw request text that was received.
#[allow(dead_code)]
pub async fn serve_once(
    status_line: &'static str,
    body: &'static str,
) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/items", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (url, handle)
}

/// Reads one request: headers plus a `Content-Length` body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    use tokio::io::AsyncReadExt;

    let mut data = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

/// A loopback URL nothing listens on.
#[allow(dead_code)]
pub async fn refused_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}
