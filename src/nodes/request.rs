use crate::fetch::{FetchRequest, FetchResponse, HttpMethod, SharedFetcher};
use crate::node::{EvalContext, NodeSchema, NodeType, PortType};
use crate::value::PortValue;
use serde_json::{Value, json};
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

const URL_INPUT: usize = 0;
const BODY_INPUT: usize = 1;
const RESPONSE_OUTPUT: usize = 0;
const STATUS_OUTPUT: usize = 1;

/// Status published alongside an error payload.
pub const FAILED_STATUS: u16 = 0;

/// Per-instance bookkeeping: the last completed exchange and the inbox of the
/// request currently in flight, if any.
#[derive(Debug, Default)]
pub struct RequestState {
    response: PortValue,
    status: PortValue,
    inbox: Option<oneshot::Receiver<(Value, u16)>>,
}

impl RequestState {
    pub fn in_flight(&self) -> bool {
        self.inbox.is_some()
    }

    fn store(&mut self, body: Value, status: u16) {
        self.response = PortValue::Json(body);
        self.status = PortValue::Json(json!(status));
    }

    /// Moves a finished request's outcome into the cache.
    fn drain_inbox(&mut self) {
        let Some(inbox) = self.inbox.as_mut() else {
            return;
        };
        match inbox.try_recv() {
            Ok((body, status)) => {
                self.store(body, status);
                self.inbox = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                self.store(error_payload("request task ended without a result"), FAILED_STATUS);
                self.inbox = None;
            }
        }
    }
}

fn error_payload(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// Fetches JSON from an HTTP endpoint without ever blocking the tick.
///
/// A tick either starts one request (when none is outstanding) or only
/// republishes the cached `Response`/`Status`. The background task reports
/// through a single-slot inbox that the next tick drains, so a result is never
/// visible on the tick that started the request.
pub struct RequestNode {
    schema: NodeSchema,
    fetcher: SharedFetcher,
    runtime: Handle,
}

impl RequestNode {
    pub const TYPE_NAME: &'static str = "api/request";
    pub const DEFAULT_URL: &'static str = "https://jsonplaceholder.typicode.com/todos/1";

    pub fn new(fetcher: SharedFetcher, runtime: Handle) -> Self {
        let schema = NodeSchema::new(Self::TYPE_NAME, "API Request", "Fetch JSON from an HTTP endpoint")
            .with_input("URL", PortType::String)
            .with_input("Body", PortType::Json)
            .with_output("Response", PortType::Json)
            .with_output("Status", PortType::Number)
            .with_text_property("url", Self::DEFAULT_URL)
            .with_combo_property("method", "GET", &HttpMethod::ALL);
        Self {
            schema,
            fetcher,
            runtime,
        }
    }

    fn resolve_url(ctx: &EvalContext<'_>) -> Option<String> {
        let url = match ctx.input(URL_INPUT).as_str() {
            Some(input) if !input.is_empty() => input,
            _ => ctx.property_str("url"),
        };
        (!url.is_empty()).then(|| url.to_string())
    }

    fn start(&self, ctx: &mut EvalContext<'_>, url: String) {
        let node_id = ctx.node_id();
        let method = match ctx.property_str("method").parse::<HttpMethod>() {
            Ok(method) => method,
            Err(e) => {
                tracing::warn!(target: crate::TRACING_TARGET, node = node_id, error = %e, "Request not started");
                ctx.state::<RequestState>()
                    .store(error_payload(e.to_string()), FAILED_STATUS);
                return;
            }
        };
        let body = match method {
            HttpMethod::Get => None,
            _ => ctx.input(BODY_INPUT).as_json().cloned(),
        };

        let (tx, rx) = oneshot::channel();
        ctx.state::<RequestState>().inbox = Some(rx);

        tracing::debug!(
            target: crate::TRACING_TARGET,
            node = node_id,
            %method,
            %url,
            "Starting request"
        );

        let fetcher = self.fetcher.clone();
        let request = FetchRequest { url, method, body };
        self.runtime.spawn(async move {
            let url = request.url.clone();
            let outcome = match fetcher.fetch(request).await {
                Ok(FetchResponse { status, body }) => (body, status),
                Err(e) => {
                    tracing::warn!(
                        target: crate::TRACING_TARGET,
                        node = node_id,
                        %url,
                        error = %e,
                        "Request failed"
                    );
                    (error_payload(e.to_string()), FAILED_STATUS)
                }
            };
            // The node may have been removed meanwhile; its result is then moot.
            let _ = tx.send(outcome);
        });
    }
}

impl NodeType for RequestNode {
    fn schema(&self) -> &NodeSchema {
        &self.schema
    }

    fn evaluate(&self, ctx: &mut EvalContext<'_>) {
        let in_flight = {
            let state = ctx.state::<RequestState>();
            state.drain_inbox();
            state.in_flight()
        };

        if !in_flight {
            if let Some(url) = Self::resolve_url(ctx) {
                self.start(ctx, url);
            }
        }

        let state = ctx.state::<RequestState>();
        let (response, status) = (state.response.clone(), state.status.clone());
        ctx.set_output(RESPONSE_OUTPUT, response);
        ctx.set_output(STATUS_OUTPUT, status);
    }
}
