//! Shared mock nodes and registry for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;

use llm_relay::{ChatNode, ChatRequest, ChatResponse, ChatStream, NodeError, NodeRegistry};

type ChatHandler = Box<dyn Fn(u32, &ChatRequest) -> Result<ChatResponse, NodeError> + Send + Sync>;

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Programmable backend node: scripted chat outcomes, optional chunk
/// script for streaming, togglable probe result, call counters.
pub struct MockNode {
    id: String,
    pub chat_calls: AtomicU32,
    pub probe_calls: AtomicU32,
    pub probe_ok: AtomicBool,
    handler: ChatHandler,
    stream_script: Option<Vec<Result<String, String>>>,
}

impl MockNode {
    pub fn programmable<F>(id: &str, handler: F) -> Arc<Self>
    where
        F: Fn(u32, &ChatRequest) -> Result<ChatResponse, NodeError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            id: id.to_string(),
            chat_calls: AtomicU32::new(0),
            probe_calls: AtomicU32::new(0),
            probe_ok: AtomicBool::new(true),
            handler: Box::new(handler),
            stream_script: None,
        })
    }

    /// Node that always answers with a fixed text.
    pub fn ok(id: &str) -> Arc<Self> {
        let text = id.to_string();
        Self::programmable(id, move |_, _| Ok(ChatResponse::from_text(text.clone())))
    }

    /// Node whose every call fails.
    pub fn failing(id: &str) -> Arc<Self> {
        let message = format!("{id} is down");
        Self::programmable(id, move |_, _| Err(NodeError::Upstream(message.clone())))
    }

    /// Node whose `chat_stream` yields the given chunk script on every
    /// call: `Ok(text)` becomes a chunk, `Err(msg)` breaks the stream.
    pub fn streaming(id: &str, script: &[Result<&str, &str>]) -> Arc<Self> {
        let owned: Vec<Result<String, String>> = script
            .iter()
            .map(|item| match item {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => Err(msg.to_string()),
            })
            .collect();
        Arc::new(Self {
            id: id.to_string(),
            chat_calls: AtomicU32::new(0),
            probe_calls: AtomicU32::new(0),
            probe_ok: AtomicBool::new(true),
            handler: Box::new(|_, _| Err(NodeError::Upstream("stream-only node".into()))),
            stream_script: Some(owned),
        })
    }
}

#[async_trait]
impl ChatNode for MockNode {
    fn id(&self) -> &str {
        &self.id
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, NodeError> {
        let call = self.chat_calls.fetch_add(1, Ordering::SeqCst);
        (self.handler)(call, &request)
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatStream, NodeError> {
        let call = self.chat_calls.fetch_add(1, Ordering::SeqCst);
        match &self.stream_script {
            Some(script) => {
                let items: Vec<Result<ChatResponse, NodeError>> = script
                    .iter()
                    .map(|item| match item {
                        Ok(text) => Ok(ChatResponse::from_text(text.clone())),
                        Err(msg) => Err(NodeError::Stream(msg.clone())),
                    })
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
            None => {
                let response = (self.handler)(call, &request)?;
                Ok(Box::pin(stream::iter(vec![Ok(response)])))
            }
        }
    }

    async fn self_test(&self) -> Result<(), NodeError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.probe_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(NodeError::Probe("mock probe down".into()))
        }
    }
}

/// Registry backed by a mutable node list.
#[derive(Default)]
pub struct StaticRegistry {
    nodes: Mutex<Vec<Arc<dyn ChatNode>>>,
}

impl StaticRegistry {
    pub fn new(nodes: Vec<Arc<dyn ChatNode>>) -> Arc<Self> {
        Arc::new(Self {
            nodes: Mutex::new(nodes),
        })
    }

    #[allow(dead_code)]
    pub fn push(&self, node: Arc<dyn ChatNode>) {
        self.nodes.lock().unwrap().push(node);
    }
}

impl NodeRegistry for StaticRegistry {
    fn list_nodes(&self) -> Vec<Arc<dyn ChatNode>> {
        self.nodes.lock().unwrap().clone()
    }
}
