//! Local HTTP servers standing in for provider back-ends.

use std::sync::{Arc, Mutex};

use scribe_types::llm::CapabilityDescriptor;

/// Request bodies seen by a mock server, in arrival order.
#[derive(Clone, Default)]
pub(crate) struct Captured(Arc<Mutex<Vec<serde_json::Value>>>);

impl Captured {
    pub(crate) fn push(&self, body: serde_json::Value) {
        self.0.lock().unwrap().push(body);
    }

    pub(crate) fn bodies(&self) -> Vec<serde_json::Value> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> serde_json::Value {
        self.bodies().pop().expect("no request captured")
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub(crate) async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing listens on.
pub(crate) async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub(crate) fn descriptor(id: &str, context_length: u32, accepts_images: bool) -> CapabilityDescriptor {
    CapabilityDescriptor {
        id: id.to_string(),
        display_name: id.to_string(),
        description: String::new(),
        traits: String::new(),
        accepts_images,
        context_length,
        supports_json: true,
    }
}
