#![allow(dead_code)]

use domain_insight::ClientConfig;
use std::net::TcpListener;
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

/// A wiremock backend plus the runtime used to configure it. The client
/// under test is blocking, so it is always called outside `rt.block_on`.
pub struct Backend {
    pub server: MockServer,
    pub rt: Runtime,
}

impl Backend {
    pub fn start() -> Self {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("build test runtime");
        let server = rt.block_on(MockServer::start());
        Backend { server, rt }
    }

    pub fn mount(&self, mock: Mock) {
        self.rt.block_on(mock.mount(&self.server));
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::default().with_backend_url(self.server.uri())
    }

    pub fn requests(&self) -> Vec<Request> {
        self.rt
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect()
    }
}

/// Address nothing listens on: bind an ephemeral port, then release it.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

pub fn unreachable_config() -> ClientConfig {
    ClientConfig::default().with_backend_url(unreachable_url())
}
