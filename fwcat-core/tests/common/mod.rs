//! Shared helpers for catalog integration tests
//!
//! Fixture catalogs shaped like the condensed ipsw.me documents, plus a
//! tiny HTTP server standing in for mirrors.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Initialize logging for tests (only once per test run)
static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// (version, build) pairs per device
pub type DeviceFixture<'a> = (&'a str, &'a [(&'a str, &'a str)]);

fn device_body(builds: &[(&str, &str)]) -> serde_json::Value {
    let firmwares: Vec<serde_json::Value> = builds
        .iter()
        .map(|(version, build)| {
            serde_json::json!({
                "identifier": "fixture",
                "version": version,
                "buildid": build,
                "url": format!("https://updates.example/{build}.ipsw"),
                "signed": true,
                "filesize": 4_000_000_000u64,
            })
        })
        .collect();
    serde_json::json!({ "name": "fixture device", "firmwares": firmwares })
}

/// Release-style catalog with a top-level "devices" object
pub fn release_catalog(devices: &[DeviceFixture<'_>]) -> Vec<u8> {
    let devices: serde_json::Map<String, serde_json::Value> = devices
        .iter()
        .map(|(name, builds)| (name.to_string(), device_body(builds)))
        .collect();
    serde_json::to_vec_pretty(&serde_json::json!({ "devices": devices })).unwrap()
}

/// OTA-style catalog whose root is the device mapping
pub fn ota_catalog(devices: &[DeviceFixture<'_>]) -> Vec<u8> {
    let devices: serde_json::Map<String, serde_json::Value> = devices
        .iter()
        .map(|(name, builds)| (name.to_string(), device_body(builds)))
        .collect();
    serde_json::to_vec_pretty(&devices).unwrap()
}

/// Canned HTTP responses keyed by request path
#[derive(Clone, Default)]
pub struct MirrorServer {
    routes: Arc<Mutex<HashMap<String, (u16, Vec<u8>)>>>,
    hits: Arc<Mutex<Vec<String>>>,
}

impl MirrorServer {
    pub fn route(self, path: &str, status: u16, body: Vec<u8>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body));
        self
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    /// Bind to an ephemeral port and serve until the runtime shuts down
    pub async fn start(&self) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let server = self.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let server = server.clone();
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&buf[..n]),
                        }
                    }

                    let request = String::from_utf8_lossy(&request);
                    let path = request
                        .split_whitespace()
                        .nth(1)
                        .unwrap_or("/")
                        .to_string();
                    server.hits.lock().unwrap().push(path.clone());

                    let (status, body) = server
                        .routes
                        .lock()
                        .unwrap()
                        .get(&path)
                        .cloned()
                        .unwrap_or((404, b"not found".to_vec()));

                    let head = format!(
                        "HTTP/1.1 {status} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        body.len()
                    );
                    let _ = stream.write_all(head.as_bytes()).await;
                    let _ = stream.write_all(&body).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        base
    }
}
