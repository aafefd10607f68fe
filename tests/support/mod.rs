//! Shared helpers for integration tests: a scripted fake backend.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// One scripted HTTP response.
pub struct CannedResponse {
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
}

impl CannedResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: "200 OK",
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn error(status: &'static str, body: &str) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.as_bytes().to_vec(),
        }
    }

    pub fn png(body: Vec<u8>) -> Self {
        Self {
            status: "200 OK",
            content_type: "image/png",
            body,
        }
    }
}

/// Serves a fixed sequence of responses, one connection each, and records the
/// raw request bytes it saw. `Connection: close` forces the client to open a
/// fresh connection per request so the sequence stays aligned.
pub struct FakeBackend {
    pub base_url: String,
    requests: mpsc::Receiver<String>,
}

impl FakeBackend {
    pub fn start(responses: Vec<CannedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut raw = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    let read = stream.read(&mut buf).unwrap_or(0);
                    if read == 0 {
                        break;
                    }
                    raw.extend_from_slice(&buf[..read]);
                    if request_complete(&raw) {
                        break;
                    }
                }
                let _ = tx.send(String::from_utf8_lossy(&raw).into_owned());
                let header = format!(
                    "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    response.status,
                    response.content_type,
                    response.body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&response.body);
            }
        });
        Self {
            base_url: format!("http://{addr}"),
            requests: rx,
        }
    }

    /// Next recorded request, in arrival order.
    pub fn next_request(&self) -> String {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("no request arrived")
    }
}

fn request_complete(raw: &[u8]) -> bool {
    let text = String::from_utf8_lossy(raw);
    let Some(split) = text.find("\r\n\r\n") else {
        return false;
    };
    let header = &text[..split];
    let body_len = text.len() - split - 4;
    let declared = header
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body_len >= declared
}
