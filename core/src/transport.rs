//! Blocking HTTP execution of `HttpRequest` values.
//!
//! # Design
//! `Transport` is the only place the client touches the network. The default
//! `UreqTransport` keeps 4xx/5xx responses as data so `SyncClient` decides
//! what a status means. Nothing is retried.

use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes a GET and returns the full response.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// `ureq`-backed blocking transport.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds the whole round-trip; `None` waits indefinitely.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Some(crate::config::DEFAULT_TIMEOUT))
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let mut response = builder.call().map_err(|e| {
            tracing::warn!(url = %request.url, error = %e, "daemon request failed");
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                let value = value.to_str().ok()?;
                Some((name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // The daemon answered; only a stalled or dropped stream is a transport failure.
        let body = response.body_mut().read_to_string().map_err(|e| match e {
            ureq::Error::Timeout(_) => ApiError::Transport(e.to_string()),
            ureq::Error::Io(ref io) if io.kind() != std::io::ErrorKind::InvalidData => {
                ApiError::Transport(e.to_string())
            }
            _ => ApiError::DeserializationError(e.to_string()),
        })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::time::Instant;

    /// Accept one connection, read the request head, then hand the stream to `reply`.
    fn serve_once(reply: impl FnOnce(std::net::TcpStream) + Send + 'static) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            reply(stream);
        });
        format!("http://{addr}/api?method=get_os")
    }

    fn get(url: String) -> HttpRequest {
        HttpRequest {
            url,
            headers: Vec::new(),
        }
    }

    #[test]
    fn non_utf8_body_is_deserialization_error() {
        let url = serve_once(|mut stream| {
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\n\xff\xfe{}")
                .unwrap();
        });
        let err = UreqTransport::new(Some(Duration::from_secs(5)))
            .execute(&get(url))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)), "{err}");
        assert!(!err.is_transport());
    }

    #[test]
    fn response_headers_are_kept() {
        let url = serve_once(|mut stream| {
            stream
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
                )
                .unwrap();
        });
        let response = UreqTransport::new(Some(Duration::from_secs(5)))
            .execute(&get(url))
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "{}");
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn stalled_daemon_times_out_as_transport_error() {
        let url = serve_once(|stream| {
            std::thread::sleep(Duration::from_secs(5));
            drop(stream);
        });
        let started = Instant::now();
        let err = UreqTransport::new(Some(Duration::from_secs(1)))
            .execute(&get(url))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "{err}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        assert_eq!(crate::config::DEFAULT_TIMEOUT, Duration::from_secs(30));
        let config = crate::config::ClientConfig::new("127.0.0.1:8888").unwrap();
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.with_timeout(Some(Duration::from_secs(1))).timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn unreachable_endpoint_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let err = UreqTransport::new(Some(Duration::from_secs(5)))
            .execute(&get(format!("http://{addr}/api?method=get_os")))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(err.is_transport());
    }
}
