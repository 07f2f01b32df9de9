//! Bounded-timeout HTTP reads.
//!
//! [`Fetcher::fetch`] is the only network boundary of the job. Every failure
//! (DNS, connect, timeout, non-2xx status, body read) is logged and surfaces
//! as `None`, so callers degrade to "less data" instead of aborting the run.

use crate::error::Result;
use reqwest::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tracing::{debug, error, instrument, warn};

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    ///
    /// System proxy settings from the environment are honoured.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::from_builder(Self::client_builder(timeout))
    }

    /// Client settings every fetcher starts from: timeout and user agent.
    pub fn client_builder(timeout: Duration) -> ClientBuilder {
        Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
    }

    /// Build a fetcher from a customized [`Fetcher::client_builder`].
    pub fn from_builder(builder: ClientBuilder) -> Result<Self> {
        Ok(Self { client: builder.build()? })
    }

    /// Plain GET returning the full body; non-2xx statuses are errors.
    pub async fn try_fetch(&self, url: &str) -> Result<Vec<u8>> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(body.to_vec())
    }

    /// Fetch `url`, returning `None` on any failure or an empty body.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        let t0 = Instant::now();
        match self.try_fetch(url).await {
            Ok(body) if body.is_empty() => {
                warn!(%url, "Fetch returned an empty body");
                None
            }
            Ok(body) => {
                debug!(%url, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched");
                Some(body)
            }
            Err(e) => {
                error!(%url, error = %e, elapsed_ms = t0.elapsed().as_millis() as u64, "Fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    //! Minimal HTTP/1.1 responder for exercising the fetcher and pipeline
    //! against real sockets.

    use super::Fetcher;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `routes` (path, status, body) until the test runtime shuts down.
    pub async fn serve(routes: Vec<(&'static str, u16, Vec<u8>)>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, b.clone()))
                    .unwrap_or((404, Vec::new()));
                let header = format!(
                    "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    status,
                    body.len()
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(&body).await;
                let _ = socket.shutdown().await;
            }
        });
        addr
    }

    /// Production client settings, but connecting to loopback directly
    /// rather than through whatever proxy the environment configures.
    pub fn direct_fetcher() -> Fetcher {
        Fetcher::from_builder(Fetcher::client_builder(Duration::from_secs(5)).no_proxy()).unwrap()
    }

    /// An address nothing listens on.
    pub async fn closed_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }
}
