// # HTTP IP Source
//
// Detects the public IP address by asking an echo service that answers a
// plain-text GET with the caller's address.
//
// ## Behavior
//
// - One URL per address family (the v4 host only answers over IPv4, the v6
//   host only over IPv6)
// - One request per call, no caching and no retries
// - The body is returned with its trailing newline removed and is not
//   validated; the DNS provider rejects malformed content

use async_trait::async_trait;
use cfddns_core::traits::{IpSource, IpVersion};
use cfddns_core::{DdnsConfig, Error, Result};

/// HTTP echo-service IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    client: reqwest::Client,
    v4_url: String,
    v6_url: String,
}

impl HttpIpSource {
    /// Create a source sharing `client`
    pub fn new(
        client: reqwest::Client,
        v4_url: impl Into<String>,
        v6_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            v4_url: v4_url.into(),
            v6_url: v6_url.into(),
        }
    }

    /// Create a source for the configured echo URLs
    pub fn from_config(client: reqwest::Client, config: &DdnsConfig) -> Self {
        Self::new(client, &config.ipv4_echo_url, &config.ipv6_echo_url)
    }

    /// Echo URL for an address family
    pub fn url(&self, version: IpVersion) -> &str {
        match version {
            IpVersion::V4 => &self.v4_url,
            IpVersion::V6 => &self.v6_url,
        }
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self, version: IpVersion) -> Result<String> {
        let url = self.url(version);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                Error::ip_source(format!("{} request to {} failed: {}", version, url, e))
            })?;

        if !response.status().is_success() {
            return Err(Error::ip_source(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_source(format!("Failed to read response from {}: {}", url, e)))?;

        let ip = strip_trailing_newline(&body).to_string();
        tracing::debug!(%version, ip = %ip, "Echo service answered");
        Ok(ip)
    }
}

/// Remove one trailing `\n` or `\r\n`
fn strip_trailing_newline(body: &str) -> &str {
    body.strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response on a local port
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/", addr)
    }

    fn client() -> reqwest::Client {
        // Loopback only; ignore any proxy configured in the environment
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn strips_only_the_trailing_newline() {
        assert_eq!(strip_trailing_newline("1.2.3.4\n"), "1.2.3.4");
        assert_eq!(strip_trailing_newline("1.2.3.4\r\n"), "1.2.3.4");
        assert_eq!(strip_trailing_newline("1.2.3.4"), "1.2.3.4");
        assert_eq!(strip_trailing_newline(" 1.2.3.4\n\n"), " 1.2.3.4\n");
        assert_eq!(strip_trailing_newline(""), "");
    }

    #[test]
    fn url_per_family() {
        let source = HttpIpSource::from_config(
            reqwest::Client::new(),
            &DdnsConfig::new("example.com", "token"),
        );
        assert_eq!(source.url(IpVersion::V4), "https://ipv4.icanhazip.com");
        assert_eq!(source.url(IpVersion::V6), "https://ipv6.icanhazip.com");
    }

    #[tokio::test]
    async fn returns_body_without_newline() {
        let url = serve_once("200 OK", "203.0.113.7\n").await;
        let source = HttpIpSource::new(client(), url, "http://unused.invalid/");

        assert_eq!(source.current(IpVersion::V4).await.unwrap(), "203.0.113.7");
    }

    #[tokio::test]
    async fn body_is_not_validated() {
        let url = serve_once("200 OK", "not-an-ip\n").await;
        let source = HttpIpSource::new(client(), "http://unused.invalid/", url);

        assert_eq!(source.current(IpVersion::V6).await.unwrap(), "not-an-ip");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let url = serve_once("503 Service Unavailable", "busy").await;
        let source = HttpIpSource::new(client(), url, "http://unused.invalid/");

        let err = source.current(IpVersion::V4).await.unwrap_err();
        assert!(matches!(err, Error::IpSource(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpIpSource::new(
            client(),
            format!("http://{}/", addr),
            "http://unused.invalid/",
        );

        assert!(matches!(
            source.current(IpVersion::V4).await,
            Err(Error::IpSource(_))
        ));
    }
}
