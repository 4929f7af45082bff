use crate::client::SessionIdentity;
use crate::types::{LiveError, Result, WS_PATH_PREFIX, schemes};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Builds socket addresses for a page and opens connections to them
pub struct WebSocketFactory;

impl WebSocketFactory {
    /// Socket scheme for a page scheme, or `None` when this build cannot
    /// carry the transport.
    pub fn socket_scheme(page_scheme: &str) -> Option<&'static str> {
        match page_scheme {
            schemes::HTTP | schemes::WS => Some(schemes::WS),
            schemes::HTTPS | schemes::WSS if cfg!(feature = "tls") => Some(schemes::WSS),
            _ => None,
        }
    }

    /// Builds `ws(s)://<host>/ws/<identity>` for the page at `page_url`.
    ///
    /// # Errors
    ///
    /// Returns [`LiveError::Unsupported`] when the page scheme has no socket
    /// counterpart in this build or the page has no host.
    pub fn endpoint_url(page_url: &Url, identity: &SessionIdentity) -> Result<Url> {
        let scheme = Self::socket_scheme(page_url.scheme()).ok_or_else(|| {
            LiveError::Unsupported(format!("no socket transport for '{}' pages", page_url.scheme()))
        })?;
        let host = page_url
            .host_str()
            .ok_or_else(|| LiveError::Unsupported(format!("page '{}' has no host", page_url)))?;

        let authority = match page_url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Url::parse(&format!(
            "{}://{}{}/{}",
            scheme, authority, WS_PATH_PREFIX, identity
        ))?)
    }

    /// Create a new WebSocket connection
    pub async fn create(url: &Url) -> Result<WsStream> {
        tracing::debug!("Creating WebSocket connection to: {}", url);
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> SessionIdentity {
        SessionIdentity::from("1700000000000")
    }

    #[test]
    fn test_http_page_maps_to_ws() {
        let page = Url::parse("http://localhost:5096/").unwrap();
        let url = WebSocketFactory::endpoint_url(&page, &identity()).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:5096/ws/1700000000000");
    }

    #[test]
    fn test_page_path_and_query_are_ignored() {
        let page = Url::parse("http://10.30.3.41/status?refresh=1#top").unwrap();
        let url = WebSocketFactory::endpoint_url(&page, &identity()).unwrap();
        assert_eq!(url.as_str(), "ws://10.30.3.41/ws/1700000000000");
    }

    #[cfg(feature = "tls")]
    #[test]
    fn test_https_page_maps_to_wss() {
        let page = Url::parse("https://bok.example.org/").unwrap();
        let url = WebSocketFactory::endpoint_url(&page, &identity()).unwrap();
        assert_eq!(url.as_str(), "wss://bok.example.org/ws/1700000000000");
    }

    #[test]
    fn test_ipv6_host_keeps_brackets() {
        let page = Url::parse("http://[::1]:8080/").unwrap();
        let url = WebSocketFactory::endpoint_url(&page, &identity()).unwrap();
        assert_eq!(url.as_str(), "ws://[::1]:8080/ws/1700000000000");
    }

    #[test]
    fn test_unsupported_schemes() {
        for page in ["ftp://files.example.org/", "file:///tmp/index.html"] {
            let page = Url::parse(page).unwrap();
            assert!(matches!(
                WebSocketFactory::endpoint_url(&page, &identity()),
                Err(LiveError::Unsupported(_))
            ));
        }
    }
}
