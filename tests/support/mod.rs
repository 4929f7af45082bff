use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::{WebSocketStream, accept_hdr_async};

pub const WAIT: Duration = Duration::from_secs(5);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Local live-property server that hands every accepted socket to the test
pub struct TestServer {
    pub addr: SocketAddr,
    accepted: mpsc::UnboundedReceiver<ServerConn>,
}

pub struct ServerConn {
    pub path: String,
    pub accepted_at: Instant,
    ws: WebSocketStream<TcpStream>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, accepted) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let path = Arc::new(Mutex::new(String::new()));
                    let path_for_handshake = Arc::clone(&path);
                    let callback = move |req: &Request,
                                         resp: Response|
                          -> Result<Response, ErrorResponse> {
                        *path_for_handshake.lock().unwrap() = req.uri().path().to_string();
                        Ok(resp)
                    };

                    if let Ok(ws) = accept_hdr_async(stream, callback).await {
                        let path = path.lock().unwrap().clone();
                        let _ = tx.send(ServerConn {
                            path,
                            accepted_at: Instant::now(),
                            ws,
                        });
                    }
                });
            }
        });

        Self { addr, accepted }
    }

    pub fn page_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Next accepted connection; panics after [`WAIT`]
    pub async fn accept(&mut self) -> ServerConn {
        tokio::time::timeout(WAIT, self.accepted.recv())
            .await
            .expect("timed out waiting for a connection")
            .expect("server stopped")
    }

    /// Next accepted connection within `window`, if any
    pub async fn try_accept(&mut self, window: Duration) -> Option<ServerConn> {
        tokio::time::timeout(window, self.accepted.recv())
            .await
            .ok()
            .flatten()
    }
}

impl ServerConn {
    pub async fn send_text(&mut self, text: &str) {
        self.ws.send(Message::Text(text.into())).await.unwrap();
    }

    /// Next text frame from the client, `None` once the socket closes
    pub async fn next_text(&mut self) -> Option<String> {
        let read = async {
            while let Some(msg) = self.ws.next().await {
                match msg {
                    Ok(Message::Text(text)) => return Some(text.as_str().to_owned()),
                    Ok(Message::Close(_)) | Err(_) => return None,
                    Ok(_) => {}
                }
            }
            None
        };
        tokio::time::timeout(WAIT, read)
            .await
            .expect("timed out waiting for a client frame")
    }

    /// Sends `{"heartbeat":"ping"}` and waits for the reply, which also
    /// proves every earlier frame was processed.
    pub async fn ping(&mut self) -> Option<String> {
        self.send_text(r#"{"heartbeat":"ping"}"#).await;
        self.next_text().await
    }

    /// Clean close handshake initiated by the server
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
        let _ = tokio::time::timeout(WAIT, async {
            while let Some(Ok(_)) = self.ws.next().await {}
        })
        .await;
    }

    /// Drops the TCP connection without a close handshake
    pub fn kill(self) {
        drop(self.ws);
    }
}
