use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use diskdrop_core::net::codec::{decode_server, encode_client, FRAME_LEN};
use diskdrop_core::net::messages::{ClientMessage, ServerMessage};
use diskdrop_server::config::ServerConfig;
use diskdrop_server::Server;

pub struct TestServer {
    pub addr: SocketAddr,
    _serve: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with default rules on an ephemeral port.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(mut config: ServerConfig) -> Self {
        config.listen_addr = "127.0.0.1:0".to_string();
        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let _ = server.serve().await;
        });

        Self {
            addr,
            _serve: handle,
        }
    }
}

/// One TCP client speaking the fixed-frame protocol.
pub struct TestClient {
    stream: TcpStream,
}

impl TestClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        Self { stream }
    }

    pub async fn send(&mut self, msg: &ClientMessage) {
        let frame = encode_client(msg);
        self.stream.write_all(&frame).await.unwrap();
    }

    /// Read the next server message (5s timeout).
    pub async fn read_msg(&mut self) -> ServerMessage {
        let mut frame = [0u8; FRAME_LEN];
        tokio::time::timeout(Duration::from_secs(5), self.stream.read_exact(&mut frame))
            .await
            .expect("timed out waiting for server message")
            .expect("connection closed while waiting for server message");
        decode_server(&frame).unwrap()
    }

    /// Try to read a message, returning None on timeout or close.
    pub async fn try_read_msg(&mut self, timeout_ms: u64) -> Option<ServerMessage> {
        let mut frame = [0u8; FRAME_LEN];
        let read = tokio::time::timeout(
            Duration::from_millis(timeout_ms),
            self.stream.read_exact(&mut frame),
        )
        .await
        .ok()?;
        read.ok()?;
        Some(decode_server(&frame).unwrap())
    }
}
