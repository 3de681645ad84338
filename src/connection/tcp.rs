//! Raw TCP transport
//!
//! Line-oriented probing: connect, optionally send one line, read one line.

use std::io::ErrorKind;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use super::{ProbeError, ProbeResponse};
use crate::models::{ConnectionSpec, RequestSpec, Server};

/// A raw TCP connection to one server
#[derive(Debug)]
pub struct TcpConnection {
    stream: BufReader<TcpStream>,
    timeout: Duration,
    peer: String,
}

impl TcpConnection {
    pub async fn open(spec: &ConnectionSpec, server: &Server) -> Result<Self, ProbeError> {
        let peer = format!("{}:{}", server.host(), spec.port());
        debug!("Opening tcp connection to {}", peer);

        let connect = TcpStream::connect(&peer);
        let stream = match timeout(spec.timeout(), connect).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                return Err(ProbeError::ConnectionRefused(peer));
            }
            Ok(Err(e)) => return Err(ProbeError::Io(e.to_string())),
            Err(_) => return Err(ProbeError::Timeout(spec.timeout().as_secs())),
        };

        Ok(Self {
            stream: BufReader::new(stream),
            timeout: spec.timeout(),
            peer,
        })
    }

    /// Send the request's line (if any), then read one reply line.
    /// The reply, without its line terminator, becomes the response body.
    pub async fn run(&mut self, request: &RequestSpec) -> Result<ProbeResponse, ProbeError> {
        match timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout.as_secs())),
        }
    }

    async fn exchange(&mut self, request: &RequestSpec) -> Result<ProbeResponse, ProbeError> {
        if let Some(line) = &request.send {
            debug!("Sending '{}' to {}", line, self.peer);
            self.stream
                .write_all(format!("{line}\r\n").as_bytes())
                .await
                .map_err(|e| ProbeError::Io(e.to_string()))?;
            self.stream
                .flush()
                .await
                .map_err(|e| ProbeError::Io(e.to_string()))?;
        }

        let mut line = String::new();
        self.stream
            .read_line(&mut line)
            .await
            .map_err(|e| ProbeError::Io(e.to_string()))?;

        Ok(ProbeResponse {
            status_code: None,
            headers: Default::default(),
            body: line.trim_end_matches(['\r', '\n']).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConnectionKind;
    use tokio::net::TcpListener;

    fn spec(port: u16) -> ConnectionSpec {
        ConnectionSpec {
            kind: ConnectionKind::Tcp,
            port: Some(port),
            roles: vec!["smtp".to_string()],
            requests: Vec::new(),
            timeout_secs: Some(2),
        }
    }

    fn request(send: Option<&str>) -> RequestSpec {
        RequestSpec {
            method: "GET".to_string(),
            path: "/".to_string(),
            headers: Default::default(),
            body: None,
            send: send.map(|s| s.to_string()),
            checks: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_reads_banner_line() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"220 mail ready\r\n").await.unwrap();
        });

        let server = Server::new("127.0.0.1", &["smtp"]);
        let mut conn = TcpConnection::open(&spec(port), &server).await.unwrap();
        let response = conn.run(&request(None)).await.unwrap();

        assert_eq!(response.body, "220 mail ready");
        assert_eq!(response.status_code, None);
    }

    #[tokio::test]
    async fn test_sends_line_and_reads_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            assert_eq!(line.trim_end(), "PING");
            reader.write_all(b"PONG\r\n").await.unwrap();
        });

        let server = Server::new("127.0.0.1", &["smtp"]);
        let mut conn = TcpConnection::open(&spec(port), &server).await.unwrap();
        let response = conn.run(&request(Some("PING"))).await.unwrap();

        assert_eq!(response.body, "PONG");
    }

    #[tokio::test]
    async fn test_refused_connection_is_reported() {
        // Bind then drop to get a port with no listener
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let server = Server::new("127.0.0.1", &["smtp"]);
        let err = TcpConnection::open(&spec(port), &server).await.unwrap_err();
        assert_eq!(err.kind(), "ConnectionRefused");
    }

    #[tokio::test]
    async fn test_silent_peer_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        // Accept but never write anything back
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let mut connection_spec = spec(port);
        connection_spec.timeout_secs = Some(1);

        let server = Server::new("127.0.0.1", &["smtp"]);
        let mut conn = TcpConnection::open(&connection_spec, &server).await.unwrap();
        let err = conn.run(&request(None)).await.unwrap_err();
        assert_eq!(err.kind(), "Timeout");
    }
}
