//! Connection transports
//!
//! Opens connections against servers and runs requests over them.

mod http;
mod tcp;

pub use http::HttpConnection;
pub use tcp::TcpConnection;

use std::collections::HashMap;
use thiserror::Error;

use crate::models::{ConnectionKind, ConnectionSpec, RequestSpec, Server};

/// Transport-level failures, folded into outcome cells by the worker
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("connection refused to {0}")]
    ConnectionRefused(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("{0}")]
    RequestFailed(String),

    #[error("{0}")]
    Io(String),
}

impl ProbeError {
    /// Stable name used as the `<kind>` half of a classified cell
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeError::ConnectionRefused(_) => "ConnectionRefused",
            ProbeError::Timeout(_) => "Timeout",
            ProbeError::InvalidUrl(_) => "InvalidUrl",
            ProbeError::RequestFailed(_) => "RequestFailed",
            ProbeError::Io(_) => "Io",
        }
    }
}

/// What a request produced: a status line, headers and a body for HTTP,
/// a banner/reply line for raw TCP
#[derive(Clone, Debug, Default)]
pub struct ProbeResponse {
    pub status_code: Option<u16>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ProbeResponse {
    /// Case-insensitive header lookup (keys are stored lowercased)
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers.get(&name.to_lowercase())
    }
}

/// One open connection to one server
pub enum Connection {
    Http(HttpConnection),
    Tcp(TcpConnection),
}

impl Connection {
    /// Open a connection of the spec's kind against the server
    pub async fn open(spec: &ConnectionSpec, server: &Server) -> Result<Self, ProbeError> {
        match spec.kind {
            ConnectionKind::Http | ConnectionKind::Https => {
                Ok(Connection::Http(HttpConnection::open(spec, server)?))
            }
            ConnectionKind::Tcp => Ok(Connection::Tcp(TcpConnection::open(spec, server).await?)),
        }
    }

    /// Run one request over the connection
    pub async fn run(&mut self, request: &RequestSpec) -> Result<ProbeResponse, ProbeError> {
        match self {
            Connection::Http(connection) => connection.run(request).await,
            Connection::Tcp(connection) => connection.run(request).await,
        }
    }
}
