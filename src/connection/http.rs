//! HTTP(S) transport
//!
//! One reqwest client per (server, connection) pair.

use reqwest::{Client, Method};
use std::collections::HashMap;
use tracing::debug;

use super::{ProbeError, ProbeResponse};
use crate::models::{ConnectionKind, ConnectionSpec, RequestSpec, Server};

/// An HTTP(S) connection to one server
pub struct HttpConnection {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpConnection {
    /// Build the client and base URL. Self-signed certificates are
    /// accepted: probed hosts are routinely internal.
    pub fn open(spec: &ConnectionSpec, server: &Server) -> Result<Self, ProbeError> {
        let timeout_secs = spec.timeout().as_secs();
        let client = Client::builder()
            .timeout(spec.timeout())
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| ProbeError::Io(e.to_string()))?;

        let scheme = match spec.kind {
            ConnectionKind::Https => "https",
            _ => "http",
        };
        let base_url = format!("{}://{}:{}", scheme, server.host(), spec.port());

        Ok(Self {
            client,
            base_url,
            timeout_secs,
        })
    }

    pub async fn run(&mut self, request: &RequestSpec) -> Result<ProbeResponse, ProbeError> {
        let url = self.build_url(&request.path);
        debug!("Sending {} request to {}", request.method, url);

        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ProbeError::RequestFailed(format!("invalid method: {}", request.method)))?;

        let mut builder = self.client.request(method, &url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                ProbeError::ConnectionRefused(url.clone())
            } else if e.is_builder() {
                ProbeError::InvalidUrl(url.clone())
            } else {
                ProbeError::RequestFailed(e.to_string())
            }
        })?;

        let status_code = response.status().as_u16();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(key.to_string(), v.to_string());
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::RequestFailed(e.to_string()))?;

        debug!("Response: {} from {}", status_code, url);

        Ok(ProbeResponse {
            status_code: Some(status_code),
            headers,
            body,
        })
    }

    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
