//! Project description
//!
//! A project binds servers, roles, connection types and checks together.
//! Projects are read-only inputs to a probe run.

#![allow(dead_code)]

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::time::Duration;

/// Default timeout applied to connection opens and requests
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Full probe-run description: servers, connection types, checks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub servers: Vec<Server>,
    pub connections: Vec<ConnectionSpec>,
}

impl Project {
    /// Ordered test names: connections -> requests -> checks in
    /// declaration order. Position in this list is the test identity
    /// for one run.
    pub fn test_names(&self) -> Vec<String> {
        self.connections
            .iter()
            .flat_map(|connection| &connection.requests)
            .flat_map(|request| &request.checks)
            .map(|check| check.name.clone())
            .collect()
    }

    /// All roles advertised by servers, sorted and deduplicated
    pub fn roles(&self) -> Vec<String> {
        self.servers
            .iter()
            .flat_map(|server| server.roles.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Structure summary for display (name, servers, roles, tests)
    pub fn outline(&self) -> ProjectOutline {
        ProjectOutline {
            name: self.name.clone(),
            servers: self.servers.iter().map(|s| s.name.clone()).collect(),
            roles: self.roles(),
            tests: self.test_names(),
        }
    }

    /// Generate an example project, used by `init`
    pub fn example() -> Self {
        Self {
            name: "Example Site".to_string(),
            servers: vec![
                Server::new("web1.example.com", &["web"]),
                Server::new("web2.example.com", &["web"]),
                Server::new("mx1.example.com", &["smtp"]),
            ],
            connections: vec![
                ConnectionSpec {
                    kind: ConnectionKind::Http,
                    port: None,
                    roles: vec!["web".to_string()],
                    requests: vec![RequestSpec {
                        method: default_method(),
                        path: "/".to_string(),
                        headers: HashMap::new(),
                        body: None,
                        send: None,
                        checks: vec![
                            CheckSpec {
                                name: "responds with 200".to_string(),
                                kind: CheckKind::Status { equals: 200 },
                            },
                            CheckSpec {
                                name: "page title".to_string(),
                                kind: CheckKind::BodyMatches {
                                    pattern: "<title>(.+)</title>".to_string(),
                                },
                            },
                            CheckSpec {
                                name: "fast enough".to_string(),
                                kind: CheckKind::ResponseTime {
                                    warn_over_ms: Some(500),
                                },
                            },
                        ],
                    }],
                    timeout_secs: None,
                },
                ConnectionSpec {
                    kind: ConnectionKind::Tcp,
                    port: Some(25),
                    roles: vec!["smtp".to_string()],
                    requests: vec![RequestSpec {
                        method: default_method(),
                        path: default_path(),
                        headers: HashMap::new(),
                        body: None,
                        send: None,
                        checks: vec![CheckSpec {
                            name: "smtp greeting".to_string(),
                            kind: CheckKind::BodyMatches {
                                pattern: r"^220 (\S+)".to_string(),
                            },
                        }],
                    }],
                    timeout_secs: None,
                },
            ],
        }
    }

    /// Validate structural soundness before a run
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Project name must not be empty");
        }

        if self.servers.is_empty() {
            anyhow::bail!("Project '{}' defines no servers", self.name);
        }

        let mut seen = BTreeSet::new();
        for server in &self.servers {
            if server.name.trim().is_empty() {
                anyhow::bail!("Project '{}' has a server with an empty name", self.name);
            }
            if !seen.insert(server.name.as_str()) {
                anyhow::bail!("Duplicate server name: {}", server.name);
            }
        }

        for (index, connection) in self.connections.iter().enumerate() {
            if connection.roles.is_empty() {
                anyhow::bail!("Connection #{} is bound to no roles", index + 1);
            }
            if connection.kind == ConnectionKind::Tcp && connection.port.is_none() {
                anyhow::bail!("Connection #{} is tcp but has no port", index + 1);
            }
            for request in &connection.requests {
                for check in &request.checks {
                    check.validate()?;
                }
            }
        }

        Ok(())
    }
}

/// Project structure as exposed by `show`
#[derive(Clone, Debug, Serialize)]
pub struct ProjectOutline {
    pub name: String,
    pub servers: Vec<String>,
    pub roles: Vec<String>,
    pub tests: Vec<String>,
}

/// A probed host advertising one or more roles
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Server {
    pub name: String,

    /// Host to connect to; falls back to the server name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl Server {
    pub fn new(name: impl Into<String>, roles: &[&str]) -> Self {
        Self {
            name: name.into(),
            address: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn host(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.name)
    }
}

/// Transport used to reach a server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Http,
    Https,
    Tcp,
}

impl ConnectionKind {
    fn default_port(self) -> u16 {
        match self {
            ConnectionKind::Http => 80,
            ConnectionKind::Https => 443,
            ConnectionKind::Tcp => 0,
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionKind::Http => write!(f, "http"),
            ConnectionKind::Https => write!(f, "https"),
            ConnectionKind::Tcp => write!(f, "tcp"),
        }
    }
}

/// A connection type: transport + port, bound to roles, owning requests
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub kind: ConnectionKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Roles this connection applies to
    pub roles: Vec<String>,

    pub requests: Vec<RequestSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ConnectionSpec {
    /// True when the connection's bound roles intersect the server's roles
    pub fn applies_to(&self, server: &Server) -> bool {
        self.roles.iter().any(|role| server.roles.contains(role))
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.kind.default_port())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }
}

/// One request run over an open connection
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestSpec {
    /// HTTP method (ignored for tcp connections)
    #[serde(default = "default_method")]
    pub method: String,

    /// HTTP path (ignored for tcp connections)
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Line written after connect (tcp connections only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send: Option<String>,

    pub checks: Vec<CheckSpec>,
}

fn default_method() -> String {
    "GET".to_string()
}

fn default_path() -> String {
    "/".to_string()
}

/// A named predicate over a response
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckSpec {
    pub name: String,

    #[serde(flatten)]
    pub kind: CheckKind,
}

impl CheckSpec {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("A check has an empty name");
        }
        match &self.kind {
            CheckKind::BodyMatches { pattern } | CheckKind::HeaderMatches { pattern, .. } => {
                regex::Regex::new(pattern).map_err(|e| {
                    anyhow::anyhow!("Check '{}' has an invalid pattern: {}", self.name, e)
                })?;
            }
            _ => {}
        }
        Ok(())
    }
}

/// The closed check vocabulary
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CheckKind {
    /// Response status code equals a value
    Status { equals: u16 },

    /// Body (or banner) contains a substring
    BodyContains { text: String },

    /// Body (or banner) matches a pattern; captures become the outcome
    BodyMatches { pattern: String },

    /// Header present and equal to a value
    HeaderEquals { header: String, value: String },

    /// Header present and matching a pattern
    HeaderMatches { header: String, pattern: String },

    /// Report elapsed time, flagging `warn` over a threshold
    ResponseTime {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warn_over_ms: Option<u64>,
    },
}
