//! Connection worker
//!
//! One worker owns one opened connection against one server, runs the
//! connection's requests in declared order, and classifies every bound
//! check. Nothing escapes a worker: open failures end its contribution,
//! request and check failures become outcome cells.

use std::time::Instant;
use tracing::{debug, warn};

use crate::checks::Check;
use crate::connection::Connection;
use crate::models::{ConnectionSpec, ResultEntry, Server};

/// Probe one (server, connection) pair. `checks` is aligned positionally
/// with `spec.requests`. Returns the flat entry list for this pair, in no
/// guaranteed order relative to other workers.
pub async fn probe(server: Server, spec: ConnectionSpec, checks: Vec<Vec<Check>>) -> Vec<ResultEntry> {
    let mut connection = match Connection::open(&spec, &server).await {
        Ok(connection) => connection,
        Err(err) => {
            warn!(
                "Could not open {} connection to {}: {}",
                spec.kind, server.name, err
            );
            return Vec::new();
        }
    };

    let mut entries = Vec::new();

    for (request, request_checks) in spec.requests.iter().zip(&checks) {
        let started = Instant::now();
        let outcome = connection.run(request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(response) => {
                debug!(
                    "{} {} against {} in {}ms",
                    spec.kind, request.path, server.name, elapsed_ms
                );
                for check in request_checks {
                    let evaluation = check.evaluate(&response, elapsed_ms);
                    entries.push(ResultEntry::new(check.id, evaluation, elapsed_ms));
                }
            }
            Err(err) => {
                warn!(
                    "{} request against {} failed: {}",
                    spec.kind, server.name, err
                );
                for check in request_checks {
                    entries.push(ResultEntry::from_error(
                        check.id,
                        err.kind(),
                        err.to_string(),
                        elapsed_ms,
                    ));
                }
            }
        }
    }

    entries
}
