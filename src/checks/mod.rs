//! Response checks
//!
//! The closed vocabulary of predicates that can be run against a probe
//! response. Specs are compiled once per run (patterns validated up
//! front), then evaluated per response. Evaluation never fails: every
//! result, including absent values, folds into an `Outcome`.

use anyhow::{Context, Result};
use regex::Regex;

use crate::connection::ProbeResponse;
use crate::models::{CheckKind, CheckSpec, Evaluation, Outcome};

/// A compiled check with its run-scoped test identity
#[derive(Clone, Debug)]
pub struct Check {
    pub id: usize,
    pub name: String,
    kind: CompiledKind,
}

#[derive(Clone, Debug)]
enum CompiledKind {
    Status { equals: u16 },
    BodyContains { text: String },
    BodyMatches { pattern: Regex },
    HeaderEquals { header: String, value: String },
    HeaderMatches { header: String, pattern: Regex },
    ResponseTime { warn_over_ms: Option<u64> },
}

impl Check {
    /// Compile a check spec, assigning its test identity for this run
    pub fn compile(id: usize, spec: &CheckSpec) -> Result<Self> {
        let kind = match &spec.kind {
            CheckKind::Status { equals } => CompiledKind::Status { equals: *equals },
            CheckKind::BodyContains { text } => CompiledKind::BodyContains { text: text.clone() },
            CheckKind::BodyMatches { pattern } => CompiledKind::BodyMatches {
                pattern: Regex::new(pattern)
                    .with_context(|| format!("Invalid pattern in check '{}'", spec.name))?,
            },
            CheckKind::HeaderEquals { header, value } => CompiledKind::HeaderEquals {
                header: header.clone(),
                value: value.clone(),
            },
            CheckKind::HeaderMatches { header, pattern } => CompiledKind::HeaderMatches {
                header: header.clone(),
                pattern: Regex::new(pattern)
                    .with_context(|| format!("Invalid pattern in check '{}'", spec.name))?,
            },
            CheckKind::ResponseTime { warn_over_ms } => CompiledKind::ResponseTime {
                warn_over_ms: *warn_over_ms,
            },
        };

        Ok(Self {
            id,
            name: spec.name.clone(),
            kind,
        })
    }

    /// Evaluate against a response. `elapsed_ms` is the wall-clock time of
    /// the request that produced the response.
    pub fn evaluate(&self, response: &ProbeResponse, elapsed_ms: u64) -> Evaluation {
        match &self.kind {
            CompiledKind::Status { equals } => match response.status_code {
                Some(code) if code == *equals => Evaluation::of(Outcome::Pass),
                Some(_) => Evaluation::of(Outcome::Fail),
                None => Evaluation::of(Outcome::Missing),
            },

            CompiledKind::BodyContains { text } => {
                if response.body.contains(text) {
                    Evaluation::of(Outcome::Pass)
                } else {
                    Evaluation::of(Outcome::Fail)
                }
            }

            CompiledKind::BodyMatches { pattern } => match_outcome(pattern, &response.body),

            CompiledKind::HeaderEquals { header, value } => match response.header(header) {
                Some(found) if found == value => Evaluation::of(Outcome::Pass),
                Some(_) => Evaluation::of(Outcome::Fail),
                None => Evaluation::of(Outcome::Missing),
            },

            CompiledKind::HeaderMatches { header, pattern } => match response.header(header) {
                Some(found) => match_outcome(pattern, found),
                None => Evaluation::of(Outcome::Missing),
            },

            CompiledKind::ResponseTime { warn_over_ms } => {
                let outcome = Outcome::Value(format!("{elapsed_ms} ms"));
                match warn_over_ms {
                    Some(threshold) if elapsed_ms > *threshold => {
                        Evaluation::with_status(outcome, "warn")
                    }
                    _ => Evaluation::of(outcome),
                }
            }
        }
    }
}

/// Pattern outcome: captures on a match, `Missing` when the pattern does
/// not match (a failed match is an absent value, not a boolean false)
fn match_outcome(pattern: &Regex, haystack: &str) -> Evaluation {
    match pattern.captures(haystack) {
        Some(captures) => Evaluation::of(Outcome::Match(
            captures
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )),
        None => Evaluation::of(Outcome::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use std::collections::HashMap;

    fn compile(name: &str, kind: CheckKind) -> Check {
        Check::compile(
            0,
            &CheckSpec {
                name: name.to_string(),
                kind,
            },
        )
        .unwrap()
    }

    fn http_response(status: u16, body: &str) -> ProbeResponse {
        ProbeResponse {
            status_code: Some(status),
            headers: HashMap::from([("server".to_string(), "nginx/1.25".to_string())]),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_check_passes_and_fails() {
        let check = compile("responds with 200", CheckKind::Status { equals: 200 });
        assert_eq!(
            check.evaluate(&http_response(200, ""), 1).outcome,
            Outcome::Pass
        );
        assert_eq!(
            check.evaluate(&http_response(500, ""), 1).outcome,
            Outcome::Fail
        );
    }

    #[test]
    fn test_status_check_on_tcp_response_is_missing() {
        let check = compile("responds with 200", CheckKind::Status { equals: 200 });
        let response = ProbeResponse::default();
        assert_eq!(check.evaluate(&response, 1).outcome, Outcome::Missing);
    }

    #[test]
    fn test_body_match_collects_captures() {
        let check = compile(
            "request line",
            CheckKind::BodyMatches {
                pattern: r"(\w+) .* (\d{3})".to_string(),
            },
        );
        let evaluation = check.evaluate(&http_response(200, "GET / HTTP/1.1 200"), 1);
        assert_eq!(
            evaluation.outcome,
            Outcome::Match(vec!["GET".to_string(), "200".to_string()])
        );
        assert_eq!(evaluation.classify().0, "GET 200");
    }

    #[test]
    fn test_body_match_without_groups_is_plain_match() {
        let check = compile(
            "mentions ok",
            CheckKind::BodyMatches {
                pattern: "ok".to_string(),
            },
        );
        let evaluation = check.evaluate(&http_response(200, "all ok here"), 1);
        assert_eq!(evaluation.outcome, Outcome::Match(Vec::new()));
    }

    #[test]
    fn test_failed_body_match_is_missing_not_false() {
        let check = compile(
            "mentions ok",
            CheckKind::BodyMatches {
                pattern: "^ok$".to_string(),
            },
        );
        let evaluation = check.evaluate(&http_response(200, "broken"), 1);
        assert_eq!(evaluation.outcome, Outcome::Missing);
        assert_eq!(evaluation.classify(), ("nil".to_string(), Status::Error));
    }

    #[test]
    fn test_header_checks_handle_absent_headers() {
        let equals = compile(
            "served by nginx",
            CheckKind::HeaderEquals {
                header: "Server".to_string(),
                value: "nginx/1.25".to_string(),
            },
        );
        assert_eq!(
            equals.evaluate(&http_response(200, ""), 1).outcome,
            Outcome::Pass
        );

        let absent = compile(
            "has etag",
            CheckKind::HeaderEquals {
                header: "ETag".to_string(),
                value: "abc".to_string(),
            },
        );
        assert_eq!(
            absent.evaluate(&http_response(200, ""), 1).outcome,
            Outcome::Missing
        );
    }

    #[test]
    fn test_header_match_captures_version() {
        let check = compile(
            "nginx version",
            CheckKind::HeaderMatches {
                header: "Server".to_string(),
                pattern: r"nginx/([\d.]+)".to_string(),
            },
        );
        let evaluation = check.evaluate(&http_response(200, ""), 1);
        assert_eq!(evaluation.outcome, Outcome::Match(vec!["1.25".to_string()]));
    }

    #[test]
    fn test_response_time_reports_value_and_warns() {
        let check = compile(
            "fast enough",
            CheckKind::ResponseTime {
                warn_over_ms: Some(50),
            },
        );

        let quick = check.evaluate(&http_response(200, ""), 12);
        assert_eq!(quick.classify(), ("12 ms".to_string(), Status::Ok));

        let slow = check.evaluate(&http_response(200, ""), 98);
        assert_eq!(
            slow.classify(),
            ("98 ms".to_string(), Status::Custom("warn".to_string()))
        );
    }

    #[test]
    fn test_compile_rejects_invalid_pattern() {
        let result = Check::compile(
            0,
            &CheckSpec {
                name: "broken".to_string(),
                kind: CheckKind::BodyMatches {
                    pattern: "(unclosed".to_string(),
                },
            },
        );
        assert!(result.is_err());
    }
}
