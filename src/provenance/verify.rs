// verify.rs — Provenance verification
//
// A single pass over one statement, in a fixed order so the most actionable
// problem is reported first:
//   1. structure  — required fields present and non-empty
//   2. digests    — every subject digest passes the hex/length rule
//   3. timing     — finishedOn >= startedOn
//   4. schema     — predicateType equals the configured constant
//
// An invalid statement is a routine outcome, returned as a Verdict. Nothing
// here panics, returns Err, mutates its input, or performs I/O.

use chrono::SecondsFormat;
use serde::Serialize;
use serde_json::Value;

use crate::config::AttestConfig;
use crate::hash;
use crate::provenance::model::ProvenanceStatement;
use crate::provenance::parse::{parse_statement, ParseError, ParseErrorKind};

/// Why a statement was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum Reason {
    MissingField {
        path: String,
    },
    /// A field is present but has the wrong JSON type or an unparseable value.
    InvalidShape {
        path: String,
        expected: String,
    },
    MalformedDigest {
        subject: String,
        algorithm: String,
    },
    TemporalInconsistency {
        started_on: String,
        finished_on: String,
    },
    UnsupportedPredicateType {
        predicate_type: String,
    },
}

impl Reason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Reason::MissingField { .. } => "missing_field",
            Reason::InvalidShape { .. } => "invalid_shape",
            Reason::MalformedDigest { .. } => "malformed_digest",
            Reason::TemporalInconsistency { .. } => "temporal_inconsistency",
            Reason::UnsupportedPredicateType { .. } => "unsupported_predicate_type",
        }
    }

    fn missing(path: &str) -> Self {
        Reason::MissingField {
            path: path.to_string(),
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::MissingField { path } => write!(f, "missing field {}", path),
            Reason::InvalidShape { path, expected } => {
                write!(f, "field {} is not a valid {}", path, expected)
            }
            Reason::MalformedDigest { subject, algorithm } => {
                write!(f, "subject {:?} has a malformed {} digest", subject, algorithm)
            }
            Reason::TemporalInconsistency {
                started_on,
                finished_on,
            } => write!(f, "finishedOn {} precedes startedOn {}", finished_on, started_on),
            Reason::UnsupportedPredicateType { predicate_type } => {
                write!(f, "unsupported predicateType {:?}", predicate_type)
            }
        }
    }
}

impl From<ParseError> for Reason {
    fn from(err: ParseError) -> Self {
        match err.kind {
            ParseErrorKind::Missing => Reason::MissingField { path: err.path },
            ParseErrorKind::WrongType { expected } => Reason::InvalidShape {
                path: err.path,
                expected: expected.to_string(),
            },
            ParseErrorKind::InvalidTimestamp => Reason::InvalidShape {
                path: err.path,
                expected: "RFC 3339 timestamp".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(Reason),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn reason(&self) -> Option<&Reason> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(r) => Some(r),
        }
    }
}

/// Wire form of a verdict: `{"valid": bool, "reason": {...}}`.
#[derive(Debug, Serialize)]
pub struct VerdictReport<'a> {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a Reason>,
}

impl<'a> From<&'a Verdict> for VerdictReport<'a> {
    fn from(verdict: &'a Verdict) -> Self {
        VerdictReport {
            valid: verdict.is_valid(),
            reason: verdict.reason(),
        }
    }
}

/// Verify untrusted JSON: shape it first, then run the semantic checks.
pub fn verify_json(value: &Value, config: &AttestConfig) -> Verdict {
    match parse_statement(value) {
        Ok(statement) => verify(&statement, config),
        Err(err) => reject(err.into()),
    }
}

/// Verify a typed statement.
pub fn verify(statement: &ProvenanceStatement, config: &AttestConfig) -> Verdict {
    let checks: [fn(&ProvenanceStatement, &AttestConfig) -> Result<(), Reason>; 4] = [
        check_structure,
        check_digests,
        check_timing,
        check_predicate_type,
    ];
    for check in checks {
        if let Err(reason) = check(statement, config) {
            return reject(reason);
        }
    }
    tracing::debug!(invocation_id = %statement.invocation_id(), "provenance verified");
    Verdict::Valid
}

fn reject(reason: Reason) -> Verdict {
    tracing::warn!(reason = reason.code(), detail = %reason, "provenance rejected");
    Verdict::Invalid(reason)
}

fn check_structure(st: &ProvenanceStatement, _: &AttestConfig) -> Result<(), Reason> {
    if st.subjects().is_empty() {
        return Err(Reason::missing("subject"));
    }
    for (i, subject) in st.subjects().iter().enumerate() {
        if subject.name().trim().is_empty() {
            return Err(Reason::missing(&format!("subject[{}].name", i)));
        }
    }
    let required = [
        ("predicate.buildDefinition.buildType", st.build_type()),
        ("predicate.runDetails.builder.id", st.builder().id.as_str()),
        (
            "predicate.runDetails.metadata.invocationId",
            st.invocation_id(),
        ),
    ];
    for (path, value) in required {
        if value.trim().is_empty() {
            return Err(Reason::missing(path));
        }
    }
    // A statement claims a completed build; both ends of the run are required.
    if st.started_on().is_none() {
        return Err(Reason::missing("predicate.runDetails.metadata.startedOn"));
    }
    if st.finished_on().is_none() {
        return Err(Reason::missing("predicate.runDetails.metadata.finishedOn"));
    }
    Ok(())
}

fn check_digests(st: &ProvenanceStatement, _: &AttestConfig) -> Result<(), Reason> {
    for subject in st.subjects() {
        let malformed = |algorithm: &str| Reason::MalformedDigest {
            subject: subject.name().to_string(),
            algorithm: algorithm.to_string(),
        };
        if subject.digest().is_empty() {
            return Err(malformed(""));
        }
        for (name, hex) in subject.digest().iter() {
            let algorithm = hash::parse_algorithm(name).map_err(|_| malformed(name))?;
            if algorithm.as_str() != name {
                // Keys must already be in lower-case canonical form.
                return Err(malformed(name));
            }
            hash::normalize_hex(algorithm, hex).map_err(|_| malformed(name))?;
        }
    }
    Ok(())
}

fn check_timing(st: &ProvenanceStatement, _: &AttestConfig) -> Result<(), Reason> {
    if let (Some(started), Some(finished)) = (st.started_on(), st.finished_on()) {
        if finished < started {
            return Err(Reason::TemporalInconsistency {
                started_on: started.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                finished_on: finished.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            });
        }
    }
    Ok(())
}

fn check_predicate_type(st: &ProvenanceStatement, config: &AttestConfig) -> Result<(), Reason> {
    if st.predicate_type() != config.predicate_type {
        return Err(Reason::UnsupportedPredicateType {
            predicate_type: st.predicate_type().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::compose::compose;
    use crate::provenance::metadata::assemble;
    use crate::provenance::model::{DigestSet, Subject};
    use chrono::Duration;
    use serde_json::json;

    fn statement(cfg: &AttestConfig) -> ProvenanceStatement {
        let mut m = assemble("hello.txt", "1.0.0", "https://ci.example.com/runner", cfg);
        m.mark_finished().unwrap();
        let s = Subject::from_content("hello.txt", b"hello").unwrap();
        compose(&[s], &m, cfg).unwrap()
    }

    fn reason(v: Verdict) -> Reason {
        match v {
            Verdict::Invalid(r) => r,
            Verdict::Valid => panic!("expected invalid verdict"),
        }
    }

    #[test]
    fn composed_statement_is_valid() {
        let cfg = AttestConfig::default();
        assert_eq!(verify(&statement(&cfg), &cfg), Verdict::Valid);
    }

    #[test]
    fn composed_statement_is_valid_after_json_roundtrip() {
        let cfg = AttestConfig::default();
        let v = serde_json::to_value(statement(&cfg)).unwrap();
        assert_eq!(verify_json(&v, &cfg), Verdict::Valid);
    }

    #[test]
    fn multiple_subjects_with_sha512_verify() {
        let cfg = AttestConfig::default();
        let mut m = assemble("bundle", "1", "b", &cfg);
        m.mark_finished().unwrap();
        let subjects = vec![
            Subject::from_content_with("a", b"a", &[crate::hash::DigestAlgorithm::Sha512])
                .unwrap(),
            Subject::from_content("b", b"b").unwrap(),
        ];
        assert!(verify(&compose(&subjects, &m, &cfg).unwrap(), &cfg).is_valid());
    }

    #[test]
    fn finished_before_started_is_temporal_inconsistency() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        let started = st.started_on().unwrap();
        st.predicate.run_details.metadata.finished_on = Some(started - Duration::seconds(1));
        assert_eq!(reason(verify(&st, &cfg)).code(), "temporal_inconsistency");
    }

    #[test]
    fn altered_predicate_type_is_unsupported() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        st.predicate_type = "https://example.com/not-provenance/v9".to_string();
        assert_eq!(
            reason(verify(&st, &cfg)),
            Reason::UnsupportedPredicateType {
                predicate_type: "https://example.com/not-provenance/v9".to_string()
            }
        );
    }

    #[test]
    fn alternate_schema_version_via_config() {
        let cfg = AttestConfig {
            predicate_type: "https://example.com/provenance/v2".to_string(),
            ..AttestConfig::default()
        };
        let st = statement(&cfg);
        assert!(verify(&st, &cfg).is_valid());
        assert!(!verify(&st, &AttestConfig::default()).is_valid());
    }

    #[test]
    fn missing_finished_on_is_not_valid() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        st.predicate.run_details.metadata.finished_on = None;
        assert_eq!(
            reason(verify(&st, &cfg)),
            Reason::missing("predicate.runDetails.metadata.finishedOn")
        );
    }

    #[test]
    fn wrong_length_digest_is_malformed() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        let mut digest = DigestSet::new();
        digest.insert_raw("sha256".into(), "ab".repeat(31));
        st.subject[0].digest = digest;
        assert_eq!(
            reason(verify(&st, &cfg)),
            Reason::MalformedDigest {
                subject: "hello.txt".into(),
                algorithm: "sha256".into()
            }
        );
    }

    #[test]
    fn unknown_or_empty_digest_map_is_malformed() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        let mut digest = DigestSet::new();
        digest.insert_raw("md5".into(), "d41d8cd98f00b204e9800998ecf8427e".into());
        st.subject[0].digest = digest;
        assert_eq!(reason(verify(&st, &cfg)).code(), "malformed_digest");

        st.subject[0].digest = DigestSet::new();
        assert_eq!(reason(verify(&st, &cfg)).code(), "malformed_digest");
    }

    #[test]
    fn structural_failures_win_over_later_checks() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        st.predicate_type = "bogus".into();
        st.subject[0].digest = DigestSet::new();
        st.predicate.run_details.builder.id = String::new();
        assert_eq!(
            reason(verify(&st, &cfg)),
            Reason::missing("predicate.runDetails.builder.id")
        );
    }

    #[test]
    fn digest_failures_win_over_schema() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        st.predicate_type = "bogus".into();
        st.subject[0].digest = DigestSet::new();
        assert_eq!(reason(verify(&st, &cfg)).code(), "malformed_digest");
    }

    #[test]
    fn verify_json_maps_shape_errors() {
        let cfg = AttestConfig::default();
        assert_eq!(
            reason(verify_json(&json!({}), &cfg)),
            Reason::missing("subject")
        );

        let mut v = serde_json::to_value(statement(&cfg)).unwrap();
        v["predicate"]["runDetails"] = json!("nope");
        assert_eq!(
            reason(verify_json(&v, &cfg)),
            Reason::InvalidShape {
                path: "predicate.runDetails".into(),
                expected: "object".into()
            }
        );
    }

    #[test]
    fn verify_does_not_mutate_input() {
        let cfg = AttestConfig::default();
        let st = statement(&cfg);
        let before = st.clone();
        let _ = verify(&st, &cfg);
        assert_eq!(st, before);
    }

    #[test]
    fn verdict_report_serializes_reason_code() {
        let verdict = Verdict::Invalid(Reason::missing("subject"));
        let v = serde_json::to_value(VerdictReport::from(&verdict)).unwrap();
        assert_eq!(
            v,
            json!({"valid": false, "reason": {"code": "missing_field", "path": "subject"}})
        );
        let ok = serde_json::to_value(VerdictReport::from(&Verdict::Valid)).unwrap();
        assert_eq!(ok, json!({"valid": true}));
    }

    #[derive(Clone, Default)]
    struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn rejection_is_logged_at_warn() {
        let cfg = AttestConfig::default();
        let mut st = statement(&cfg);
        st.predicate_type = "https://example.com/not-provenance/v9".to_string();

        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            assert!(!verify(&st, &cfg).is_valid());
        });

        let logged = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("WARN"), "logged: {}", logged);
        assert!(logged.contains("provenance rejected"));
        assert!(logged.contains("unsupported_predicate_type"));
    }
}
