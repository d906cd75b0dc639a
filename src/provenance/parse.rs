// parse.rs — Map untyped JSON onto the strict statement shape
//
// Answers only "is this even shaped right". Presence of required fields and
// their JSON types are checked here, with the dotted path of the first
// offending field. Semantic rules (digest format, timing, predicate type)
// belong to verify.rs.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;

use crate::provenance::model::{
    BuildDefinition, BuilderIdentity, BuilderVersion, DigestSet, Predicate, ProvenanceStatement,
    RunDetails, RunMetadata, Subject,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Field absent, null, or an empty string/sequence where content is required.
    Missing,
    /// Field present with the wrong JSON type.
    WrongType { expected: &'static str },
    /// Timestamp string is not RFC 3339.
    InvalidTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {kind}")]
pub struct ParseError {
    pub path: String,
    pub kind: ParseErrorKind,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::Missing => f.write_str("missing required field"),
            ParseErrorKind::WrongType { expected } => write!(f, "expected {}", expected),
            ParseErrorKind::InvalidTimestamp => f.write_str("invalid RFC 3339 timestamp"),
        }
    }
}

fn missing(path: &str) -> ParseError {
    ParseError {
        path: path.to_string(),
        kind: ParseErrorKind::Missing,
    }
}

fn wrong_type(path: &str, expected: &'static str) -> ParseError {
    ParseError {
        path: path.to_string(),
        kind: ParseErrorKind::WrongType { expected },
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn field<'a>(obj: &'a Map<String, Value>, parent: &str, key: &str) -> Result<&'a Value, ParseError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(missing(&join(parent, key))),
        Some(v) => Ok(v),
    }
}

fn object<'a>(
    obj: &'a Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<&'a Map<String, Value>, ParseError> {
    field(obj, parent, key)?
        .as_object()
        .ok_or_else(|| wrong_type(&join(parent, key), "object"))
}

/// Required, non-empty string.
fn string(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<String, ParseError> {
    let path = join(parent, key);
    let s = field(obj, parent, key)?
        .as_str()
        .ok_or_else(|| wrong_type(&path, "string"))?;
    if s.trim().is_empty() {
        return Err(missing(&path));
    }
    Ok(s.to_string())
}

/// Optional string; absent or null becomes empty.
fn optional_string(obj: &Map<String, Value>, parent: &str, key: &str) -> Result<String, ParseError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(wrong_type(&join(parent, key), "string")),
    }
}

fn optional_timestamp(
    obj: &Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<Option<DateTime<Utc>>, ParseError> {
    let path = join(parent, key);
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| ParseError {
                path,
                kind: ParseErrorKind::InvalidTimestamp,
            }),
        Some(_) => Err(wrong_type(&path, "string")),
    }
}

/// Convert untrusted JSON into a `ProvenanceStatement`.
///
/// Fields are checked in wire order (subject, predicateType, predicate...)
/// and the first problem is reported. `startedOn`/`finishedOn` and
/// `predicateType` content are left for the verifier to judge.
pub fn parse_statement(value: &Value) -> Result<ProvenanceStatement, ParseError> {
    let root = value.as_object().ok_or_else(|| wrong_type("$", "object"))?;

    let statement_type = match root.get("_type") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return Err(wrong_type("_type", "string")),
    };

    let subject = parse_subjects(root)?;

    let predicate_type = match field(root, "", "predicateType")? {
        Value::String(s) => s.clone(),
        _ => return Err(wrong_type("predicateType", "string")),
    };

    let predicate = object(root, "", "predicate")?;
    let build_definition = object(predicate, "predicate", "buildDefinition")?;
    let build_type = string(build_definition, "predicate.buildDefinition", "buildType")?;
    let external_parameters = match build_definition.get("externalParameters") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(m)) => m.clone(),
        Some(_) => {
            return Err(wrong_type(
                "predicate.buildDefinition.externalParameters",
                "object",
            ))
        }
    };

    let run_details = object(predicate, "predicate", "runDetails")?;
    let builder = object(run_details, "predicate.runDetails", "builder")?;
    let builder_id = string(builder, "predicate.runDetails.builder", "id")?;
    let version = match builder.get("version") {
        None | Some(Value::Null) => BuilderVersion::default(),
        Some(Value::Object(v)) => BuilderVersion {
            builder: optional_string(v, "predicate.runDetails.builder.version", "builder")?,
            environment: optional_string(v, "predicate.runDetails.builder.version", "environment")?,
        },
        Some(_) => return Err(wrong_type("predicate.runDetails.builder.version", "object")),
    };

    let metadata = object(run_details, "predicate.runDetails", "metadata")?;
    let invocation_id = string(metadata, "predicate.runDetails.metadata", "invocationId")?;
    let started_on = optional_timestamp(metadata, "predicate.runDetails.metadata", "startedOn")?;
    let finished_on = optional_timestamp(metadata, "predicate.runDetails.metadata", "finishedOn")?;

    Ok(ProvenanceStatement {
        statement_type,
        subject,
        predicate_type,
        predicate: Predicate {
            build_definition: BuildDefinition {
                build_type,
                external_parameters,
            },
            run_details: RunDetails {
                builder: BuilderIdentity {
                    id: builder_id,
                    version,
                },
                metadata: RunMetadata {
                    invocation_id,
                    started_on,
                    finished_on,
                },
            },
        },
    })
}

fn parse_subjects(root: &Map<String, Value>) -> Result<Vec<Subject>, ParseError> {
    let entries = field(root, "", "subject")?
        .as_array()
        .ok_or_else(|| wrong_type("subject", "array"))?;
    if entries.is_empty() {
        return Err(missing("subject"));
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let path = format!("subject[{}]", i);
            let obj = entry
                .as_object()
                .ok_or_else(|| wrong_type(&path, "object"))?;
            let name = string(obj, &path, "name")?;
            let digest_path = join(&path, "digest");
            let digest_obj = object(obj, &path, "digest")?;
            let mut digest = DigestSet::new();
            for (alg, hex) in digest_obj {
                let hex = hex
                    .as_str()
                    .ok_or_else(|| wrong_type(&join(&digest_path, alg), "string"))?;
                digest.insert_raw(alg.clone(), hex.to_string());
            }
            Ok(Subject { name, digest })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "_type": "https://in-toto.io/Statement/v1",
            "subject": [{
                "name": "hello.txt",
                "digest": {"sha256": "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"}
            }],
            "predicateType": "https://slsa.dev/provenance/v1",
            "predicate": {
                "buildDefinition": {
                    "buildType": "https://provenant.dev/build/v1",
                    "externalParameters": {"ref": "main"}
                },
                "runDetails": {
                    "builder": {
                        "id": "https://ci.example.com/runner",
                        "version": {"builder": "1.0.0", "environment": "linux-x86_64"}
                    },
                    "metadata": {
                        "invocationId": "3f1c2a5e-8d4b-4c7e-9a1f-0b2c3d4e5f60",
                        "startedOn": "2026-01-01T00:00:00Z",
                        "finishedOn": "2026-01-01T00:05:00Z"
                    }
                }
            }
        })
    }

    fn err_of(v: &Value) -> ParseError {
        parse_statement(v).expect_err("expected parse failure")
    }

    #[test]
    fn parses_well_formed_statement() {
        let st = parse_statement(&sample()).unwrap();
        assert_eq!(st.subjects().len(), 1);
        assert_eq!(st.subjects()[0].name(), "hello.txt");
        assert_eq!(st.builder().version.environment, "linux-x86_64");
        assert_eq!(st.external_parameters()["ref"], "main");
        assert!(st.finished_on().unwrap() > st.started_on().unwrap());
    }

    #[test]
    fn reports_missing_paths() {
        let mut v = sample();
        v["predicate"]["runDetails"]["builder"]
            .as_object_mut()
            .unwrap()
            .remove("id");
        assert_eq!(err_of(&v), missing("predicate.runDetails.builder.id"));

        let mut v = sample();
        v["predicate"]["buildDefinition"]["buildType"] = json!("");
        assert_eq!(err_of(&v), missing("predicate.buildDefinition.buildType"));

        let mut v = sample();
        v["subject"] = json!([]);
        assert_eq!(err_of(&v), missing("subject"));

        let mut v = sample();
        v["predicate"]["runDetails"]["metadata"]["invocationId"] = Value::Null;
        assert_eq!(err_of(&v), missing("predicate.runDetails.metadata.invocationId"));
    }

    #[test]
    fn subject_errors_carry_index() {
        let mut v = sample();
        v["subject"]
            .as_array_mut()
            .unwrap()
            .push(json!({"name": "  ", "digest": {}}));
        assert_eq!(err_of(&v), missing("subject[1].name"));
    }

    #[test]
    fn reports_wrong_types() {
        let mut v = sample();
        v["subject"] = json!("hello.txt");
        assert_eq!(
            err_of(&v).kind,
            ParseErrorKind::WrongType { expected: "array" }
        );

        let mut v = sample();
        v["subject"][0]["digest"]["sha256"] = json!(42);
        assert_eq!(err_of(&v).path, "subject[0].digest.sha256");

        assert_eq!(err_of(&json!([1, 2])).path, "$");
    }

    #[test]
    fn rejects_bad_timestamps() {
        let mut v = sample();
        v["predicate"]["runDetails"]["metadata"]["startedOn"] = json!("yesterday");
        let e = err_of(&v);
        assert_eq!(e.kind, ParseErrorKind::InvalidTimestamp);
        assert_eq!(e.path, "predicate.runDetails.metadata.startedOn");
    }

    #[test]
    fn absent_timestamps_are_left_to_the_verifier() {
        let mut v = sample();
        v["predicate"]["runDetails"]["metadata"]
            .as_object_mut()
            .unwrap()
            .remove("finishedOn");
        let st = parse_statement(&v).unwrap();
        assert!(st.finished_on().is_none());
    }
}
