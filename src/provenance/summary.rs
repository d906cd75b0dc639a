// summary.rs — Human-oriented digest of a (possibly untrusted) statement
//
// Summaries never fail: absent fields render as "unknown" and the verdict
// from verify_json is carried alongside.

use serde::Serialize;
use serde_json::Value;

use crate::config::AttestConfig;
use crate::provenance::verify::{verify_json, Reason};

const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationSummary {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
    pub predicate_type: String,
    pub subjects: usize,
    pub subject_names: Vec<String>,
    pub build_type: String,
    pub builder: String,
    pub started_on: String,
    pub invocation_id: String,
}

pub fn summarize(value: &Value, config: &AttestConfig) -> AttestationSummary {
    let verdict = verify_json(value, config);
    let text = |pointer: &str| {
        value
            .pointer(pointer)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };
    let subjects = value
        .get("subject")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    AttestationSummary {
        valid: verdict.is_valid(),
        reason: verdict.reason().cloned(),
        predicate_type: text("/predicateType"),
        subjects: subjects.len(),
        subject_names: subjects
            .iter()
            .map(|s| {
                s.get("name")
                    .and_then(Value::as_str)
                    .unwrap_or(UNKNOWN)
                    .to_string()
            })
            .collect(),
        build_type: text("/predicate/buildDefinition/buildType"),
        builder: text("/predicate/runDetails/builder/id"),
        started_on: text("/predicate/runDetails/metadata/startedOn"),
        invocation_id: text("/predicate/runDetails/metadata/invocationId"),
    }
}
