use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::hash::DigestAlgorithm;

// ── Digest ──────────────────────────────────────────────────────────────────

/// Algorithm name → lower-case hex digest.
///
/// Keys are kept as strings so that statements from untrusted sources can be
/// represented faithfully and rejected by the verifier rather than by serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestSet(BTreeMap<String, String>);

impl DigestSet {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, algorithm: DigestAlgorithm, hex: String) {
        self.0.insert(algorithm.as_str().to_string(), hex);
    }

    pub fn get(&self, algorithm: DigestAlgorithm) -> Option<&str> {
        self.0.get(algorithm.as_str()).map(String::as_str)
    }

    pub fn sha256(&self) -> Option<&str> {
        self.get(DigestAlgorithm::Sha256)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert_raw(&mut self, algorithm: String, hex: String) {
        self.0.insert(algorithm, hex);
    }
}

// ── Subject ─────────────────────────────────────────────────────────────────

/// The artifact being attested. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub(crate) name: String,
    pub(crate) digest: DigestSet,
}

impl Subject {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn digest(&self) -> &DigestSet {
        &self.digest
    }
}

// ── Builder ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderIdentity {
    pub id: String,
    #[serde(default)]
    pub version: BuilderVersion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderVersion {
    #[serde(default)]
    pub builder: String,
    /// Runtime/platform the builder ran on.
    #[serde(default)]
    pub environment: String,
}

// ── Statement ───────────────────────────────────────────────────────────────

/// A composed provenance statement: the unit exchanged across the trust
/// boundary. Fields are read-only outside this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceStatement {
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub(crate) statement_type: Option<String>,
    pub(crate) subject: Vec<Subject>,
    #[serde(rename = "predicateType")]
    pub(crate) predicate_type: String,
    pub(crate) predicate: Predicate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub(crate) build_definition: BuildDefinition,
    pub(crate) run_details: RunDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildDefinition {
    pub(crate) build_type: String,
    #[serde(default)]
    pub(crate) external_parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDetails {
    pub(crate) builder: BuilderIdentity,
    pub(crate) metadata: RunMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub(crate) invocation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) started_on: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) finished_on: Option<DateTime<Utc>>,
}

impl ProvenanceStatement {
    pub fn statement_type(&self) -> Option<&str> {
        self.statement_type.as_deref()
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subject
    }

    pub fn predicate_type(&self) -> &str {
        &self.predicate_type
    }

    pub fn build_type(&self) -> &str {
        &self.predicate.build_definition.build_type
    }

    pub fn external_parameters(&self) -> &Map<String, Value> {
        &self.predicate.build_definition.external_parameters
    }

    pub fn builder(&self) -> &BuilderIdentity {
        &self.predicate.run_details.builder
    }

    pub fn invocation_id(&self) -> &str {
        &self.predicate.run_details.metadata.invocation_id
    }

    pub fn started_on(&self) -> Option<DateTime<Utc>> {
        self.predicate.run_details.metadata.started_on
    }

    pub fn finished_on(&self) -> Option<DateTime<Utc>> {
        self.predicate.run_details.metadata.finished_on
    }
}
