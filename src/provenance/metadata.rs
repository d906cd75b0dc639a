// metadata.rs — In-progress build metadata
//
// `BuildMetadata` is the mutable, builder-style half of the attestation
// flow. It is owned by one attestation request; composition snapshots it
// into an immutable `ProvenanceStatement`. `mark_finished` is single-writer
// and refuses to overwrite an existing finish time.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::config::AttestConfig;
use crate::error::AttestError;
use crate::provenance::model::{BuilderIdentity, BuilderVersion};

#[derive(Debug, Clone, PartialEq)]
pub struct BuildMetadata {
    subject_label: String,
    pub(crate) invocation_id: String,
    builder: BuilderIdentity,
    build_type: String,
    external_parameters: Map<String, Value>,
    started_on: DateTime<Utc>,
    finished_on: Option<DateTime<Utc>>,
}

/// Start metadata for a new build run.
///
/// Generates a fresh UUID v4 invocation id, stamps `started_on` with the
/// current instant, and leaves `finished_on` unset.
pub fn assemble(
    subject_label: &str,
    builder_version: &str,
    builder_id: &str,
    config: &AttestConfig,
) -> BuildMetadata {
    let metadata = BuildMetadata {
        subject_label: subject_label.to_string(),
        invocation_id: uuid::Uuid::new_v4().to_string(),
        builder: BuilderIdentity {
            id: builder_id.to_string(),
            version: BuilderVersion {
                builder: builder_version.to_string(),
                environment: config.builder_environment.clone(),
            },
        },
        build_type: config.default_build_type.clone(),
        external_parameters: Map::new(),
        started_on: Utc::now(),
        finished_on: None,
    };
    tracing::debug!(
        invocation_id = %metadata.invocation_id,
        subject = %metadata.subject_label,
        builder = %metadata.builder.id,
        "build metadata assembled"
    );
    metadata
}

impl BuildMetadata {
    pub fn subject_label(&self) -> &str {
        &self.subject_label
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn builder(&self) -> &BuilderIdentity {
        &self.builder
    }

    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    pub fn external_parameters(&self) -> &Map<String, Value> {
        &self.external_parameters
    }

    pub fn started_on(&self) -> DateTime<Utc> {
        self.started_on
    }

    pub fn finished_on(&self) -> Option<DateTime<Utc>> {
        self.finished_on
    }

    pub fn set_build_type(&mut self, build_type: impl Into<String>) -> &mut Self {
        self.build_type = build_type.into();
        self
    }

    pub fn set_builder_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.builder.id = id.into();
        self
    }

    pub fn set_builder_version(&mut self, version: BuilderVersion) -> &mut Self {
        self.builder.version = version;
        self
    }

    pub fn insert_external_parameter(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.external_parameters.insert(key.into(), value);
        self
    }

    /// Merge keys into the external parameters; later keys win.
    pub fn extend_external_parameters<I>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        self.external_parameters.extend(params);
        self
    }

    /// Stamp `finished_on` with the current instant.
    pub fn mark_finished(&mut self) -> Result<&mut Self, AttestError> {
        // Utc::now() is not monotonic; never record a finish before the start.
        let now = Utc::now().max(self.started_on);
        self.mark_finished_at(now)
    }

    /// Stamp `finished_on` with an explicit instant.
    pub fn mark_finished_at(&mut self, at: DateTime<Utc>) -> Result<&mut Self, AttestError> {
        if self.finished_on.is_some() {
            return Err(AttestError::AlreadyFinished);
        }
        if at < self.started_on {
            return Err(AttestError::TemporalInconsistency {
                started_on: self.started_on.to_rfc3339_opts(SecondsFormat::AutoSi, true),
                finished_on: at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            });
        }
        self.finished_on = Some(at);
        tracing::debug!(invocation_id = %self.invocation_id, "build metadata marked finished");
        Ok(self)
    }
}
