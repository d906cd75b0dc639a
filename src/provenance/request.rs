// request.rs — One-shot attestation from a caller request
//
// Runs the full constructive flow for a single subject source:
// subject → assemble → caller overrides → mark_finished → compose.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::AttestConfig;
use crate::error::AttestError;
use crate::provenance::compose::compose;
use crate::provenance::metadata::assemble;
use crate::provenance::model::{BuilderVersion, ProvenanceStatement};
use crate::provenance::subject::SubjectSource;

#[derive(Debug, Clone)]
pub struct AttestationRequest {
    pub subject: SubjectSource,
    /// Overrides `AttestConfig::default_build_type` when set.
    pub build_type: Option<String>,
    pub builder_id: String,
    pub builder_version: String,
    pub external_parameters: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAttestation {
    pub provenance: ProvenanceStatement,
    pub attestation_id: String,
    pub subjects: usize,
    pub build_type: String,
}

pub fn create_attestation(
    request: AttestationRequest,
    config: &AttestConfig,
) -> Result<CreatedAttestation, AttestError> {
    if request.builder_id.trim().is_empty() {
        return Err(AttestError::InvalidBuilder("builder id is required".into()));
    }
    if request.builder_version.trim().is_empty() {
        return Err(AttestError::InvalidBuilder(
            "builder version is required".into(),
        ));
    }

    let label = request.subject.name().to_string();
    let subject = request.subject.into_subject()?;

    let mut metadata = assemble(
        &label,
        &config.default_builder_version,
        &request.builder_id,
        config,
    );
    metadata.set_builder_version(BuilderVersion {
        builder: request.builder_version,
        environment: config.builder_environment.clone(),
    });
    if let Some(build_type) = request.build_type.filter(|b| !b.trim().is_empty()) {
        metadata.set_build_type(build_type);
    }
    metadata.extend_external_parameters(request.external_parameters);
    metadata.mark_finished()?;

    let provenance = compose(&[subject], &metadata, config)?;
    Ok(CreatedAttestation {
        attestation_id: metadata.invocation_id().to_string(),
        subjects: provenance.subjects().len(),
        build_type: metadata.build_type().to_string(),
        provenance,
    })
}
