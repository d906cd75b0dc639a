// compose.rs — Freeze subjects + finished metadata into a statement
//
// This is the single point where the trust-boundary-crossing artifact is
// created. Every required field must already be present; nothing is
// defaulted here.

use crate::config::AttestConfig;
use crate::error::AttestError;
use crate::provenance::metadata::BuildMetadata;
use crate::provenance::model::{
    BuildDefinition, Predicate, ProvenanceStatement, RunDetails, RunMetadata, Subject,
};

/// Compose a provenance statement from a snapshot of `metadata`.
///
/// Fails with `EmptySubjectList` if `subjects` is empty, with the subject's
/// own error if one fails validation, and with `IncompleteMetadata` if the
/// build is unfinished or a required metadata field is blank.
pub fn compose(
    subjects: &[Subject],
    metadata: &BuildMetadata,
    config: &AttestConfig,
) -> Result<ProvenanceStatement, AttestError> {
    if subjects.is_empty() {
        return Err(AttestError::EmptySubjectList);
    }
    for subject in subjects {
        subject.validate()?;
    }
    let required = [
        metadata.build_type(),
        metadata.builder().id.as_str(),
        metadata.invocation_id(),
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(AttestError::IncompleteMetadata);
    }
    let finished_on = metadata
        .finished_on()
        .ok_or(AttestError::IncompleteMetadata)?;

    let statement = ProvenanceStatement {
        statement_type: Some(config.statement_type.clone()),
        subject: subjects.to_vec(),
        predicate_type: config.predicate_type.clone(),
        predicate: Predicate {
            build_definition: BuildDefinition {
                build_type: metadata.build_type().to_string(),
                external_parameters: metadata.external_parameters().clone(),
            },
            run_details: RunDetails {
                builder: metadata.builder().clone(),
                metadata: RunMetadata {
                    invocation_id: metadata.invocation_id().to_string(),
                    started_on: Some(metadata.started_on()),
                    finished_on: Some(finished_on),
                },
            },
        },
    };

    tracing::info!(
        invocation_id = %metadata.invocation_id(),
        label = %metadata.subject_label(),
        subjects = subjects.len(),
        build_type = %metadata.build_type(),
        "provenance statement composed"
    );
    Ok(statement)
}
