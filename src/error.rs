// error.rs — Typed failures for the attestation core
//
// Input-shape errors (bad digest, empty name) and state-contract violations
// (double finish, incomplete metadata, empty subject list) are distinct
// variants so callers can branch on cause. Verification verdicts are NOT
// errors; see provenance::verify.

use std::path::PathBuf;

/// Errors from building or composing provenance.
#[derive(Debug, thiserror::Error)]
pub enum AttestError {
    /// Digest algorithm outside the allowed set.
    #[error("unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Subject name is empty after trimming.
    #[error("subject name must not be empty")]
    InvalidSubjectName,

    /// Digest string is not valid hex of the expected length.
    #[error("malformed {algorithm} digest: {reason}")]
    MalformedDigest {
        /// Algorithm the digest was checked against.
        algorithm: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// `mark_finished` was called on metadata that already has a finish time.
    #[error("build metadata is already marked finished")]
    AlreadyFinished,

    /// A finish time earlier than the start time was supplied.
    #[error("finish time {finished_on} precedes start time {started_on}")]
    TemporalInconsistency {
        /// RFC 3339 start time.
        started_on: String,
        /// RFC 3339 finish time that was rejected.
        finished_on: String,
    },

    /// Composition was asked to attest zero subjects.
    #[error("provenance requires at least one subject")]
    EmptySubjectList,

    /// Composition was given metadata without a finish time.
    #[error("build metadata is incomplete: finishedOn is not set")]
    IncompleteMetadata,

    /// Builder id or version missing from an attestation request.
    #[error("invalid builder: {0}")]
    InvalidBuilder(String),

    /// Contract deployment request lacks a required field.
    #[error("contract deployment is missing {0}")]
    MissingContractField(&'static str),

    /// Configuration file could not be parsed.
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        /// Config file path.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// Statement serialization failed.
    #[error("failed to serialize provenance: {0}")]
    Serialize(#[from] serde_json::Error),

    /// I/O failure while loading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AttestError {
    pub(crate) fn malformed(algorithm: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDigest {
            algorithm: algorithm.into(),
            reason: reason.into(),
        }
    }
}
