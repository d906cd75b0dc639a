//! Build-provenance attestations: content-addressed subjects, build metadata,
//! canonical provenance statements, and verification of untrusted statements.
//!
//! All operations are synchronous and perform no I/O, except
//! [`config::AttestConfig::load_or_default`] and [`hash::hash_file`].

pub mod config;
pub mod error;
pub mod hash;
pub mod provenance;

pub use config::AttestConfig;
pub use error::AttestError;
pub use hash::{compute_digest, DigestAlgorithm};
pub use provenance::compose::compose;
pub use provenance::metadata::{assemble, BuildMetadata};
pub use provenance::model::{BuilderIdentity, BuilderVersion, DigestSet, ProvenanceStatement, Subject};
pub use provenance::subject::SubjectSource;
pub use provenance::verify::{verify, verify_json, Reason, Verdict};
