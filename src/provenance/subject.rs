// subject.rs — Subject construction from raw content or a supplied digest

use crate::error::AttestError;
use crate::hash::{self, DigestAlgorithm};
use crate::provenance::model::{DigestSet, Subject};

/// Algorithm every content-derived subject carries.
pub const MANDATORY_ALGORITHM: DigestAlgorithm = DigestAlgorithm::Sha256;

impl Subject {
    /// Build a subject by hashing `content` with the mandatory algorithm.
    pub fn from_content(name: &str, content: &[u8]) -> Result<Subject, AttestError> {
        Subject::from_content_with(name, content, &[])
    }

    /// Like [`Subject::from_content`], adding digests for `extra` algorithms.
    pub fn from_content_with(
        name: &str,
        content: &[u8],
        extra: &[DigestAlgorithm],
    ) -> Result<Subject, AttestError> {
        let name = checked_name(name)?;
        let mut digest = DigestSet::new();
        digest.insert(
            MANDATORY_ALGORITHM,
            hash::digest_hex(content, MANDATORY_ALGORITHM),
        );
        for &alg in extra {
            digest.insert(alg, hash::digest_hex(content, alg));
        }
        tracing::debug!(subject = %name, bytes = content.len(), "subject hashed from content");
        Ok(Subject { name, digest })
    }

    /// Build a subject from a pre-computed digest.
    ///
    /// A leading `<algorithm>:` tag is stripped before validation; a tag
    /// naming a different algorithm than `algorithm` is rejected.
    pub fn from_digest(
        name: &str,
        digest: &str,
        algorithm: DigestAlgorithm,
    ) -> Result<Subject, AttestError> {
        let name = checked_name(name)?;
        let raw = strip_algorithm_prefix(digest.trim(), algorithm)?;
        let hex = hash::normalize_hex(algorithm, raw)?;
        let mut set = DigestSet::new();
        set.insert(algorithm, hex);
        Ok(Subject { name, digest: set })
    }

    /// Re-check the construction invariants.
    ///
    /// Subjects built by `from_content`/`from_digest` always pass; this
    /// catches ones that arrived through deserialization.
    pub fn validate(&self) -> Result<(), AttestError> {
        if self.name.trim().is_empty() {
            return Err(AttestError::InvalidSubjectName);
        }
        if self.digest.is_empty() {
            return Err(AttestError::malformed("none", "digest map is empty"));
        }
        for (name, hex) in self.digest.iter() {
            let algorithm = hash::parse_algorithm(name)
                .map_err(|_| AttestError::malformed(name, "unsupported algorithm key"))?;
            if algorithm.as_str() != name {
                return Err(AttestError::malformed(name, "algorithm key is not lower-case"));
            }
            hash::normalize_hex(algorithm, hex)?;
        }
        Ok(())
    }

    /// True when every digest in this subject matches `content`.
    pub fn matches_content(&self, content: &[u8]) -> bool {
        !self.digest.is_empty()
            && self.digest.iter().all(|(name, hex)| {
                hash::parse_algorithm(name)
                    .map(|alg| hash::digests_match(alg, hex, &hash::digest_hex(content, alg)))
                    .unwrap_or(false)
            })
    }
}

/// Either-or input for subject creation: hash the bytes, or trust a digest.
#[derive(Debug, Clone)]
pub enum SubjectSource {
    Content {
        name: String,
        content: Vec<u8>,
    },
    Digest {
        name: String,
        digest: String,
        algorithm: DigestAlgorithm,
    },
}

impl SubjectSource {
    pub fn name(&self) -> &str {
        match self {
            SubjectSource::Content { name, .. } | SubjectSource::Digest { name, .. } => name,
        }
    }

    pub fn into_subject(self) -> Result<Subject, AttestError> {
        match self {
            SubjectSource::Content { name, content } => Subject::from_content(&name, &content),
            SubjectSource::Digest {
                name,
                digest,
                algorithm,
            } => Subject::from_digest(&name, &digest, algorithm),
        }
    }
}

fn checked_name(name: &str) -> Result<String, AttestError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AttestError::InvalidSubjectName);
    }
    Ok(trimmed.to_string())
}

fn strip_algorithm_prefix(digest: &str, algorithm: DigestAlgorithm) -> Result<&str, AttestError> {
    match digest.split_once(':') {
        None => Ok(digest),
        Some((tag, rest)) => {
            if tag.eq_ignore_ascii_case(algorithm.as_str()) {
                Ok(rest)
            } else {
                Err(AttestError::malformed(
                    algorithm.as_str(),
                    format!("digest is tagged {:?}", tag),
                ))
            }
        }
    }
}
