// hash.rs — Digest engine
//
// Pure, deterministic content hashing over the allowed algorithm set
// {sha256, sha512}, plus the single hex/length rule shared by subject
// construction and verification.

use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::AttestError;
use crate::provenance::model::DigestSet;

/// A digest algorithm from the allowed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DigestAlgorithm {
    Sha256,
    Sha512,
}

impl DigestAlgorithm {
    /// Every algorithm the engine accepts.
    pub const ALL: [DigestAlgorithm; 2] = [DigestAlgorithm::Sha256, DigestAlgorithm::Sha512];

    /// Lower-case name used as the key in a digest map.
    pub fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Sha512 => "sha512",
        }
    }

    /// Number of hex characters in a digest of this algorithm.
    pub fn hex_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => 64,
            DigestAlgorithm::Sha512 => 128,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = AttestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_algorithm(s)
    }
}

/// Resolve an algorithm name (case-insensitive) against the allowed set.
pub fn parse_algorithm(name: &str) -> Result<DigestAlgorithm, AttestError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "sha256" => Ok(DigestAlgorithm::Sha256),
        "sha512" => Ok(DigestAlgorithm::Sha512),
        _ => Err(AttestError::UnsupportedAlgorithm(name.to_string())),
    }
}

/// Compute the digest of `content` under a single algorithm.
pub fn compute_digest(content: &[u8], algorithm: DigestAlgorithm) -> DigestSet {
    let mut set = DigestSet::new();
    set.insert(algorithm, digest_hex(content, algorithm));
    set
}

/// Hex digest of `content` under `algorithm`.
pub fn digest_hex(content: &[u8], algorithm: DigestAlgorithm) -> String {
    match algorithm {
        DigestAlgorithm::Sha256 => sha256_hex(content),
        DigestAlgorithm::Sha512 => sha512_hex(content),
    }
}

/// Compute SHA-256 hex digest of a byte slice.
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex_encode(&hasher.finalize())
}

/// Compute SHA-512 hex digest of a byte slice.
pub fn sha512_hex(data: &[u8]) -> String {
    let mut hasher = Sha512::new();
    hasher.update(data);
    hex_encode(&hasher.finalize())
}

/// Read a file and digest its bytes.
pub fn hash_file(path: &Path, algorithm: DigestAlgorithm) -> std::io::Result<DigestSet> {
    let data = fs::read(path)?;
    Ok(compute_digest(&data, algorithm))
}

/// Lower-case `value` and check it is exactly `hex_len` hex characters.
///
/// No truncation or prefix matching: anything else is `MalformedDigest`.
pub fn normalize_hex(algorithm: DigestAlgorithm, value: &str) -> Result<String, AttestError> {
    let lowered = value.to_ascii_lowercase();
    if let Some(bad) = lowered.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(AttestError::malformed(
            algorithm.as_str(),
            format!("non-hex character {:?}", bad),
        ));
    }
    if lowered.len() != algorithm.hex_len() {
        return Err(AttestError::malformed(
            algorithm.as_str(),
            format!(
                "expected {} hex characters, got {}",
                algorithm.hex_len(),
                lowered.len()
            ),
        ));
    }
    Ok(lowered)
}

/// Exact comparison after case normalization. Malformed values never match.
pub fn digests_match(algorithm: DigestAlgorithm, a: &str, b: &str) -> bool {
    match (normalize_hex(algorithm, a), normalize_hex(algorithm, b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn sha256_empty_reference_vector() {
        assert_eq!(sha256_hex(b""), EMPTY_SHA256);
    }

    #[test]
    fn sha256_hello_reference_vector() {
        assert_eq!(sha256_hex(b"hello"), HELLO_SHA256);
    }

    #[test]
    fn sha512_empty_reference_vector() {
        assert_eq!(
            sha512_hex(b""),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn compute_digest_is_deterministic() {
        let a = compute_digest(b"artifact bytes", DigestAlgorithm::Sha256);
        let b = compute_digest(b"artifact bytes", DigestAlgorithm::Sha256);
        assert_eq!(a, b);
        assert_eq!(a.get(DigestAlgorithm::Sha256).map(str::len), Some(64));
    }

    #[test]
    fn generated_digests_match_algorithm_length() {
        for alg in DigestAlgorithm::ALL {
            let hex = digest_hex(b"some content", alg);
            assert_eq!(hex.len(), alg.hex_len());
            assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn parse_algorithm_rejects_unknown() {
        assert_eq!(parse_algorithm("SHA256").unwrap(), DigestAlgorithm::Sha256);
        assert_eq!("sha512".parse::<DigestAlgorithm>().unwrap(), DigestAlgorithm::Sha512);
        assert!(matches!(
            parse_algorithm("md5"),
            Err(AttestError::UnsupportedAlgorithm(name)) if name == "md5"
        ));
    }

    #[test]
    fn normalize_lowercases_valid_hex() {
        let upper = HELLO_SHA256.to_ascii_uppercase();
        assert_eq!(
            normalize_hex(DigestAlgorithm::Sha256, &upper).unwrap(),
            HELLO_SHA256
        );
    }

    #[test]
    fn normalize_rejects_wrong_length_and_non_hex() {
        assert!(matches!(
            normalize_hex(DigestAlgorithm::Sha256, &HELLO_SHA256[..63]),
            Err(AttestError::MalformedDigest { .. })
        ));
        // A valid sha256 is not a valid sha512.
        assert!(normalize_hex(DigestAlgorithm::Sha512, HELLO_SHA256).is_err());
        let mut bad = HELLO_SHA256.to_string();
        bad.replace_range(0..1, "g");
        assert!(normalize_hex(DigestAlgorithm::Sha256, &bad).is_err());
    }

    #[test]
    fn digests_match_is_exact_after_case_folding() {
        let upper = HELLO_SHA256.to_ascii_uppercase();
        assert!(digests_match(DigestAlgorithm::Sha256, HELLO_SHA256, &upper));
        assert!(!digests_match(DigestAlgorithm::Sha256, HELLO_SHA256, EMPTY_SHA256));
        // Prefixes never match.
        assert!(!digests_match(
            DigestAlgorithm::Sha256,
            HELLO_SHA256,
            &HELLO_SHA256[..32]
        ));
    }

    #[test]
    fn hash_file_matches_bytes() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), b"hello").unwrap();
        let set = hash_file(tmp.path(), DigestAlgorithm::Sha256).unwrap();
        assert_eq!(set.sha256(), Some(HELLO_SHA256));
        assert!(hash_file(&tmp.path().join("missing"), DigestAlgorithm::Sha256).is_err());
    }
}
