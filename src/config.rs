// config.rs — Attestation defaults passed explicitly to the core
//
// Nothing in the core reads a module-level default: the assembler, composer
// and verifier all take an `AttestConfig`, so alternate schema versions can
// be substituted per call.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::AttestError;

pub const SLSA_PROVENANCE_V1: &str = "https://slsa.dev/provenance/v1";
pub const IN_TOTO_STATEMENT_V1: &str = "https://in-toto.io/Statement/v1";
pub const DEFAULT_BUILD_TYPE: &str = "https://provenant.dev/build/v1";
pub const CONTRACT_DEPLOYMENT_BUILD_TYPE: &str = "https://provenant.dev/contracts/deployment/v1";
pub const DEFAULT_BUILDER_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttestConfig {
    /// The only predicate type the composer emits and the verifier accepts.
    pub predicate_type: String,
    /// `_type` written on composed statements.
    pub statement_type: String,
    /// Build type set by `assemble` until the caller overrides it.
    pub default_build_type: String,
    /// Build type for contract deployment attestations.
    pub contract_build_type: String,
    /// Runtime/platform identifier recorded as `builder.version.environment`.
    pub builder_environment: String,
    pub default_builder_version: String,
}

impl Default for AttestConfig {
    fn default() -> Self {
        AttestConfig {
            predicate_type: SLSA_PROVENANCE_V1.to_string(),
            statement_type: IN_TOTO_STATEMENT_V1.to_string(),
            default_build_type: DEFAULT_BUILD_TYPE.to_string(),
            contract_build_type: CONTRACT_DEPLOYMENT_BUILD_TYPE.to_string(),
            builder_environment: runtime_environment(),
            default_builder_version: DEFAULT_BUILDER_VERSION.to_string(),
        }
    }
}

impl AttestConfig {
    /// Load config from a JSON file, or fall back to defaults when absent.
    pub fn load_or_default(path: &Path) -> Result<Self, AttestError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(AttestConfig::default());
        }
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data).map_err(|source| AttestError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Identifier for the platform this binary runs on, e.g. `linux-x86_64`.
pub fn runtime_environment() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}
