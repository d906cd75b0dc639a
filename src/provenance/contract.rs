// contract.rs — Smart-contract deployment attestations
//
// The subject is `<contractName>.sol` hashed over the contract source; the
// deployment facts (tx hash, deployer, version) travel as external
// parameters under the contract deployment build type.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::AttestConfig;
use crate::error::AttestError;
use crate::provenance::compose::compose;
use crate::provenance::metadata::assemble;
use crate::provenance::model::{ProvenanceStatement, Subject};

const UNKNOWN_DEPLOYER: &str = "unknown";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDeployment {
    pub contract_name: String,
    #[serde(default)]
    pub contract_version: Option<String>,
    #[serde(default)]
    pub deployer_address: Option<String>,
    pub contract_code: String,
    #[serde(default)]
    pub deployment_tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractAttestation {
    pub provenance: ProvenanceStatement,
    pub contract_name: String,
    pub contract_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployer_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_tx_hash: Option<String>,
    pub code_hash: String,
    pub attestation_id: String,
}

pub fn attest_contract(
    deployment: &ContractDeployment,
    config: &AttestConfig,
) -> Result<ContractAttestation, AttestError> {
    if deployment.contract_name.trim().is_empty() {
        return Err(AttestError::MissingContractField("contractName"));
    }
    if deployment.contract_code.is_empty() {
        return Err(AttestError::MissingContractField("contractCode"));
    }

    let subject = Subject::from_content(
        &format!("{}.sol", deployment.contract_name.trim()),
        deployment.contract_code.as_bytes(),
    )?;
    let code_hash = subject.digest().sha256().unwrap_or_default().to_string();

    let version = deployment
        .contract_version
        .clone()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| config.default_builder_version.clone());
    let deployer = deployment
        .deployer_address
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(UNKNOWN_DEPLOYER);

    let mut metadata = assemble(&deployment.contract_name, &version, deployer, config);
    metadata
        .set_build_type(config.contract_build_type.clone())
        .extend_external_parameters([
            ("contractName".to_string(), json!(deployment.contract_name)),
            ("contractVersion".to_string(), json!(version)),
            ("deployerAddress".to_string(), optional(&deployment.deployer_address)),
            (
                "deploymentTxHash".to_string(),
                optional(&deployment.deployment_tx_hash),
            ),
        ]);
    metadata.mark_finished()?;

    let provenance = compose(std::slice::from_ref(&subject), &metadata, config)?;
    tracing::info!(
        contract = %deployment.contract_name,
        attestation_id = %metadata.invocation_id(),
        "contract deployment attested"
    );

    Ok(ContractAttestation {
        provenance,
        contract_name: deployment.contract_name.clone(),
        contract_version: version,
        deployer_address: deployment.deployer_address.clone(),
        deployment_tx_hash: deployment.deployment_tx_hash.clone(),
        code_hash,
        attestation_id: metadata.invocation_id().to_string(),
    })
}

fn optional(value: &Option<String>) -> Value {
    value.as_ref().map_or(Value::Null, |v| json!(v))
}
