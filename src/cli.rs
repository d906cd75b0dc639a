// cli.rs — Command-line interface definitions (clap derive)
//
//   provenant digest    — hash content or a file
//   provenant attest    — create a provenance statement for one subject
//   provenant contract  — attest a smart-contract deployment
//   provenant verify    — verify a statement, optionally against artifacts (exit 1 when invalid)
//   provenant summary   — summarize a statement

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "provenant")]
#[command(about = "Provenant — build-provenance attestation tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a JSON config file (defaults apply when absent)
    #[arg(long, global = true, default_value = "provenant.json")]
    pub config: PathBuf,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute the digest of inline content or a file
    Digest {
        /// Inline UTF-8 content
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        content: Option<String>,

        /// File to hash
        #[arg(long)]
        file: Option<PathBuf>,

        /// Digest algorithm (sha256 or sha512)
        #[arg(long, default_value = "sha256")]
        algorithm: String,
    },

    /// Create a provenance statement for a single subject
    Attest(AttestArgs),

    /// Attest a smart-contract deployment
    Contract(ContractArgs),

    /// Verify a provenance statement
    Verify {
        /// Statement JSON file
        statement: PathBuf,

        /// Artifact file that must match one of the subjects (repeatable)
        #[arg(long = "artifact")]
        artifacts: Vec<PathBuf>,
    },

    /// Summarize a provenance statement
    Summary {
        /// Statement JSON file
        statement: PathBuf,
    },
}

#[derive(Args)]
pub struct AttestArgs {
    /// Artifact file to hash (alternative to --name + --digest)
    #[arg(long, conflicts_with = "digest")]
    pub file: Option<PathBuf>,

    /// Subject name (defaults to the file path with --file)
    #[arg(long)]
    pub name: Option<String>,

    /// Pre-computed digest, optionally tagged `sha256:`
    #[arg(long, requires = "name")]
    pub digest: Option<String>,

    /// Algorithm of --digest
    #[arg(long, default_value = "sha256")]
    pub algorithm: String,

    /// Builder identifier (URI)
    #[arg(long)]
    pub builder_id: String,

    /// Builder version
    #[arg(long)]
    pub builder_version: String,

    /// Build type URI (default from config)
    #[arg(long)]
    pub build_type: Option<String>,

    /// External parameter as key=value (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Write the result here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ContractArgs {
    /// Contract name
    #[arg(long)]
    pub name: String,

    /// Contract source file
    #[arg(long)]
    pub code: PathBuf,

    /// Contract version (default from config)
    #[arg(long = "contract-version")]
    pub contract_version: Option<String>,

    /// Deployer address
    #[arg(long)]
    pub deployer: Option<String>,

    /// Deployment transaction hash
    #[arg(long)]
    pub tx_hash: Option<String>,

    /// Write the result here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
}
