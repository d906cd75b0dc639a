// main.rs — Provenant CLI entry point
//
// A thin shell over the library: reads files, parses flags, prints JSON.
// All attestation semantics live in the `provenant` crate.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use cli::{AttestArgs, Cli, Commands, ContractArgs};
use provenant::hash;
use provenant::provenance::contract::{attest_contract, ContractDeployment};
use provenant::provenance::parse::parse_statement;
use provenant::provenance::request::{create_attestation, AttestationRequest};
use provenant::provenance::summary::summarize;
use provenant::provenance::verify::VerdictReport;
use provenant::{verify_json, AttestConfig, SubjectSource};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let config = AttestConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    match cli.command {
        Commands::Digest {
            content,
            file,
            algorithm,
        } => cmd_digest(content, file, &algorithm),
        Commands::Attest(args) => cmd_attest(args, &config),
        Commands::Contract(args) => cmd_contract(args, &config),
        Commands::Verify {
            statement,
            artifacts,
        } => cmd_verify(&statement, &artifacts, &config),
        Commands::Summary { statement } => {
            let value = read_json(&statement)?;
            print_json(&summarize(&value, &config))
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[derive(Serialize)]
struct DigestOutput {
    subject: String,
    digest: provenant::DigestSet,
    algorithm: String,
}

fn cmd_digest(content: Option<String>, file: Option<PathBuf>, algorithm: &str) -> Result<()> {
    let algorithm = hash::parse_algorithm(algorithm)?;
    let (subject, digest) = match (content, file) {
        (Some(text), _) => (
            "user-content".to_string(),
            hash::compute_digest(text.as_bytes(), algorithm),
        ),
        (None, Some(path)) => {
            let digest = hash::hash_file(&path, algorithm)
                .with_context(|| format!("hashing {}", path.display()))?;
            (path.display().to_string(), digest)
        }
        (None, None) => bail!("either --content or --file is required"),
    };
    print_json(&DigestOutput {
        subject,
        digest,
        algorithm: algorithm.to_string(),
    })
}

fn cmd_verify(statement: &Path, artifacts: &[PathBuf], config: &AttestConfig) -> Result<()> {
    let value = read_json(statement)?;
    let verdict = verify_json(&value, config);
    print_json(&VerdictReport::from(&verdict))?;
    if let Some(reason) = verdict.reason() {
        eprintln!("[provenant] INVALID — {}", reason);
        std::process::exit(1);
    }
    eprintln!("[provenant] VALID");

    if artifacts.is_empty() {
        return Ok(());
    }
    let parsed = parse_statement(&value)
        .with_context(|| format!("parsing {}", statement.display()))?;
    let mut unmatched = 0;
    for path in artifacts {
        let content = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        match parsed.subjects().iter().find(|s| s.matches_content(&content)) {
            Some(subject) => {
                eprintln!("[provenant] {} matches subject {}", path.display(), subject.name())
            }
            None => {
                eprintln!("[provenant] MISMATCH — {} matches no subject", path.display());
                unmatched += 1;
            }
        }
    }
    if unmatched > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_attest(args: AttestArgs, config: &AttestConfig) -> Result<()> {
    let subject = match (&args.file, &args.digest) {
        (Some(path), None) => {
            let content =
                fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            SubjectSource::Content {
                name: args
                    .name
                    .clone()
                    .unwrap_or_else(|| path.display().to_string()),
                content,
            }
        }
        (None, Some(digest)) => SubjectSource::Digest {
            name: args.name.clone().unwrap_or_default(),
            digest: digest.clone(),
            algorithm: hash::parse_algorithm(&args.algorithm)?,
        },
        _ => bail!("either --file or both --name and --digest must be provided"),
    };

    let request = AttestationRequest {
        subject,
        build_type: args.build_type,
        builder_id: args.builder_id,
        builder_version: args.builder_version,
        external_parameters: parse_params(&args.params)?,
    };
    let created = create_attestation(request, config)?;
    eprintln!("[provenant] Attestation ID: {}", created.attestation_id);
    eprintln!(
        "[provenant] Statement digest (canonical): {}",
        created.provenance.statement_digest()?
    );
    write_output(&created, args.output.as_deref())
}

fn cmd_contract(args: ContractArgs, config: &AttestConfig) -> Result<()> {
    let contract_code = fs::read_to_string(&args.code)
        .with_context(|| format!("reading {}", args.code.display()))?;
    let deployment = ContractDeployment {
        contract_name: args.name,
        contract_version: args.contract_version,
        deployer_address: args.deployer,
        contract_code,
        deployment_tx_hash: args.tx_hash,
    };
    let attestation = attest_contract(&deployment, config)?;
    eprintln!("[provenant] Contract: {}", attestation.contract_name);
    eprintln!("[provenant] Code hash: {}", attestation.code_hash);
    eprintln!("[provenant] Attestation ID: {}", attestation.attestation_id);
    write_output(&attestation, args.output.as_deref())
}

/// Parse `key=value` pairs; values that parse as JSON are kept typed.
fn parse_params(params: &[String]) -> Result<Map<String, Value>> {
    let mut map = Map::new();
    for param in params {
        let Some((key, raw)) = param.split_once('=') else {
            bail!("invalid --param {:?}: expected KEY=VALUE", param);
        };
        if key.trim().is_empty() {
            bail!("invalid --param {:?}: empty key", param);
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        map.insert(key.trim().to_string(), value);
    }
    Ok(map)
}

fn read_json(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_output<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, serde_json::to_string_pretty(value)?)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("[provenant] Written to {}", path.display());
            Ok(())
        }
        None => print_json(value),
    }
}
