// provenance/ — Attestation/provenance engine
//
// model.rs     — Data structures (serde) matching the statement wire shape
// subject.rs   — Subject construction from content or a supplied digest
// metadata.rs  — In-progress build metadata (assemble, mark_finished)
// compose.rs   — Freeze subjects + metadata into a ProvenanceStatement
// canonical.rs — Sorted-key compact JSON for byte-stable digests
// parse.rs     — Untrusted JSON → strict statement shape
// verify.rs    — Structural and semantic verification verdicts
// request.rs   — One-shot attestation from a caller request
// contract.rs  — Smart-contract deployment attestations
// summary.rs   — Never-failing summary of a statement

pub mod canonical;
pub mod compose;
pub mod contract;
pub mod metadata;
pub mod model;
pub mod parse;
pub mod request;
pub mod subject;
pub mod summary;
pub mod verify;
