// canonical.rs — Deterministic JSON serialization for provenance statements
//
// Canonical JSON: sorted object keys at every level, compact format, standard
// JSON string escaping. Statement digests are ALWAYS computed over these
// bytes, never over a pretty-printed rendering.

use serde::Serialize;
use serde_json::Value;

use crate::error::AttestError;
use crate::hash;
use crate::provenance::model::ProvenanceStatement;

/// Serialize any value to canonical JSON bytes.
pub fn canonical_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, AttestError> {
    let value = serde_json::to_value(value)?;
    Ok(canonical_json(&value).into_bytes())
}

/// Produce canonical JSON from a serde_json::Value.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(s, out),
        Value::Array(arr) => {
            out.push('[');
            for (i, v) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            // serde_json::Map is not guaranteed sorted (preserve_order feature).
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    // Display for Value::String emits the escaped JSON string and cannot fail.
    out.push_str(&Value::String(s.to_string()).to_string());
}

impl ProvenanceStatement {
    /// Canonical JSON bytes of this statement.
    pub fn to_canonical_bytes(&self) -> Result<Vec<u8>, AttestError> {
        canonical_bytes(self)
    }

    /// SHA-256 over the canonical bytes, for audit trails.
    pub fn statement_digest(&self) -> Result<String, AttestError> {
        Ok(hash::sha256_hex(&self.to_canonical_bytes()?))
    }
}
