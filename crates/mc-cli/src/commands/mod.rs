//! Command handlers for mc-cli.
//!
//! Shared file and logging helpers live here; command logic lives in the
//! submodules.

pub mod plan;

use anyhow::{Context, Result};
use mc_reconcile::document::Document;
use serde::Deserialize;
use std::fs;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout stays machine-readable. RUST_LOG wins over
/// the configured filter, which wins over "info".
pub fn init_tracing(configured: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| configured.and_then(|f| EnvFilter::try_new(f).ok()))
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn read_text(path: &str) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("read failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    String::from_utf8(bytes.to_vec()).with_context(|| format!("{path} must be UTF-8 text"))
}

/// Read a YAML stream of documents. A stream entry may be one document or a
/// list of them; empty entries are skipped.
pub fn read_documents(path: &str) -> Result<Vec<Document>> {
    let raw = read_text(path)?;
    let mut out = Vec::new();
    for (i, de) in serde_yaml::Deserializer::from_str(&raw).enumerate() {
        let v = serde_yaml::Value::deserialize(de)
            .with_context(|| format!("{path}: invalid yaml in document #{i}"))?;
        match v {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Sequence(_) => {
                let docs: Vec<Document> = serde_yaml::from_value(v)
                    .with_context(|| format!("{path}: malformed document list #{i}"))?;
                out.extend(docs);
            }
            other => {
                let doc: Document = serde_yaml::from_value(other)
                    .with_context(|| format!("{path}: malformed document #{i}"))?;
                out.push(doc);
            }
        }
    }
    Ok(out)
}
