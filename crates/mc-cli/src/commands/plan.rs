//! `mc plan`: load config, store snapshot, rendered targets and one intent,
//! then print the change set the reconciler computes. Read-only.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use mc_config::{
    report_unused_keys, MissingRealizationPolicy, ReconcilerSettings, UnusedKeyPolicy,
};
use mc_reconcile::document::{self, Document, RenderedEntry};
use mc_reconcile::{
    ChangeSet, ClusterInfo, IntentEvent, IntentObject, LowLevelConfig, Reconciler, StoreSnapshot,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{init_tracing, read_documents, read_text};

pub struct PlanArgs<'a> {
    pub config_paths: &'a [String],
    pub store_path: &'a str,
    pub rendered_path: &'a str,
    pub intent_path: &'a str,
    pub event: IntentEvent,
    pub strict_config: bool,
}

/// JSON printed on stdout. Deletions carry `spec: null`.
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub generated_at_utc: String,
    pub config_hash: String,
    pub cluster: String,
    pub intent: String,
    pub event: String,
    pub additions: Vec<Document>,
    pub modifications: Vec<Document>,
    pub deletions: Vec<Document>,
    pub missing: Vec<String>,
}

pub fn run(args: PlanArgs<'_>) -> Result<()> {
    let path_refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = mc_config::load_layered_yaml(&path_refs)?;
    let settings = ReconcilerSettings::from_config_json(&loaded.config_json);

    // Tracing comes up before settings errors propagate so they are not lost.
    init_tracing(
        settings
            .as_ref()
            .ok()
            .and_then(|s| s.log_filter.as_deref()),
    );
    let settings = settings.context("invalid reconciler config")?;

    let unused_policy = if args.strict_config {
        UnusedKeyPolicy::Fail
    } else {
        UnusedKeyPolicy::Warn
    };
    let unused = report_unused_keys(&loaded.config_json, unused_policy)?;
    for ptr in &unused.unused_leaf_pointers {
        warn!(key = %ptr, "config key is not read by the reconciler");
    }

    let cluster = ClusterInfo::new(
        settings.cluster.name.clone(),
        settings.cluster.gateway_ip.to_string(),
        settings.cluster.gateway_port,
    );
    let store = load_store(args.store_path)?;
    let converter = load_rendered(args.rendered_path)?;
    let intent = load_intent(args.intent_path)?;

    info!(
        config_hash = %loaded.config_hash,
        cluster = %cluster.name,
        stored = store.len(),
        "planning"
    );

    let changes = Reconciler::new(&store, &converter, &cluster)
        .plan(args.event, &intent)
        .with_context(|| format!("reconcile {} on {} failed", args.event, intent.key()))?;

    let report = build_report(&loaded.config_hash, &cluster, &intent, args.event, &changes)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(missing) = &changes.missing {
        if settings.missing_realization == MissingRealizationPolicy::Fail {
            bail!("MISSING_REALIZATIONS: {missing}");
        }
    }

    Ok(())
}

fn load_store(path: &str) -> Result<StoreSnapshot> {
    let configs = read_documents(path)?
        .into_iter()
        .map(document::to_stored)
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("{path}: invalid stored config"))?;
    Ok(StoreSnapshot::from_configs(configs)?)
}

fn load_rendered(path: &str) -> Result<mc_reconcile::Prerendered> {
    let raw = read_text(path)?;
    let entries: Option<Vec<RenderedEntry>> =
        serde_yaml::from_str(&raw).with_context(|| format!("{path}: malformed rendered targets"))?;
    document::to_prerendered(entries.unwrap_or_default())
        .with_context(|| format!("{path}: invalid rendered target"))
}

fn load_intent(path: &str) -> Result<IntentObject> {
    let mut docs = read_documents(path)?;
    if docs.len() != 1 {
        bail!("{path}: expected exactly one intent document, found {}", docs.len());
    }
    let doc = docs.remove(0);
    document::to_intent(doc).with_context(|| format!("{path}: invalid intent"))
}

fn render_all(configs: &[LowLevelConfig]) -> Result<Vec<Document>> {
    configs
        .iter()
        .map(|c| document::from_low_level(c).map_err(anyhow::Error::from))
        .collect()
}

fn build_report(
    config_hash: &str,
    cluster: &ClusterInfo,
    intent: &IntentObject,
    event: IntentEvent,
    changes: &ChangeSet,
) -> Result<PlanReport> {
    Ok(PlanReport {
        generated_at_utc: Utc::now().to_rfc3339(),
        config_hash: config_hash.to_string(),
        cluster: cluster.name.clone(),
        intent: intent.key().to_string(),
        event: event.to_string(),
        additions: render_all(&changes.additions)?,
        modifications: render_all(&changes.modifications)?,
        deletions: render_all(&changes.deletions)?,
        missing: changes
            .missing
            .as_ref()
            .map(|m| m.causes().iter().map(|c| c.to_string()).collect())
            .unwrap_or_default(),
    })
}
