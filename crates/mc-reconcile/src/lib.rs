//! mc-reconcile
//!
//! Multicluster reconciliation engine.
//!
//! Given one changed intent object (a `RemoteServiceBinding` or a
//! `ServiceExpositionPolicy`) and a read-only view of the mesh config store,
//! compute the low-level configs to add, modify or delete so the store
//! matches intent.
//!
//! - Add: absent targets are additions, drifted targets are modifications.
//! - Modify: every target must exist; one absent target fails the call.
//! - Delete: only provenanced configs are deleted, by identity alone; missing
//!   targets are aggregated as a soft error next to the deletions.
//!
//! Deterministic, pure logic. No IO. No store writes.

mod convert;
pub mod document;
mod engine;
pub mod equality;
mod error;
pub mod provenance;
mod reconciler;
pub mod spec;
mod store;
mod types;

pub use convert::{Converter, Prerendered};
pub use engine::{add_config, delete_config, modify_config, AddOutcome, DeleteOutcome};
pub use equality::{specs_equal, SpecEq};
pub use error::{ConvertError, MissingRealization, MissingRealizations, ReconcileError};
pub use provenance::{has_provenance, stamp_provenance, PROVENANCE_ANNOTATION_KEY};
pub use reconciler::{ChangeSet, IntentEvent, Reconciler};
pub use spec::ConfigSpec;
pub use store::{ConfigStore, DuplicateConfig, StoreSnapshot};
pub use types::*;
