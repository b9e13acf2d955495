//! Error types.
//!
//! Two classes exist:
//! - [`ReconcileError`] is a hard failure: the whole call is aborted and the
//!   caller must apply nothing from it.
//! - [`MissingRealizations`] is the delete path's soft failure: it travels
//!   alongside valid deletions that the caller must still apply.

use crate::{ConfigKey, IntentKey};

// ---------------------------------------------------------------------------
// Converter failures
// ---------------------------------------------------------------------------

/// Error raised by a [`crate::Converter`]. Propagated verbatim by every entry
/// point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertError {
    pub intent: Option<IntentKey>,
    pub reason: String,
}

impl ConvertError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            intent: None,
            reason: reason.into(),
        }
    }

    pub fn for_intent(intent: IntentKey, reason: impl Into<String>) -> Self {
        Self {
            intent: Some(intent),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.intent {
            Some(intent) => write!(f, "cannot convert {intent}: {}", self.reason),
            None => write!(f, "conversion failed: {}", self.reason),
        }
    }
}

impl std::error::Error for ConvertError {}

// ---------------------------------------------------------------------------
// Hard failures
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileError {
    /// The converter rejected the intent object.
    Convert(ConvertError),
    /// A modified intent maps to a config the store does not hold. The store
    /// is inconsistent with intent; no modifications are returned.
    UnknownTarget { intent: IntentKey, target: ConfigKey },
}

impl std::fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileError::Convert(e) => e.fmt(f),
            ReconcileError::UnknownTarget { intent, target } => write!(
                f,
                "expected to modify existing mesh config but {intent} makes unknown config {target}"
            ),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Convert(e) => Some(e),
            ReconcileError::UnknownTarget { .. } => None,
        }
    }
}

impl From<ConvertError> for ReconcileError {
    fn from(e: ConvertError) -> Self {
        ReconcileError::Convert(e)
    }
}

// ---------------------------------------------------------------------------
// Soft failures (delete path)
// ---------------------------------------------------------------------------

/// One target the intent should have realized but the store does not hold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingRealization {
    pub intent: IntentKey,
    pub target: ConfigKey,
}

impl std::fmt::Display for MissingRealization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} should have been realized by {}; skipping",
            self.intent, self.target
        )
    }
}

impl std::error::Error for MissingRealization {}

/// Every [`MissingRealization`] found during one delete call, in converter
/// order. Never empty: an empty collection is represented as `None` by
/// [`MissingRealizations::from_causes`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingRealizations {
    causes: Vec<MissingRealization>,
}

impl MissingRealizations {
    pub fn from_causes(causes: Vec<MissingRealization>) -> Option<Self> {
        if causes.is_empty() {
            None
        } else {
            Some(Self { causes })
        }
    }

    pub fn causes(&self) -> &[MissingRealization] {
        &self.causes
    }

    pub fn len(&self) -> usize {
        self.causes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }

    pub fn into_causes(self) -> Vec<MissingRealization> {
        self.causes
    }
}

impl std::fmt::Display for MissingRealizations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let [only] = self.causes.as_slice() {
            return only.fmt(f);
        }
        write!(f, "{} errors occurred:", self.causes.len())?;
        for c in &self.causes {
            write!(f, "\n\t* {c}")?;
        }
        Ok(())
    }
}

impl std::error::Error for MissingRealizations {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigKind, IntentKind};

    fn miss(name: &str) -> MissingRealization {
        MissingRealization {
            intent: IntentKey::new(IntentKind::RemoteServiceBinding, "bind", "ns1"),
            target: ConfigKey::new(ConfigKind::ServiceEntry, name, "ns1"),
        }
    }

    #[test]
    fn unknown_target_names_intent_and_target() {
        let e = ReconcileError::UnknownTarget {
            intent: IntentKey::new(IntentKind::ServiceExpositionPolicy, "expose", "ns1"),
            target: ConfigKey::new(ConfigKind::VirtualService, "svc-a", "ns1"),
        };
        let msg = e.to_string();
        assert!(msg.contains("ServiceExpositionPolicy expose.ns1"), "{msg}");
        assert!(msg.contains("VirtualService svc-a.ns1"), "{msg}");
    }

    #[test]
    fn empty_aggregate_is_none() {
        assert!(MissingRealizations::from_causes(Vec::new()).is_none());
    }

    #[test]
    fn aggregate_keeps_every_cause_in_order() {
        let agg = MissingRealizations::from_causes(vec![miss("a"), miss("b")]).unwrap();
        assert_eq!(agg.len(), 2);
        assert_eq!(agg.causes()[0].target.name, "a");
        assert_eq!(agg.causes()[1].target.name, "b");

        let msg = agg.to_string();
        assert!(msg.starts_with("2 errors occurred:"), "{msg}");
        assert!(msg.contains("ServiceEntry a.ns1"));
        assert!(msg.contains("ServiceEntry b.ns1"));
    }

    #[test]
    fn single_cause_displays_alone() {
        let agg = MissingRealizations::from_causes(vec![miss("a")]).unwrap();
        assert_eq!(
            agg.to_string(),
            "RemoteServiceBinding bind.ns1 should have been realized by ServiceEntry a.ns1; skipping"
        );
    }
}
