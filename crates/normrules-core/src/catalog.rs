//! The validated pairing of tag store and rule store

use crate::rules::RuleStore;
use crate::tags::TagStore;
use crate::validate::{ValidationPolicy, ValidationReport};

/// Everything loaded for one standard.
///
/// Report builders only ever see a catalog whose [`ValidationReport`] passed.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub tags: TagStore,
    pub rules: RuleStore,
}

impl Catalog {
    pub fn new(tags: TagStore, rules: RuleStore) -> Self {
        Self { tags, rules }
    }

    /// Run the cross-reference validator over both stores.
    pub fn validate(&self, policy: ValidationPolicy) -> ValidationReport {
        ValidationReport::compute(&self.tags, self.rules.rules(), policy)
    }
}
