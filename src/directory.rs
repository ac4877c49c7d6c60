//! Freelancer service directory
//!
//! Maps (category, area) to the freelancers who serve it. This is the
//! dispatcher's eligible-set lookup, nothing more - geographic matching
//! beyond exact scope membership is out of scope.

use dashmap::DashMap;
use std::collections::BTreeSet;

use crate::core_types::{Area, CategoryId, FreelancerId, normalize_area};

pub struct FreelancerDirectory {
    scopes: DashMap<(CategoryId, Area), BTreeSet<FreelancerId>>,
}

impl FreelancerDirectory {
    pub fn new() -> Self {
        Self {
            scopes: DashMap::new(),
        }
    }

    /// Register a freelancer for a (category, area). Idempotent.
    pub fn register(&self, freelancer: FreelancerId, category: CategoryId, area: &str) {
        self.scopes
            .entry((category, normalize_area(area)))
            .or_default()
            .insert(freelancer);
    }

    /// Remove a freelancer from a scope.
    pub fn unregister(&self, freelancer: FreelancerId, category: CategoryId, area: &str) {
        if let Some(mut set) = self.scopes.get_mut(&(category, normalize_area(area))) {
            set.remove(&freelancer);
        }
    }

    /// Freelancers eligible for a lead in this scope, in stable order.
    pub fn eligible_for(&self, category: CategoryId, area: &str) -> Vec<FreelancerId> {
        self.scopes
            .get(&(category, normalize_area(area)))
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }
}

impl Default for FreelancerDirectory {
    fn default() -> Self {
        Self::new()
    }
}
