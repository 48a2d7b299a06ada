//! In-memory check store

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

use crate::checks::{AlertType, Check};

/// Thread-safe in-memory store of check definitions.
///
/// Shared between the API handlers and the scheduler; all methods take
/// `&self` and return owned snapshots so no lock is held across await
/// points.
#[derive(Default)]
pub struct CheckStore {
    checks: RwLock<HashMap<String, Check>>,
}

impl CheckStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All checks
    pub fn get_checks(&self) -> Vec<Check> {
        let checks = self.checks.read();
        checks.values().cloned().collect()
    }

    /// Checks whose current state is in `states` (uppercase names)
    pub fn get_checks_by_state(&self, states: &HashSet<String>) -> Vec<Check> {
        let checks = self.checks.read();
        checks
            .values()
            .filter(|c| states.contains(c.state.as_str()))
            .cloned()
            .collect()
    }

    /// Enabled checks, as evaluated by the scheduler
    pub fn get_enabled_checks(&self) -> Vec<Check> {
        let checks = self.checks.read();
        checks.values().filter(|c| c.enabled).cloned().collect()
    }

    /// Look up one check by ID
    pub fn get_check(&self, id: &str) -> Option<Check> {
        let checks = self.checks.read();
        checks.get(id).cloned()
    }

    /// Store a new check, assigning an ID when the caller left it empty
    pub fn create_check(&self, mut check: Check) -> Check {
        if check.id.is_empty() {
            check.id = generate_id();
        }
        let mut checks = self.checks.write();
        checks.insert(check.id.clone(), check.clone());
        check
    }

    /// Replace an existing check. Returns `None` when the ID is unknown.
    pub fn save_check(&self, check: Check) -> Option<Check> {
        let mut checks = self.checks.write();
        if !checks.contains_key(&check.id) {
            return None;
        }
        checks.insert(check.id.clone(), check.clone());
        Some(check)
    }

    /// Remove a check. Returns whether it existed.
    pub fn delete_check(&self, id: &str) -> bool {
        let mut checks = self.checks.write();
        checks.remove(id).is_some()
    }

    /// Commit a post-evaluation state. Returns false when the check has
    /// been deleted in the meantime.
    pub fn set_state(&self, id: &str, state: AlertType) -> bool {
        let mut checks = self.checks.write();
        if let Some(check) = checks.get_mut(id) {
            check.state = state;
            true
        } else {
            false
        }
    }
}

/// Filter checks by enabled flag, returning a new list
pub fn filter_enabled(checks: Vec<Check>, enabled: bool) -> Vec<Check> {
    checks.into_iter().filter(|c| c.enabled == enabled).collect()
}

fn generate_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}
