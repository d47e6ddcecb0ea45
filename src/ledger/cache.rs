use std::collections::HashMap;

use tracing::debug;

use crate::model::{GroupId, NetBalance};

/// Computed group balances, dropped whenever the group's history changes.
#[derive(Debug, Default)]
pub struct BalanceCache {
    entries: HashMap<GroupId, Vec<NetBalance>>,
}

impl BalanceCache {
    pub fn get(&self, group: GroupId) -> Option<&[NetBalance]> {
        self.entries.get(&group).map(Vec::as_slice)
    }

    pub fn insert(&mut self, group: GroupId, balances: Vec<NetBalance>) {
        self.entries.insert(group, balances);
    }

    pub fn invalidate(&mut self, group: GroupId) {
        if self.entries.remove(&group).is_some() {
            debug!(group = %group, "balance cache invalidated");
        }
    }

    pub fn contains(&self, group: GroupId) -> bool {
        self.entries.contains_key(&group)
    }
}
