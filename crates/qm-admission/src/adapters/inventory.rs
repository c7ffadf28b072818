//! In-Memory Inventory Adapter
//!
//! Implements the `InventoryLedger` port over hash maps.
//!
//! In production, this would connect to the ownership ledger.

use crate::domain::value_objects::Issuance;
use crate::ports::outbound::{InventoryLedger, LedgerError};
use parking_lot::RwLock;
use qm_types::{Address, MetadataHash, UnitId};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Default)]
struct Tables {
    owners: HashMap<UnitId, Address>,
    holdings: HashMap<Address, BTreeSet<UnitId>>,
    metadata: HashMap<UnitId, MetadataHash>,
}

/// In-memory ownership ledger.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    tables: RwLock<Tables>,
}

impl InMemoryInventory {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total units issued.
    pub fn total_issued(&self) -> usize {
        self.tables.read().owners.len()
    }
}

impl InventoryLedger for InMemoryInventory {
    fn is_issued(&self, unit_id: UnitId) -> bool {
        self.tables.read().owners.contains_key(&unit_id)
    }

    fn owner_of(&self, unit_id: UnitId) -> Option<Address> {
        self.tables.read().owners.get(&unit_id).copied()
    }

    fn balance_of(&self, owner: &Address) -> u64 {
        self.tables
            .read()
            .holdings
            .get(owner)
            .map_or(0, |units| units.len() as u64)
    }

    fn units_of_owner(&self, owner: &Address) -> Vec<UnitId> {
        self.tables
            .read()
            .holdings
            .get(owner)
            .map(|units| units.iter().copied().collect())
            .unwrap_or_default()
    }

    fn metadata_of(&self, unit_id: UnitId) -> Option<MetadataHash> {
        self.tables.read().metadata.get(&unit_id).copied()
    }

    fn issue_batch(&self, issuances: &[Issuance]) -> Result<(), LedgerError> {
        let mut tables = self.tables.write();

        let mut seen = HashSet::with_capacity(issuances.len());
        for issuance in issuances {
            if tables.owners.contains_key(&issuance.unit_id) || !seen.insert(issuance.unit_id) {
                return Err(LedgerError::AlreadyExists(issuance.unit_id));
            }
        }

        for issuance in issuances {
            tables.owners.insert(issuance.unit_id, issuance.to);
            tables
                .holdings
                .entry(issuance.to)
                .or_default()
                .insert(issuance.unit_id);
            tables.metadata.insert(issuance.unit_id, issuance.metadata);
        }

        debug!(count = issuances.len(), "[qm-inventory] Issued units");
        Ok(())
    }

    fn transfer(&self, unit_id: UnitId, from: &Address, to: &Address) -> Result<(), LedgerError> {
        let mut tables = self.tables.write();

        match tables.owners.get(&unit_id) {
            None => return Err(LedgerError::NotFound(unit_id)),
            Some(owner) if owner != from => {
                return Err(LedgerError::WrongOwner {
                    unit_id,
                    claimed: *from,
                })
            }
            Some(_) => {}
        }

        tables.owners.insert(unit_id, *to);
        if let Some(units) = tables.holdings.get_mut(from) {
            units.remove(&unit_id);
            if units.is_empty() {
                tables.holdings.remove(from);
            }
        }
        tables.holdings.entry(*to).or_default().insert(unit_id);

        debug!(unit_id, "[qm-inventory] Transferred unit");
        Ok(())
    }

    fn set_metadata_batch(&self, updates: &[(UnitId, MetadataHash)]) -> Result<(), LedgerError> {
        let mut tables = self.tables.write();

        if let Some((unit_id, _)) = updates
            .iter()
            .find(|(unit_id, _)| !tables.owners.contains_key(unit_id))
        {
            return Err(LedgerError::NotFound(*unit_id));
        }

        for (unit_id, metadata) in updates {
            tables.metadata.insert(*unit_id, *metadata);
        }
        Ok(())
    }
}
