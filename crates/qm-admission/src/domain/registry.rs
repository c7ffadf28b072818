//! # Account Registry
//!
//! Classifies addresses into Normal, Premium and Admin identities and keeps
//! their limits and verification state.

use super::entities::{Identity, IdentityKind};
use super::errors::AdmissionError;
use super::value_objects::AccountRegistration;
use crate::ports::outbound::InventoryLedger;
use qm_types::{Address, Timestamp};
use std::collections::HashMap;

/// Identity table keyed by address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountRegistry {
    identities: HashMap<Address, Identity>,
}

impl AccountRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an identity.
    #[must_use]
    pub fn get(&self, address: &Address) -> Option<&Identity> {
        self.identities.get(address)
    }

    /// Number of registered identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Whether no identity is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    /// Register a new identity.
    ///
    /// Fails with `AlreadyRegistered` if the address holds any identity.
    pub fn register(
        &mut self,
        registration: &AccountRegistration,
        now: Timestamp,
    ) -> Result<&Identity, AdmissionError> {
        if self.identities.contains_key(&registration.address) {
            return Err(AdmissionError::AlreadyRegistered(registration.address));
        }

        let identity = Identity::new(
            registration.name.clone(),
            registration.address,
            registration.role,
            registration.global_limit,
            now,
        );
        Ok(self
            .identities
            .entry(registration.address)
            .or_insert(identity))
    }

    /// Mark a Premium identity as verified.
    pub fn verify_premium(&mut self, address: &Address) -> Result<(), AdmissionError> {
        match self.identities.get_mut(address).map(|i| &mut i.kind) {
            Some(IdentityKind::Premium { verified: true, .. }) => {
                Err(AdmissionError::AlreadyVerified(*address))
            }
            Some(IdentityKind::Premium { verified, .. }) => {
                *verified = true;
                Ok(())
            }
            _ => Err(AdmissionError::NotRegistered(*address)),
        }
    }

    /// Validate a batch of global-limit updates without applying it.
    ///
    /// Every entry must name a Normal or Premium identity whose held count is
    /// strictly below the new limit.
    pub fn plan_global_limits(
        &self,
        addresses: &[Address],
        limits: &[u64],
        ledger: &dyn InventoryLedger,
    ) -> Result<Vec<(Address, u64)>, AdmissionError> {
        if addresses.len() != limits.len() {
            return Err(AdmissionError::LengthMismatch {
                left: addresses.len(),
                right: limits.len(),
            });
        }
        if addresses.is_empty() {
            return Err(AdmissionError::EmptyBatch);
        }

        addresses
            .iter()
            .zip(limits)
            .map(|(address, &limit)| {
                let identity = self
                    .identities
                    .get(address)
                    .filter(|i| !i.is_admin())
                    .ok_or(AdmissionError::NeitherRole(*address))?;

                let balance = ledger.balance_of(&identity.address);
                if limit <= balance {
                    return Err(AdmissionError::LimitBelowBalance { limit, balance });
                }
                Ok((*address, limit))
            })
            .collect()
    }

    /// Apply updates produced by [`Self::plan_global_limits`].
    pub fn apply_global_limits(&mut self, updates: &[(Address, u64)]) {
        for (address, limit) in updates {
            if let Some(identity) = self.identities.get_mut(address) {
                match &mut identity.kind {
                    IdentityKind::Normal { global_limit }
                    | IdentityKind::Premium { global_limit, .. } => *global_limit = *limit,
                    IdentityKind::Admin => {}
                }
            }
        }
    }
}
