//! # Phase Lifecycle
//!
//! Strictly sequential release windows. Only the current slot can move, and
//! deactivation advances the slot to a fresh Uncreated id.

use super::entities::{Phase, PhaseStatus};
use super::errors::AdmissionError;
use super::value_objects::{BalanceKey, PhaseView};
use qm_types::{Address, PhaseId, Role, Timestamp};
use std::collections::{BTreeMap, HashMap};

/// Phase table, current-phase pointer and the per-phase balance table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseLifecycle {
    current_phase_id: PhaseId,
    phases: BTreeMap<PhaseId, Phase>,
    balances: HashMap<BalanceKey, u64>,
}

impl PhaseLifecycle {
    /// Start at phase 0, Uncreated.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the current slot.
    #[must_use]
    pub fn current_phase_id(&self) -> PhaseId {
        self.current_phase_id
    }

    /// Status of the current slot.
    #[must_use]
    pub fn current_status(&self) -> PhaseStatus {
        self.status_of(self.current_phase_id)
    }

    /// Status of any slot. Slots never created report Uncreated.
    #[must_use]
    pub fn status_of(&self, phase_id: PhaseId) -> PhaseStatus {
        self.phases
            .get(&phase_id)
            .map_or(PhaseStatus::Uncreated, |p| p.status)
    }

    /// A phase record by id, if created.
    #[must_use]
    pub fn get(&self, phase_id: PhaseId) -> Option<&Phase> {
        self.phases.get(&phase_id)
    }

    /// The current phase record, if created.
    #[must_use]
    pub fn current(&self) -> Option<&Phase> {
        self.get(self.current_phase_id)
    }

    /// The current phase if it is Active.
    pub fn active(&self) -> Result<&Phase, AdmissionError> {
        self.current()
            .filter(|p| p.status == PhaseStatus::Active)
            .ok_or(AdmissionError::PhaseNotActive(self.current_phase_id))
    }

    /// View of a slot.
    #[must_use]
    pub fn view(&self, phase_id: PhaseId) -> PhaseView {
        self.phases
            .get(&phase_id)
            .map_or_else(|| PhaseView::uncreated(phase_id), PhaseView::from)
    }

    /// Iterate over every created phase in id order.
    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.values()
    }

    /// Units an address minted in a phase under a role.
    #[must_use]
    pub fn balance(&self, phase_id: PhaseId, address: &Address, role: Role) -> u64 {
        self.balances
            .get(&BalanceKey::new(phase_id, *address, role))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate over the balance table.
    pub fn balances(&self) -> impl Iterator<Item = (&BalanceKey, &u64)> {
        self.balances.iter()
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Create the current slot.
    ///
    /// `users_available` is the remaining users capacity the reservation must
    /// fit in.
    pub fn create(
        &mut self,
        reserved_limit: u64,
        premium_user_limit: u64,
        normal_user_limit: u64,
        users_available: u64,
        now: Timestamp,
    ) -> Result<&Phase, AdmissionError> {
        if reserved_limit > users_available {
            return Err(AdmissionError::CapacityExceeded {
                requested: reserved_limit,
                available: users_available,
            });
        }

        let id = self.current_phase_id;
        let status = self.current_status();
        if !status.can_transition_to(PhaseStatus::Created) {
            return Err(match status {
                PhaseStatus::Active => AdmissionError::PhaseAlreadyActive(id),
                _ => AdmissionError::PhaseAlreadyCreated(id),
            });
        }

        let phase = Phase {
            id,
            status: PhaseStatus::Created,
            reserved_limit,
            minted: 0,
            premium_user_limit,
            normal_user_limit,
            created_at: now,
        };
        Ok(self.phases.entry(id).or_insert(phase))
    }

    /// Move the current slot from Created to Active.
    pub fn activate(&mut self) -> Result<PhaseId, AdmissionError> {
        let id = self.current_phase_id;
        let status = self.current_status();
        if !status.can_transition_to(PhaseStatus::Active) {
            return Err(match status {
                PhaseStatus::Active => AdmissionError::PhaseAlreadyActive(id),
                _ => AdmissionError::PhaseNotCreated(id),
            });
        }

        let phase = self
            .phases
            .get_mut(&id)
            .ok_or(AdmissionError::PhaseNotCreated(id))?;
        phase.status = PhaseStatus::Active;
        Ok(id)
    }

    /// Close the current phase and open the next slot.
    ///
    /// Returns `(deactivated, next)`.
    pub fn deactivate(&mut self) -> Result<(PhaseId, PhaseId), AdmissionError> {
        let id = self.current_phase_id;
        let phase = self
            .phases
            .get_mut(&id)
            .ok_or(AdmissionError::PhaseNotCreated(id))?;

        if !phase.status.can_transition_to(PhaseStatus::Deactivated) {
            return Err(AdmissionError::PhaseNotActive(id));
        }
        phase.status = PhaseStatus::Deactivated;
        self.current_phase_id = id.saturating_add(1);
        Ok((id, self.current_phase_id))
    }

    /// Set the active phase's total cap to `new_limit`.
    ///
    /// Returns the remaining reserved capacity after the update.
    pub fn update_reserved_limit(
        &mut self,
        new_limit: u64,
        users_available: u64,
    ) -> Result<u64, AdmissionError> {
        let id = self.current_phase_id;
        let phase = self
            .phases
            .get_mut(&id)
            .ok_or(AdmissionError::PhaseNotCreated(id))?;
        if phase.status != PhaseStatus::Active {
            return Err(AdmissionError::PhaseNotActive(id));
        }

        if new_limit <= phase.minted {
            return Err(AdmissionError::LimitTooLow {
                requested: new_limit,
                consumed: phase.minted,
            });
        }
        let remaining = new_limit - phase.minted;
        if remaining > users_available {
            return Err(AdmissionError::CapacityExceeded {
                requested: remaining,
                available: users_available,
            });
        }

        phase.reserved_limit = remaining;
        Ok(remaining)
    }

    // =========================================================================
    // COMMIT
    // =========================================================================

    /// Charge admitted units to the active phase. Callers validate first.
    pub(crate) fn charge(&mut self, key: BalanceKey, count: u64) {
        if let Some(phase) = self.phases.get_mut(&key.phase_id) {
            phase.reserved_limit = phase.reserved_limit.saturating_sub(count);
            phase.minted = phase.minted.saturating_add(count);
        }
        *self.balances.entry(key).or_insert(0) += count;
    }
}
