//! # Mint State
//!
//! The single owned aggregate behind the admission lock.

use super::entities::{GlobalCounters, MintConfig};
use super::errors::AdmissionError;
use super::gates::{PausableControl, TransferGate};
use super::invariants::{
    invariant_phase_balances, invariant_platform_bounded, invariant_single_active_phase,
    invariant_users_capacity_conserved,
};
use super::phase::PhaseLifecycle;
use super::quota::{AdmissionPlan, QuotaEngine};
use super::registry::AccountRegistry;
use super::value_objects::CounterSnapshot;

/// All mutable admission state.
///
/// Constructed once per mint and only ever mutated under one writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintState {
    /// Identity table.
    pub registry: AccountRegistry,
    /// Phase table and balances.
    pub phases: PhaseLifecycle,
    /// Global counters and admission decisions.
    pub quota: QuotaEngine,
    /// One-way transfer gate.
    pub transfer_gate: TransferGate,
    /// Pause switch.
    pub pause: PausableControl,
}

impl MintState {
    /// Fresh state for a validated configuration.
    #[must_use]
    pub fn new(config: &MintConfig) -> Self {
        Self {
            registry: AccountRegistry::new(),
            phases: PhaseLifecycle::new(),
            quota: QuotaEngine::new(GlobalCounters::from_config(config)),
            transfer_gate: TransferGate::default(),
            pause: PausableControl::default(),
        }
    }

    /// Counters and gates.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot::new(
            self.quota.counters(),
            self.transfer_gate.is_enabled(),
            self.pause.is_paused(),
            self.phases.current_phase_id(),
        )
    }

    /// Apply an admission plan the ledger accepted.
    pub fn commit(&mut self, plan: &AdmissionPlan) {
        self.quota.commit(&mut self.phases, plan);
    }

    /// Remaining reservation of the current phase, 0 unless Active.
    #[must_use]
    pub fn active_reserved(&self) -> u64 {
        self.phases.active().map_or(0, |p| p.reserved_limit)
    }

    /// Verify every state invariant.
    pub fn check_invariants(&self) -> Result<(), AdmissionError> {
        invariant_users_capacity_conserved(self.quota.counters())?;
        invariant_platform_bounded(self.quota.counters())?;
        invariant_single_active_phase(&self.phases)?;
        invariant_phase_balances(&self.phases)
    }
}
