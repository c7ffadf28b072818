//! # Domain Invariants
//!
//! Rules that must hold after every committed operation.

use super::entities::GlobalCounters;
use super::errors::AdmissionError;
use super::phase::PhaseLifecycle;
use std::collections::HashMap;

/// Invariant: users capacity is conserved.
///
/// `users_mint_limit + users_minted_balance` always equals the capacity left
/// for users at initialization. Admin mints never move either side.
pub fn invariant_users_capacity_conserved(counters: &GlobalCounters) -> Result<(), AdmissionError> {
    let total = counters
        .users_mint_limit
        .saturating_add(counters.users_minted_balance);
    if total != counters.users_capacity() {
        return Err(AdmissionError::InvariantViolated(format!(
            "users capacity {} + {} != {}",
            counters.users_mint_limit,
            counters.users_minted_balance,
            counters.users_capacity()
        )));
    }
    Ok(())
}

/// Invariant: platform capacity only shrinks.
pub fn invariant_platform_bounded(counters: &GlobalCounters) -> Result<(), AdmissionError> {
    if counters.platform_mint_limit > counters.platform_mint_initial {
        return Err(AdmissionError::InvariantViolated(
            "platform capacity grew".to_string(),
        ));
    }
    Ok(())
}

/// Invariant: at most one phase is Active, and only the current slot can be.
///
/// Every phase before the current slot is Deactivated.
pub fn invariant_single_active_phase(phases: &PhaseLifecycle) -> Result<(), AdmissionError> {
    let current = phases.current_phase_id();
    for phase in phases.phases() {
        if phase.id < current && !phase.status.is_terminal() {
            return Err(AdmissionError::InvariantViolated(format!(
                "phase {} behind current slot {} is {:?}",
                phase.id, current, phase.status
            )));
        }
        if phase.id > current {
            return Err(AdmissionError::InvariantViolated(format!(
                "phase {} created ahead of current slot {}",
                phase.id, current
            )));
        }
    }
    Ok(())
}

/// Invariant: per-address phase balances respect the phase role limits, and
/// each phase's minted count equals the sum of its balances.
pub fn invariant_phase_balances(phases: &PhaseLifecycle) -> Result<(), AdmissionError> {
    let mut sums: HashMap<u64, u64> = HashMap::new();

    for (key, &count) in phases.balances() {
        let limit = phases
            .get(key.phase_id)
            .and_then(|phase| phase.role_limit(key.role))
            .unwrap_or(0);
        if count > limit {
            return Err(AdmissionError::InvariantViolated(format!(
                "phase {} {} balance {} exceeds limit {}",
                key.phase_id, key.role, count, limit
            )));
        }
        *sums.entry(key.phase_id).or_insert(0) += count;
    }

    for phase in phases.phases() {
        let sum = sums.get(&phase.id).copied().unwrap_or(0);
        if sum != phase.minted {
            return Err(AdmissionError::InvariantViolated(format!(
                "phase {} minted {} but balances sum to {}",
                phase.id, phase.minted, sum
            )));
        }
    }
    Ok(())
}
