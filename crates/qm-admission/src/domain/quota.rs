//! # Quota Engine
//!
//! Admission control for single, bulk and admin mints.
//!
//! Every request is first evaluated as a dry run that produces an
//! [`AdmissionPlan`] without touching any state. Only a plan that passed
//! every check, and whose units the ledger accepted, is committed. A batch
//! therefore either commits in full or leaves every counter unchanged.
//!
//! ## Check order (single mint)
//!
//! 1. Current phase is Active (`PhaseNotActive`)
//! 2. `unit_id < max_mint_limit` (`UnitIdOutOfRange`)
//! 3. `users_mint_limit > 0` (`GlobalCapacityExhausted`)
//! 4. Phase reserved limit `> 0` (`PhaseCapacityExhausted`)
//! 5. Role branch: verification, global limit, per-phase role limit
//! 6. Unit not yet issued (`UnitAlreadyIssued`)

use super::entities::{GlobalCounters, IdentityKind, Phase};
use super::errors::AdmissionError;
use super::phase::PhaseLifecycle;
use super::registry::AccountRegistry;
use super::value_objects::{BalanceKey, Issuance, MintItem, MintReceipt};
use crate::ports::outbound::InventoryLedger;
use qm_bus::{MintPath, MintedUnit};
use qm_types::{Address, MetadataHash, PhaseId, Role, UnitId};
use std::collections::{HashMap, HashSet};

// =============================================================================
// ADMISSION PLAN
// =============================================================================

/// Outcome of a successful dry run: everything needed to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionPlan {
    /// Admission path.
    pub path: MintPath,
    /// Identity that submitted the request.
    pub requester: Address,
    /// Phase charged (None for admin paths).
    pub phase_id: Option<PhaseId>,
    /// Units to hand to the ledger, in request order.
    pub issuances: Vec<Issuance>,
    charges: Vec<(BalanceKey, u64)>,
}

impl AdmissionPlan {
    /// Number of units in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issuances.len()
    }

    /// Whether the plan issues nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issuances.is_empty()
    }

    /// Per-phase balance increments the plan will apply.
    #[must_use]
    pub fn charges(&self) -> &[(BalanceKey, u64)] {
        &self.charges
    }

    /// Receipt returned to the caller once committed.
    #[must_use]
    pub fn receipt(&self) -> MintReceipt {
        MintReceipt {
            path: self.path,
            phase_id: self.phase_id,
            units: self
                .issuances
                .iter()
                .map(|i| MintedUnit {
                    unit_id: i.unit_id,
                    to: i.to,
                })
                .collect(),
        }
    }
}

/// Effects of earlier elements of the same batch, seen by later ones.
#[derive(Debug, Default)]
struct Staging {
    held: HashMap<Address, u64>,
    charges: HashMap<BalanceKey, u64>,
    units: HashSet<UnitId>,
}

impl Staging {
    fn held(&self, address: &Address) -> u64 {
        self.held.get(address).copied().unwrap_or(0)
    }

    fn charged(&self, key: &BalanceKey) -> u64 {
        self.charges.get(key).copied().unwrap_or(0)
    }

    fn record_user(&mut self, key: BalanceKey) {
        *self.held.entry(key.address).or_insert(0) += 1;
        *self.charges.entry(key).or_insert(0) += 1;
    }

    fn into_charges(self) -> Vec<(BalanceKey, u64)> {
        let mut charges: Vec<_> = self.charges.into_iter().collect();
        charges.sort();
        charges
    }
}

// =============================================================================
// QUOTA ENGINE
// =============================================================================

/// Owns the global counters and decides every mint request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaEngine {
    counters: GlobalCounters,
}

impl QuotaEngine {
    /// Create an engine over initial counters.
    #[must_use]
    pub fn new(counters: GlobalCounters) -> Self {
        Self { counters }
    }

    /// Current counters.
    #[must_use]
    pub fn counters(&self) -> &GlobalCounters {
        &self.counters
    }

    /// Dry run of `request_mint`: one unit for a Normal or Premium identity.
    pub fn plan_mint(
        &self,
        registry: &AccountRegistry,
        phases: &PhaseLifecycle,
        ledger: &dyn InventoryLedger,
        identity: Address,
        unit_id: UnitId,
        metadata: MetadataHash,
    ) -> Result<AdmissionPlan, AdmissionError> {
        let phase = phases.active()?;
        self.check_range(unit_id)?;
        if self.counters.users_mint_limit == 0 {
            return Err(AdmissionError::GlobalCapacityExhausted);
        }
        if phase.reserved_limit == 0 {
            return Err(AdmissionError::PhaseCapacityExhausted(phase.id));
        }

        let mut staging = Staging::default();
        let key = Self::admit_user(registry, phases, phase, ledger, &staging, identity)?;
        Self::check_fresh(ledger, &staging, unit_id)?;
        staging.record_user(key);

        Ok(AdmissionPlan {
            path: MintPath::Single,
            requester: identity,
            phase_id: Some(phase.id),
            issuances: vec![Issuance {
                unit_id,
                to: identity,
                metadata,
            }],
            charges: staging.into_charges(),
        })
    }

    /// Dry run of `request_bulk_mint`: each item is charged to its
    /// destination's quotas.
    ///
    /// Remaining users capacity and the phase reservation must each exceed
    /// the batch size before any item is looked at.
    pub fn plan_bulk_mint(
        &self,
        registry: &AccountRegistry,
        phases: &PhaseLifecycle,
        ledger: &dyn InventoryLedger,
        requester: Address,
        items: &[MintItem],
    ) -> Result<AdmissionPlan, AdmissionError> {
        if items.is_empty() {
            return Err(AdmissionError::EmptyBatch);
        }
        let phase = phases.active()?;

        let size = items.len() as u64;
        // Both must strictly exceed the batch size.
        if self.counters.users_mint_limit <= size {
            return Err(AdmissionError::GlobalCapacityExhausted);
        }
        if phase.reserved_limit <= size {
            return Err(AdmissionError::PhaseCapacityExhausted(phase.id));
        }

        let mut staging = Staging::default();
        for item in items {
            self.check_range(item.unit_id)?;
            let key = Self::admit_user(registry, phases, phase, ledger, &staging, item.to)?;
            Self::check_fresh(ledger, &staging, item.unit_id)?;
            staging.units.insert(item.unit_id);
            staging.record_user(key);
        }

        Ok(AdmissionPlan {
            path: MintPath::Bulk,
            requester,
            phase_id: Some(phase.id),
            issuances: items.iter().copied().map(Issuance::from).collect(),
            charges: staging.into_charges(),
        })
    }

    /// Dry run of `request_admin_mint`: one unit from platform capacity,
    /// issued to the admin itself.
    pub fn plan_admin_mint(
        &self,
        registry: &AccountRegistry,
        ledger: &dyn InventoryLedger,
        identity: Address,
        unit_id: UnitId,
        metadata: MetadataHash,
    ) -> Result<AdmissionPlan, AdmissionError> {
        Self::require_admin(registry, identity)?;
        self.check_range(unit_id)?;
        if self.counters.platform_mint_limit == 0 {
            return Err(AdmissionError::PlatformCapacityExhausted);
        }
        Self::check_fresh(ledger, &Staging::default(), unit_id)?;

        Ok(AdmissionPlan {
            path: MintPath::Admin,
            requester: identity,
            phase_id: None,
            issuances: vec![Issuance {
                unit_id,
                to: identity,
                metadata,
            }],
            charges: Vec::new(),
        })
    }

    /// Dry run of `request_admin_bulk_mint`.
    pub fn plan_admin_bulk_mint(
        &self,
        registry: &AccountRegistry,
        ledger: &dyn InventoryLedger,
        identity: Address,
        items: &[MintItem],
    ) -> Result<AdmissionPlan, AdmissionError> {
        Self::require_admin(registry, identity)?;
        if items.is_empty() {
            return Err(AdmissionError::EmptyBatch);
        }
        if self.counters.platform_mint_limit < items.len() as u64 {
            return Err(AdmissionError::PlatformCapacityExhausted);
        }

        let mut staging = Staging::default();
        for item in items {
            self.check_range(item.unit_id)?;
            Self::check_fresh(ledger, &staging, item.unit_id)?;
            staging.units.insert(item.unit_id);
        }

        Ok(AdmissionPlan {
            path: MintPath::AdminBulk,
            requester: identity,
            phase_id: None,
            issuances: items.iter().copied().map(Issuance::from).collect(),
            charges: Vec::new(),
        })
    }

    /// Apply a plan whose issuances the ledger has accepted.
    pub(crate) fn commit(&mut self, phases: &mut PhaseLifecycle, plan: &AdmissionPlan) {
        let count = plan.len() as u64;
        if plan.path.is_admin() {
            self.counters.platform_mint_limit =
                self.counters.platform_mint_limit.saturating_sub(count);
            return;
        }

        self.counters.users_mint_limit = self.counters.users_mint_limit.saturating_sub(count);
        self.counters.users_minted_balance =
            self.counters.users_minted_balance.saturating_add(count);
        for (key, n) in &plan.charges {
            phases.charge(*key, *n);
        }
    }

    // =========================================================================
    // CHECKS
    // =========================================================================

    fn check_range(&self, unit_id: UnitId) -> Result<(), AdmissionError> {
        if unit_id >= self.counters.max_mint_limit {
            return Err(AdmissionError::UnitIdOutOfRange {
                unit_id,
                max: self.counters.max_mint_limit,
            });
        }
        Ok(())
    }

    fn check_fresh(
        ledger: &dyn InventoryLedger,
        staging: &Staging,
        unit_id: UnitId,
    ) -> Result<(), AdmissionError> {
        if staging.units.contains(&unit_id) || ledger.is_issued(unit_id) {
            return Err(AdmissionError::UnitAlreadyIssued(unit_id));
        }
        Ok(())
    }

    fn require_admin(registry: &AccountRegistry, identity: Address) -> Result<(), AdmissionError> {
        match registry.get(&identity) {
            Some(i) if i.is_admin() => Ok(()),
            _ => Err(AdmissionError::NotAdmin(identity)),
        }
    }

    /// Role branch for one unit going to `address`, on top of `staging`.
    fn admit_user(
        registry: &AccountRegistry,
        phases: &PhaseLifecycle,
        phase: &Phase,
        ledger: &dyn InventoryLedger,
        staging: &Staging,
        address: Address,
    ) -> Result<BalanceKey, AdmissionError> {
        let identity = registry
            .get(&address)
            .ok_or(AdmissionError::NotRegistered(address))?;

        let (role, global_limit, phase_limit) = match identity.kind {
            IdentityKind::Premium {
                verified: false, ..
            } => return Err(AdmissionError::NotVerified(address)),
            IdentityKind::Premium { global_limit, .. } => {
                (Role::Premium, global_limit, phase.premium_user_limit)
            }
            IdentityKind::Normal { global_limit } => {
                (Role::Normal, global_limit, phase.normal_user_limit)
            }
            IdentityKind::Admin => return Err(AdmissionError::NotRegistered(address)),
        };

        let held = ledger
            .balance_of(&address)
            .saturating_add(staging.held(&address));
        if held >= global_limit {
            return Err(AdmissionError::GlobalLimitExceeded {
                address,
                limit: global_limit,
            });
        }

        let key = BalanceKey::new(phase.id, address, role);
        let phase_balance = phases
            .balance(phase.id, &address, role)
            .saturating_add(staging.charged(&key));
        if phase_balance >= phase_limit {
            return Err(AdmissionError::PhaseRoleLimitExceeded {
                phase_id: phase.id,
                address,
                limit: phase_limit,
            });
        }
        Ok(key)
    }
}
