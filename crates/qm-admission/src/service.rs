//! # Mint Admission Service
//!
//! Serializes every operation through one critical section and publishes
//! notifications once the lock is released.
//!
//! ## Flow of a mutating operation
//!
//! 1. Lock `MintState`
//! 2. Pause gate, then owner gate (where required)
//! 3. Dry run of every check
//! 4. Hand the accepted units to the `InventoryLedger`
//! 5. Commit counters and balances
//! 6. Unlock, then publish notifications
//!
//! A failure at any of steps 2-4 returns before anything is committed.

use crate::adapters::{BusNotificationSink, InMemoryInventory, SingleOwner};
use crate::config::{ConfigError, ConfigProvider};
use crate::domain::entities::{Identity, MintConfig};
use crate::domain::errors::AdmissionError;
use crate::domain::quota::AdmissionPlan;
use crate::domain::state::MintState;
use crate::domain::value_objects::{
    AccountRegistration, CounterSnapshot, MintItem, MintReceipt, PhaseView,
};
use crate::metrics;
use crate::ports::inbound::MintAdmissionApi;
use crate::ports::outbound::{
    AccessControl, InventoryLedger, NotificationSink, SystemTimeSource, TimeSource,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use qm_bus::{InMemoryEventBus, MintEvent, MintNotification};
use qm_types::{short_address, Address, MetadataHash, PhaseId, Role, Timestamp, UnitId};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Mint parameters.
    pub mint: MintConfig,
    /// Re-check state invariants after every commit.
    pub check_invariants: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mint: MintConfig::default(),
            check_invariants: true,
        }
    }
}

/// Statistics for the admission service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Operations that committed.
    pub operations_committed: u64,
    /// Operations rejected with no side effects.
    pub operations_rejected: u64,
    /// Units issued across all mint paths.
    pub units_admitted: u64,
    /// Notifications handed to the sink.
    pub notifications_sent: u64,
}

/// Which gates run before an operation's own checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gate {
    /// Pause gate only.
    Pause,
    /// Pause gate, then the owner capability.
    PauseThenOwner,
    /// Owner capability only (`unpause`).
    Owner,
}

type Outcome<T> = Result<(T, Vec<MintEvent>), AdmissionError>;

/// The mint admission service.
///
/// Owns the whole [`MintState`] behind a single `parking_lot::Mutex`, so
/// concurrent callers are serialized into one total order.
pub struct MintAdmissionService<L: InventoryLedger, N: NotificationSink> {
    config: ServiceConfig,
    state: Mutex<MintState>,
    ledger: Arc<L>,
    notifier: Arc<N>,
    access: Arc<dyn AccessControl>,
    clock: Arc<dyn TimeSource>,
    stats: Mutex<ServiceStats>,
}

impl<L: InventoryLedger, N: NotificationSink> MintAdmissionService<L, N> {
    /// Create a service with the default owner check and system clock.
    pub fn new(config: ServiceConfig, ledger: Arc<L>, notifier: Arc<N>) -> Result<Self, ConfigError> {
        config.mint.validate().map_err(ConfigError::Invalid)?;
        Ok(Self::assemble(config, ledger, notifier))
    }

    fn assemble(config: ServiceConfig, ledger: Arc<L>, notifier: Arc<N>) -> Self {
        info!(
            owner = %short_address(&config.mint.owner),
            max_mint_limit = config.mint.max_mint_limit,
            platform_mint_limit = config.mint.platform_mint_limit,
            "[qm-admission] Mint initialized"
        );

        Self {
            state: Mutex::new(MintState::new(&config.mint)),
            access: Arc::new(SingleOwner::new(config.mint.owner)),
            clock: Arc::new(SystemTimeSource),
            stats: Mutex::new(ServiceStats::default()),
            config,
            ledger,
            notifier,
        }
    }

    /// Create a service from a configuration provider.
    pub fn from_provider(
        provider: &dyn ConfigProvider,
        ledger: Arc<L>,
        notifier: Arc<N>,
    ) -> Result<Self, ConfigError> {
        let config = ServiceConfig {
            mint: provider.mint_config(),
            ..ServiceConfig::default()
        };
        Self::new(config, ledger, notifier)
    }

    /// Replace the owner capability check.
    #[must_use]
    pub fn with_access_control(mut self, access: Arc<dyn AccessControl>) -> Self {
        self.access = access;
        self
    }

    /// Replace the clock used to timestamp notifications.
    #[must_use]
    pub fn with_time_source(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The inventory ledger.
    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    /// Current service statistics.
    pub fn stats(&self) -> ServiceStats {
        self.stats.lock().clone()
    }

    /// Copy of the full admission state.
    pub fn state(&self) -> MintState {
        self.state.lock().clone()
    }

    // =========================================================================
    // CRITICAL SECTION
    // =========================================================================

    /// Run `op` under the state lock after the requested gates.
    ///
    /// Returns the operation's value and the timestamped notifications to
    /// publish. Nothing here awaits.
    fn execute<T>(
        &self,
        operation: &'static str,
        gate: Gate,
        caller: Address,
        op: impl FnOnce(&mut MintState, &dyn InventoryLedger, Timestamp) -> Outcome<T>,
    ) -> Result<(T, Vec<MintNotification>), AdmissionError> {
        let correlation_id = Uuid::new_v4();
        let now = self.clock.now();
        let started = Instant::now();

        let result = {
            let mut state = self.state.lock();
            let outcome = self
                .check_gate(&state, gate, caller)
                .and_then(|()| op(&mut *state, self.ledger.as_ref(), now));

            if outcome.is_ok() {
                if self.config.check_invariants {
                    if let Err(e) = state.check_invariants() {
                        error!(operation, error = %e, "[qm-admission] Invariant check failed");
                    }
                }
                metrics::record_capacity(&state.snapshot(), state.active_reserved());
            }
            outcome
        };
        metrics::observe_critical_section(started.elapsed());

        match result {
            Ok((value, events)) => {
                self.stats.lock().operations_committed += 1;
                debug!(
                    operation,
                    %correlation_id,
                    events = events.len(),
                    "[qm-admission] Operation committed"
                );
                let notifications = events
                    .into_iter()
                    .map(|event| MintNotification::new(event, now))
                    .collect();
                Ok((value, notifications))
            }
            Err(e) => {
                self.stats.lock().operations_rejected += 1;
                metrics::record_rejected(operation, e.kind());
                warn!(
                    operation,
                    %correlation_id,
                    caller = %short_address(&caller),
                    kind = e.kind().as_str(),
                    error = %e,
                    "[qm-admission] Operation rejected"
                );
                Err(e)
            }
        }
    }

    fn check_gate(&self, state: &MintState, gate: Gate, caller: Address) -> Result<(), AdmissionError> {
        if gate != Gate::Owner {
            state.pause.ensure_not_paused()?;
        }
        if gate != Gate::Pause && !self.access.is_owner(&caller) {
            return Err(AdmissionError::NotOwner(caller));
        }
        Ok(())
    }

    async fn publish(&self, notifications: Vec<MintNotification>) {
        let count = notifications.len() as u64;
        for notification in notifications {
            self.notifier.notify(notification).await;
        }
        self.stats.lock().notifications_sent += count;
    }

    /// Issue and commit a plan that passed its dry run.
    fn issue(
        state: &mut MintState,
        ledger: &dyn InventoryLedger,
        plan: AdmissionPlan,
    ) -> Outcome<MintReceipt> {
        ledger.issue_batch(&plan.issuances)?;
        state.commit(&plan);

        let receipt = plan.receipt();
        info!(
            path = plan.path.as_str(),
            requester = %short_address(&plan.requester),
            phase_id = ?plan.phase_id,
            units = plan.len(),
            "[qm-admission] Units admitted"
        );
        let event = MintEvent::UnitsMinted {
            path: plan.path,
            requester: plan.requester,
            phase_id: plan.phase_id,
            units: receipt.units.clone(),
        };
        Ok((receipt, vec![event]))
    }

    async fn admit(
        &self,
        operation: &'static str,
        caller: Address,
        gate: Gate,
        dry_run: impl FnOnce(&MintState, &dyn InventoryLedger) -> Result<AdmissionPlan, AdmissionError>,
    ) -> Result<MintReceipt, AdmissionError> {
        let (receipt, notifications) = self.execute(operation, gate, caller, |state, ledger, _| {
            let plan = dry_run(state, ledger)?;
            Self::issue(state, ledger, plan)
        })?;

        metrics::record_admitted(receipt.path, receipt.units.len());
        self.stats.lock().units_admitted += receipt.units.len() as u64;
        self.publish(notifications).await;
        Ok(receipt)
    }
}

#[async_trait]
impl<L, N> MintAdmissionApi for MintAdmissionService<L, N>
where
    L: InventoryLedger + 'static,
    N: NotificationSink + 'static,
{
    // =========================================================================
    // ACCOUNT REGISTRY
    // =========================================================================

    #[instrument(skip(self, caller, registration), fields(role = %registration.role))]
    async fn register_account(
        &self,
        caller: Address,
        registration: AccountRegistration,
    ) -> Result<(), AdmissionError> {
        let ((), notifications) =
            self.execute("register_account", Gate::PauseThenOwner, caller, |state, _, now| {
                let identity = state.registry.register(&registration, now)?;
                info!(
                    address = %short_address(&identity.address),
                    role = %identity.role(),
                    "[qm-admission] Account registered"
                );
                let event = MintEvent::AccountRegistered {
                    address: identity.address,
                    name: identity.name.clone(),
                    role: identity.role(),
                    global_limit: identity.global_limit(),
                };
                Ok(((), vec![event]))
            })?;
        self.publish(notifications).await;
        Ok(())
    }

    async fn verify_premium(&self, caller: Address, address: Address) -> Result<(), AdmissionError> {
        let ((), notifications) =
            self.execute("verify_premium", Gate::PauseThenOwner, caller, |state, _, _| {
                state.registry.verify_premium(&address)?;
                info!(address = %short_address(&address), "[qm-admission] Premium verified");
                Ok(((), vec![MintEvent::PremiumVerified { address }]))
            })?;
        self.publish(notifications).await;
        Ok(())
    }

    #[instrument(skip(self, caller, addresses, limits), fields(batch = addresses.len()))]
    async fn update_global_limits(
        &self,
        caller: Address,
        addresses: &[Address],
        limits: &[u64],
    ) -> Result<(), AdmissionError> {
        let ((), notifications) =
            self.execute("update_global_limits", Gate::PauseThenOwner, caller, |state, ledger, _| {
                let updates = state.registry.plan_global_limits(addresses, limits, ledger)?;
                state.registry.apply_global_limits(&updates);
                info!(count = updates.len(), "[qm-admission] Global limits updated");
                let events = updates
                    .into_iter()
                    .map(|(address, new_limit)| MintEvent::GlobalLimitUpdated { address, new_limit })
                    .collect();
                Ok(((), events))
            })?;
        self.publish(notifications).await;
        Ok(())
    }

    // =========================================================================
    // PHASE LIFECYCLE
    // =========================================================================

    async fn create_phase(
        &self,
        caller: Address,
        reserved_limit: u64,
        premium_user_limit: u64,
        normal_user_limit: u64,
    ) -> Result<PhaseId, AdmissionError> {
        let (phase_id, notifications) =
            self.execute("create_phase", Gate::PauseThenOwner, caller, |state, _, now| {
                let available = state.quota.counters().users_mint_limit;
                let phase = state.phases.create(
                    reserved_limit,
                    premium_user_limit,
                    normal_user_limit,
                    available,
                    now,
                )?;
                info!(
                    phase_id = phase.id,
                    reserved_limit,
                    premium_user_limit,
                    normal_user_limit,
                    "[qm-admission] Phase created"
                );
                let event = MintEvent::PhaseCreated {
                    phase_id: phase.id,
                    reserved_limit,
                    premium_user_limit,
                    normal_user_limit,
                };
                Ok((phase.id, vec![event]))
            })?;
        self.publish(notifications).await;
        Ok(phase_id)
    }

    async fn activate_phase(&self, caller: Address) -> Result<PhaseId, AdmissionError> {
        let (phase_id, notifications) =
            self.execute("activate_phase", Gate::PauseThenOwner, caller, |state, _, _| {
                let phase_id = state.phases.activate()?;
                info!(phase_id, "[qm-admission] Phase activated");
                Ok((phase_id, vec![MintEvent::PhaseActivated { phase_id }]))
            })?;
        self.publish(notifications).await;
        Ok(phase_id)
    }

    async fn deactivate_phase(&self, caller: Address) -> Result<PhaseId, AdmissionError> {
        let (next_phase_id, notifications) =
            self.execute("deactivate_phase", Gate::PauseThenOwner, caller, |state, _, _| {
                let (phase_id, next_phase_id) = state.phases.deactivate()?;
                info!(phase_id, next_phase_id, "[qm-admission] Phase deactivated");
                let event = MintEvent::PhaseDeactivated {
                    phase_id,
                    next_phase_id,
                };
                Ok((next_phase_id, vec![event]))
            })?;
        self.publish(notifications).await;
        Ok(next_phase_id)
    }

    async fn update_reserved_limit(
        &self,
        caller: Address,
        new_limit: u64,
    ) -> Result<u64, AdmissionError> {
        let (remaining, notifications) =
            self.execute("update_reserved_limit", Gate::PauseThenOwner, caller, |state, _, _| {
                let available = state.quota.counters().users_mint_limit;
                let remaining = state.phases.update_reserved_limit(new_limit, available)?;
                let phase_id = state.phases.current_phase_id();
                info!(phase_id, new_limit, remaining, "[qm-admission] Reserved limit updated");
                let event = MintEvent::ReservedLimitUpdated {
                    phase_id,
                    new_limit,
                    remaining,
                };
                Ok((remaining, vec![event]))
            })?;
        self.publish(notifications).await;
        Ok(remaining)
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    async fn request_mint(
        &self,
        identity: Address,
        unit_id: UnitId,
        metadata: MetadataHash,
    ) -> Result<MintReceipt, AdmissionError> {
        self.admit("request_mint", identity, Gate::Pause, |state, ledger| {
            state.quota.plan_mint(
                &state.registry,
                &state.phases,
                ledger,
                identity,
                unit_id,
                metadata,
            )
        })
        .await
    }

    async fn request_admin_mint(
        &self,
        identity: Address,
        unit_id: UnitId,
        metadata: MetadataHash,
    ) -> Result<MintReceipt, AdmissionError> {
        self.admit("request_admin_mint", identity, Gate::Pause, |state, ledger| {
            state
                .quota
                .plan_admin_mint(&state.registry, ledger, identity, unit_id, metadata)
        })
        .await
    }

    #[instrument(skip(self, caller, items), fields(batch = items.len()))]
    async fn request_bulk_mint(
        &self,
        caller: Address,
        items: Vec<MintItem>,
    ) -> Result<MintReceipt, AdmissionError> {
        self.admit("request_bulk_mint", caller, Gate::PauseThenOwner, |state, ledger| {
            state
                .quota
                .plan_bulk_mint(&state.registry, &state.phases, ledger, caller, &items)
        })
        .await
    }

    #[instrument(skip(self, caller, items), fields(batch = items.len()))]
    async fn request_admin_bulk_mint(
        &self,
        caller: Address,
        items: Vec<MintItem>,
    ) -> Result<MintReceipt, AdmissionError> {
        self.admit("request_admin_bulk_mint", caller, Gate::Pause, |state, ledger| {
            state
                .quota
                .plan_admin_bulk_mint(&state.registry, ledger, caller, &items)
        })
        .await
    }

    // =========================================================================
    // GATES
    // =========================================================================

    async fn enable_transfer(&self, caller: Address) -> Result<(), AdmissionError> {
        let ((), notifications) =
            self.execute("enable_transfer", Gate::PauseThenOwner, caller, |state, _, _| {
                state.transfer_gate.enable()?;
                info!("[qm-admission] Transfers enabled");
                Ok(((), vec![MintEvent::TransferEnabled]))
            })?;
        self.publish(notifications).await;
        Ok(())
    }

    async fn pause(&self, caller: Address) -> Result<(), AdmissionError> {
        let ((), notifications) =
            self.execute("pause", Gate::PauseThenOwner, caller, |state, _, _| {
                state.pause.pause()?;
                info!(by = %short_address(&caller), "[qm-admission] Paused");
                Ok(((), vec![MintEvent::Paused { by: caller }]))
            })?;
        self.publish(notifications).await;
        Ok(())
    }

    async fn unpause(&self, caller: Address) -> Result<(), AdmissionError> {
        let ((), notifications) = self.execute("unpause", Gate::Owner, caller, |state, _, _| {
            state.pause.unpause()?;
            info!(by = %short_address(&caller), "[qm-admission] Unpaused");
            Ok(((), vec![MintEvent::Unpaused { by: caller }]))
        })?;
        self.publish(notifications).await;
        Ok(())
    }

    // =========================================================================
    // INVENTORY
    // =========================================================================

    async fn update_metadata(
        &self,
        caller: Address,
        updates: Vec<(UnitId, String)>,
    ) -> Result<(), AdmissionError> {
        let ((), notifications) =
            self.execute("update_metadata", Gate::Pause, caller, |_, ledger, _| {
                if updates.is_empty() {
                    return Err(AdmissionError::EmptyBatch);
                }

                let mut hashed = Vec::with_capacity(updates.len());
                for (unit_id, uri) in &updates {
                    match ledger.owner_of(*unit_id) {
                        None => return Err(AdmissionError::UnitNotFound(*unit_id)),
                        Some(holder) if holder != caller => {
                            return Err(AdmissionError::NotUnitHolder(*unit_id))
                        }
                        Some(_) => hashed.push((*unit_id, MetadataHash::from_uri(uri))),
                    }
                }
                ledger.set_metadata_batch(&hashed)?;

                info!(count = hashed.len(), "[qm-admission] Metadata updated");
                let events = hashed
                    .into_iter()
                    .map(|(unit_id, metadata)| MintEvent::MetadataUpdated { unit_id, metadata })
                    .collect();
                Ok(((), events))
            })?;
        self.publish(notifications).await;
        Ok(())
    }

    async fn list_units_by_owner(&self, owner: Address) -> Result<Vec<UnitId>, AdmissionError> {
        let units = self.ledger.units_of_owner(&owner);
        debug!(
            owner = %short_address(&owner),
            count = units.len(),
            "[qm-admission] Units listed"
        );

        let notification = MintNotification::new(
            MintEvent::UnitsListed {
                owner,
                units: units.clone(),
            },
            self.clock.now(),
        );
        self.publish(vec![notification]).await;
        Ok(units)
    }

    async fn transfer_unit(
        &self,
        caller: Address,
        to: Address,
        unit_id: UnitId,
    ) -> Result<(), AdmissionError> {
        let ((), notifications) =
            self.execute("transfer_unit", Gate::Pause, caller, |state, ledger, _| {
                state.transfer_gate.ensure_enabled()?;
                match ledger.owner_of(unit_id) {
                    None => return Err(AdmissionError::UnitNotFound(unit_id)),
                    Some(holder) if holder != caller => {
                        return Err(AdmissionError::NotUnitHolder(unit_id))
                    }
                    Some(_) => {}
                }
                ledger.transfer(unit_id, &caller, &to)?;

                info!(
                    unit_id,
                    from = %short_address(&caller),
                    to = %short_address(&to),
                    "[qm-admission] Unit transferred"
                );
                let event = MintEvent::UnitTransferred {
                    unit_id,
                    from: caller,
                    to,
                };
                Ok(((), vec![event]))
            })?;
        self.publish(notifications).await;
        Ok(())
    }

    // =========================================================================
    // READ MODEL
    // =========================================================================

    fn snapshot(&self) -> CounterSnapshot {
        self.state.lock().snapshot()
    }

    fn phase(&self, phase_id: PhaseId) -> PhaseView {
        self.state.lock().phases.view(phase_id)
    }

    fn account(&self, address: &Address) -> Option<Identity> {
        self.state.lock().registry.get(address).cloned()
    }

    fn phase_balance(&self, phase_id: PhaseId, address: &Address, role: Role) -> u64 {
        self.state.lock().phases.balance(phase_id, address, role)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

/// Owner address used by [`create_test_service`].
pub const TEST_OWNER: Address = [0x11; 20];

/// Service type wired to in-memory adapters.
pub type InMemoryAdmissionService =
    MintAdmissionService<InMemoryInventory, BusNotificationSink<InMemoryEventBus>>;

/// Create a service over in-memory adapters with the default configuration
/// (max 100, platform 20) owned by [`TEST_OWNER`].
pub fn create_test_service() -> (InMemoryAdmissionService, Arc<InMemoryEventBus>) {
    let bus = Arc::new(InMemoryEventBus::new());
    let config = ServiceConfig {
        mint: MintConfig {
            owner: TEST_OWNER,
            ..MintConfig::default()
        },
        ..ServiceConfig::default()
    };
    let service = MintAdmissionService::assemble(
        config,
        Arc::new(InMemoryInventory::new()),
        Arc::new(BusNotificationSink::new(Arc::clone(&bus))),
    );
    (service, bus)
}

/// Create a service over in-memory adapters with a custom configuration.
pub fn create_test_service_with(
    mint: MintConfig,
) -> Result<(InMemoryAdmissionService, Arc<InMemoryEventBus>), ConfigError> {
    let bus = Arc::new(InMemoryEventBus::new());
    let config = ServiceConfig {
        mint,
        ..ServiceConfig::default()
    };
    let service = MintAdmissionService::new(
        config,
        Arc::new(InMemoryInventory::new()),
        Arc::new(BusNotificationSink::new(Arc::clone(&bus))),
    )?;
    Ok((service, bus))
}
