//! # Domain Entities
//!
//! Identity records, phases, global counters and the mint configuration.

use qm_types::{Address, PhaseId, Role, Timestamp};
use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTITY
// =============================================================================

/// Role-specific part of an identity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityKind {
    /// Regular user.
    Normal {
        /// Cap on units held.
        global_limit: u64,
    },
    /// User that must be verified before minting.
    Premium {
        /// Cap on units held.
        global_limit: u64,
        /// Set once by `verify_premium`.
        verified: bool,
    },
    /// Platform operator. Draws from the platform quota, no own limit.
    Admin,
}

/// A registered identity.
///
/// An address holds at most one identity and its role never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    pub name: String,
    /// Identity address.
    pub address: Address,
    /// When the identity was registered.
    pub registered_at: Timestamp,
    /// Role-specific fields.
    pub kind: IdentityKind,
}

impl Identity {
    /// Build a record for `role`. `global_limit` is ignored for Admin.
    #[must_use]
    pub fn new(
        name: String,
        address: Address,
        role: Role,
        global_limit: u64,
        registered_at: Timestamp,
    ) -> Self {
        let kind = match role {
            Role::Normal => IdentityKind::Normal { global_limit },
            Role::Premium => IdentityKind::Premium {
                global_limit,
                verified: false,
            },
            Role::Admin => IdentityKind::Admin,
        };
        Self {
            name,
            address,
            registered_at,
            kind,
        }
    }

    /// Role of this identity.
    #[must_use]
    pub fn role(&self) -> Role {
        match self.kind {
            IdentityKind::Normal { .. } => Role::Normal,
            IdentityKind::Premium { .. } => Role::Premium,
            IdentityKind::Admin => Role::Admin,
        }
    }

    /// Global limit for Normal and Premium identities.
    #[must_use]
    pub fn global_limit(&self) -> Option<u64> {
        match self.kind {
            IdentityKind::Normal { global_limit } | IdentityKind::Premium { global_limit, .. } => {
                Some(global_limit)
            }
            IdentityKind::Admin => None,
        }
    }

    /// Whether this is a Premium identity that has been verified.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self.kind, IdentityKind::Premium { verified: true, .. })
    }

    /// Whether this is an Admin identity.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.kind, IdentityKind::Admin)
    }
}

// =============================================================================
// PHASE
// =============================================================================

/// Lifecycle status of a phase slot.
///
/// ```text
/// Uncreated -> Created -> Active -> Deactivated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseStatus {
    /// Slot exists but `create_phase` has not run.
    Uncreated,
    /// Limits stored, not yet admitting.
    Created,
    /// Admitting mints.
    Active,
    /// Closed for good.
    Deactivated,
}

impl PhaseStatus {
    /// Check if a transition is valid.
    #[must_use]
    pub fn can_transition_to(&self, next: PhaseStatus) -> bool {
        matches!(
            (self, next),
            (Self::Uncreated, Self::Created)
                | (Self::Created, Self::Active)
                | (Self::Active, Self::Deactivated)
        )
    }

    /// Check if this is a terminal status.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deactivated)
    }
}

/// A release window with its own capacity and per-address limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Phase id.
    pub id: PhaseId,
    /// Current status.
    pub status: PhaseStatus,
    /// Remaining reserved capacity. Decremented per admitted user mint.
    pub reserved_limit: u64,
    /// Units admitted in this phase so far.
    pub minted: u64,
    /// Per-address cap for Premium identities.
    pub premium_user_limit: u64,
    /// Per-address cap for Normal identities.
    pub normal_user_limit: u64,
    /// When `create_phase` ran.
    pub created_at: Timestamp,
}

impl Phase {
    /// Per-address cap for `role`. Admin has no phase cap.
    #[must_use]
    pub fn role_limit(&self, role: Role) -> Option<u64> {
        match role {
            Role::Normal => Some(self.normal_user_limit),
            Role::Premium => Some(self.premium_user_limit),
            Role::Admin => None,
        }
    }

    /// Total cap of the phase: consumed plus remaining.
    #[must_use]
    pub fn total_limit(&self) -> u64 {
        self.minted.saturating_add(self.reserved_limit)
    }
}

// =============================================================================
// GLOBAL COUNTERS
// =============================================================================

/// Mint-wide capacity counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCounters {
    /// Immutable cap on unit ids (`0..max_mint_limit`).
    pub max_mint_limit: u64,
    /// Platform capacity at initialization.
    pub platform_mint_initial: u64,
    /// Remaining Admin capacity.
    pub platform_mint_limit: u64,
    /// Remaining Normal/Premium capacity.
    pub users_mint_limit: u64,
    /// Total Normal/Premium units admitted.
    pub users_minted_balance: u64,
}

impl GlobalCounters {
    /// Initial counters for a validated configuration.
    #[must_use]
    pub fn from_config(config: &MintConfig) -> Self {
        Self {
            max_mint_limit: config.max_mint_limit,
            platform_mint_initial: config.platform_mint_limit,
            platform_mint_limit: config.platform_mint_limit,
            users_mint_limit: config
                .max_mint_limit
                .saturating_sub(config.platform_mint_limit),
            users_minted_balance: 0,
        }
    }

    /// Total capacity ever available to Normal/Premium mints.
    #[must_use]
    pub fn users_capacity(&self) -> u64 {
        self.max_mint_limit
            .saturating_sub(self.platform_mint_initial)
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Parameters fixed when the mint is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintConfig {
    /// Holder of the owner capability.
    pub owner: Address,
    /// Cap on unit ids.
    pub max_mint_limit: u64,
    /// Capacity reserved for Admin mints.
    pub platform_mint_limit: u64,
}

impl MintConfig {
    /// Check that the users capacity cannot underflow.
    pub fn validate(&self) -> Result<(), String> {
        if self.platform_mint_limit > self.max_mint_limit {
            return Err(format!(
                "platform_mint_limit ({}) exceeds max_mint_limit ({})",
                self.platform_mint_limit, self.max_mint_limit
            ));
        }
        Ok(())
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            owner: qm_types::ZERO_ADDRESS,
            max_mint_limit: 100,
            platform_mint_limit: 20,
        }
    }
}
