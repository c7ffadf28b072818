//! # Mint Notifications
//!
//! Defines every notification that flows through the bus. Each one carries
//! the key identifiers of the operation that produced it; the envelope adds
//! an id and a timestamp.

use qm_types::{Address, MetadataHash, PhaseId, Role, Timestamp, UnitId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which admission path produced a mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MintPath {
    /// `request_mint`: one unit for a Normal or Premium identity.
    Single,
    /// `request_bulk_mint`: a batch charged to user quotas.
    Bulk,
    /// `request_admin_mint`: one unit from platform capacity.
    Admin,
    /// `request_admin_bulk_mint`: a batch from platform capacity.
    AdminBulk,
}

impl MintPath {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Bulk => "bulk",
            Self::Admin => "admin",
            Self::AdminBulk => "admin_bulk",
        }
    }

    /// Whether this path draws from platform capacity.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::AdminBulk)
    }
}

/// One issued unit inside a `UnitsMinted` notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintedUnit {
    /// Serial number of the unit.
    pub unit_id: UnitId,
    /// Receiving identity.
    pub to: Address,
}

/// All notifications the admission subsystem can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MintEvent {
    // =========================================================================
    // ACCOUNT REGISTRY
    // =========================================================================
    /// An identity was registered under a role.
    AccountRegistered {
        /// Registered address.
        address: Address,
        /// Display name.
        name: String,
        /// Role fixed at registration.
        role: Role,
        /// Global limit (None for Admin).
        global_limit: Option<u64>,
    },

    /// A Premium identity was verified.
    PremiumVerified {
        /// Verified address.
        address: Address,
    },

    /// A Normal or Premium identity's global limit changed.
    GlobalLimitUpdated {
        /// Affected address.
        address: Address,
        /// New limit.
        new_limit: u64,
    },

    // =========================================================================
    // PHASE LIFECYCLE
    // =========================================================================
    /// A phase slot moved from Uncreated to Created.
    PhaseCreated {
        /// Phase id.
        phase_id: PhaseId,
        /// Reserved capacity for the phase.
        reserved_limit: u64,
        /// Per-address cap for Premium identities.
        premium_user_limit: u64,
        /// Per-address cap for Normal identities.
        normal_user_limit: u64,
    },

    /// A phase moved from Created to Active.
    PhaseActivated {
        /// Phase id.
        phase_id: PhaseId,
    },

    /// A phase moved from Active to Deactivated.
    PhaseDeactivated {
        /// Deactivated phase id.
        phase_id: PhaseId,
        /// The fresh Uncreated slot.
        next_phase_id: PhaseId,
    },

    /// The active phase's cap was raised.
    ReservedLimitUpdated {
        /// Phase id.
        phase_id: PhaseId,
        /// New total cap for the phase.
        new_limit: u64,
        /// Remaining reserved capacity after the update.
        remaining: u64,
    },

    // =========================================================================
    // ADMISSION
    // =========================================================================
    /// A request (or whole batch) was admitted and issued.
    UnitsMinted {
        /// Admission path.
        path: MintPath,
        /// Identity that submitted the request.
        requester: Address,
        /// Phase the mint was charged to (None for admin paths).
        phase_id: Option<PhaseId>,
        /// Issued units in request order.
        units: Vec<MintedUnit>,
    },

    // =========================================================================
    // INVENTORY
    // =========================================================================
    /// A unit's metadata hash was replaced.
    MetadataUpdated {
        /// Unit id.
        unit_id: UnitId,
        /// New metadata hash.
        metadata: MetadataHash,
    },

    /// Units held by an owner were enumerated.
    UnitsListed {
        /// Owner queried.
        owner: Address,
        /// Units held, ascending.
        units: Vec<UnitId>,
    },

    /// A unit changed hands.
    UnitTransferred {
        /// Unit id.
        unit_id: UnitId,
        /// Previous holder.
        from: Address,
        /// New holder.
        to: Address,
    },

    // =========================================================================
    // CONTROL GATES
    // =========================================================================
    /// Transfers were enabled (one-way).
    TransferEnabled,

    /// All mutating operations were suspended.
    Paused {
        /// Owner that paused.
        by: Address,
    },

    /// Mutating operations resumed.
    Unpaused {
        /// Owner that unpaused.
        by: Address,
    },
}

impl MintEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::AccountRegistered { .. }
            | Self::PremiumVerified { .. }
            | Self::GlobalLimitUpdated { .. } => EventTopic::Accounts,
            Self::PhaseCreated { .. }
            | Self::PhaseActivated { .. }
            | Self::PhaseDeactivated { .. }
            | Self::ReservedLimitUpdated { .. } => EventTopic::Phases,
            Self::UnitsMinted { .. } => EventTopic::Minting,
            Self::MetadataUpdated { .. }
            | Self::UnitsListed { .. }
            | Self::UnitTransferred { .. } => EventTopic::Inventory,
            Self::TransferEnabled | Self::Paused { .. } | Self::Unpaused { .. } => {
                EventTopic::Control
            }
        }
    }

    /// Short stable name, used as a log field.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountRegistered { .. } => "account_registered",
            Self::PremiumVerified { .. } => "premium_verified",
            Self::GlobalLimitUpdated { .. } => "global_limit_updated",
            Self::PhaseCreated { .. } => "phase_created",
            Self::PhaseActivated { .. } => "phase_activated",
            Self::PhaseDeactivated { .. } => "phase_deactivated",
            Self::ReservedLimitUpdated { .. } => "reserved_limit_updated",
            Self::UnitsMinted { .. } => "units_minted",
            Self::MetadataUpdated { .. } => "metadata_updated",
            Self::UnitsListed { .. } => "units_listed",
            Self::UnitTransferred { .. } => "unit_transferred",
            Self::TransferEnabled => "transfer_enabled",
            Self::Paused { .. } => "paused",
            Self::Unpaused { .. } => "unpaused",
        }
    }
}

/// Envelope placed on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintNotification {
    /// Unique id of this notification.
    pub id: Uuid,
    /// Schema version.
    pub version: u16,
    /// When the originating operation committed.
    pub timestamp: Timestamp,
    /// The notification body.
    pub event: MintEvent,
}

impl MintNotification {
    /// Wrap an event with a fresh id.
    #[must_use]
    pub fn new(event: MintEvent, timestamp: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            version: crate::PROTOCOL_VERSION,
            timestamp,
            event,
        }
    }

    /// Topic of the wrapped event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        self.event.topic()
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Registration, verification, limit updates.
    Accounts,
    /// Phase lifecycle transitions.
    Phases,
    /// Admitted mints.
    Minting,
    /// Metadata, listing, transfers.
    Inventory,
    /// Pause and transfer gates.
    Control,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific notifications.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if a notification matches this filter.
    #[must_use]
    pub fn matches(&self, notification: &MintNotification) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&notification.topic())
    }
}
