//! Single-Owner Access Adapter
//!
//! Implements `AccessControl` with one fixed owner address.

use crate::ports::outbound::AccessControl;
use qm_types::Address;

/// The owner capability held by exactly one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleOwner {
    owner: Address,
}

impl SingleOwner {
    /// Grant the capability to `owner`.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// The owner address.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.owner
    }
}

impl AccessControl for SingleOwner {
    fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }
}
