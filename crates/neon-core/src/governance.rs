// crates/neon-core/src/governance.rs
//
// Single-principal governance gate.
//
// Every restricted setter checks the caller against one stored principal at
// the top of the call. There is no role hierarchy. Ownership moves either in
// one step (`transfer_ownership`) or in two (`nominate` then `accept`).

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::NeonError;

/// The governance principal of one component (token or vault).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Governance {
    /// Component name used in log lines ("token", "vault").
    scope: String,
    /// Current principal.
    principal: Address,
    /// Pending two-step nominee, if any.
    nominee: Option<Address>,
}

impl Governance {
    /// Create a gate owned by `principal`.
    pub fn new(scope: &str, principal: Address) -> Self {
        Self {
            scope: scope.to_string(),
            principal,
            nominee: None,
        }
    }

    /// The current principal.
    pub fn principal(&self) -> Address {
        self.principal
    }

    /// The pending nominee of a two-step transfer.
    pub fn nominee(&self) -> Option<Address> {
        self.nominee
    }

    /// Fail with `Unauthorized` unless `caller` is the principal.
    pub fn ensure(&self, caller: &Address) -> Result<(), NeonError> {
        if *caller != self.principal {
            return Err(NeonError::Unauthorized(*caller));
        }
        Ok(())
    }

    /// Hand ownership to `new_principal` immediately.
    ///
    /// Clears any pending nomination.
    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_principal: Address,
    ) -> Result<(), NeonError> {
        self.ensure(caller)?;
        if new_principal.is_zero() {
            return Err(NeonError::InvalidAddress(
                "governance cannot be transferred to the zero address".to_string(),
            ));
        }
        tracing::info!(
            "{} governance transferred: {} -> {}",
            self.scope,
            self.principal,
            new_principal
        );
        self.principal = new_principal;
        self.nominee = None;
        Ok(())
    }

    /// First step of a two-step transfer: record a nominee.
    pub fn nominate(&mut self, caller: &Address, candidate: Address) -> Result<(), NeonError> {
        self.ensure(caller)?;
        if candidate.is_zero() {
            return Err(NeonError::InvalidAddress(
                "cannot nominate the zero address".to_string(),
            ));
        }
        tracing::info!("{} governance nominee set to {}", self.scope, candidate);
        self.nominee = Some(candidate);
        Ok(())
    }

    /// Second step: the nominee claims ownership.
    pub fn accept(&mut self, caller: &Address) -> Result<(), NeonError> {
        match self.nominee {
            Some(nominee) if nominee == *caller => {
                tracing::info!(
                    "{} governance accepted: {} -> {}",
                    self.scope,
                    self.principal,
                    nominee
                );
                self.principal = nominee;
                self.nominee = None;
                Ok(())
            }
            _ => Err(NeonError::Unauthorized(*caller)),
        }
    }
}
