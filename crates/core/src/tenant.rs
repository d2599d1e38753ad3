//! Tenant scoping: the isolation guard every operation passes through.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::{TenantId, UserId};

/// Marker trait for entities that carry an owning tenant.
///
/// Implemented by every persisted row (directly or via its parent), so the
/// scope guard can verify ownership before any read or write touches it.
pub trait TenantScoped {
    fn tenant_id(&self) -> TenantId;
}

/// The caller's tenant context: which company the operation acts on and which
/// user performs it.
///
/// This is a pure guard, not a state machine. A scope is constructed once per
/// operation by the (out-of-scope) API layer and passed explicitly; there is
/// no ambient per-process tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantScope {
    tenant_id: TenantId,
    actor: UserId,
}

impl TenantScope {
    pub fn new(tenant_id: TenantId, actor: UserId) -> Self {
        Self { tenant_id, actor }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// The user performing the operation; attributed on the audit trail.
    pub fn actor(&self) -> UserId {
        self.actor
    }

    /// Verify an operand belongs to this scope's tenant.
    ///
    /// Fails with `CrossTenantAccess` before any mutation is attempted.
    pub fn ensure<T: TenantScoped>(&self, entity: &T) -> DomainResult<()> {
        let found = entity.tenant_id();
        if found != self.tenant_id {
            return Err(DomainError::cross_tenant(self.tenant_id, found));
        }
        Ok(())
    }

    /// Verify a raw tenant id matches this scope.
    pub fn ensure_tenant(&self, found: TenantId) -> DomainResult<()> {
        if found != self.tenant_id {
            return Err(DomainError::cross_tenant(self.tenant_id, found));
        }
        Ok(())
    }
}
