//! Domain error model.

use thiserror::Error;

use crate::id::TenantId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (referential lookups,
/// invariants, validation). Storage concerns belong elsewhere. Every variant
/// aborts the enclosing unit of work; nothing is partially applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An operand belongs to a different tenant than the caller's scope.
    #[error("cross-tenant access: scope {scope}, operand belongs to {found}")]
    CrossTenantAccess { scope: TenantId, found: TenantId },

    /// A receipt or sale line names an item the container does not carry.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// A sale's source reference does not resolve within the tenant.
    #[error("unknown sale source: {0}")]
    UnknownSource(String),

    /// The acting user does not exist within the tenant.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// The referenced customer does not exist within the tenant.
    #[error("unknown customer: {0}")]
    UnknownCustomer(String),

    /// Receiving the delta would push `received_qty` past the ordered quantity.
    #[error(
        "over-receipt of '{item_name}': ordered {ordered}, received {received}, delta {delta}"
    )]
    OverReceipt {
        item_name: String,
        ordered: u64,
        received: u64,
        delta: u64,
    },

    /// A monetary amount that must be positive was zero or negative.
    #[error("invalid amount: {0}")]
    InvalidAmount(i64),

    /// A sale with no line items.
    #[error("sale has no line items")]
    EmptySale,

    /// A value failed validation (e.g. malformed or missing input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced row does not exist (plain CRUD lookups).
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn cross_tenant(scope: TenantId, found: TenantId) -> Self {
        Self::CrossTenantAccess { scope, found }
    }

    pub fn unknown_item(name: impl Into<String>) -> Self {
        Self::UnknownItem(name.into())
    }

    pub fn unknown_source(msg: impl Into<String>) -> Self {
        Self::UnknownSource(msg.into())
    }

    pub fn unknown_user(msg: impl Into<String>) -> Self {
        Self::UnknownUser(msg.into())
    }

    pub fn unknown_customer(msg: impl Into<String>) -> Self {
        Self::UnknownCustomer(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
