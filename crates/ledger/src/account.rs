use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradebook_core::{DomainError, DomainResult, Entity, TenantId, TenantScoped};

/// Customer identifier (tenant-scoped via the owning row).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Payment identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(Uuid);

impl PaymentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for PaymentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A customer account with its running balance.
///
/// `balance` is private on purpose: sales debit it through `apply_sale`,
/// payments credit it through `apply_payment`, and no other code path may
/// write it. It is a flat running total in cents (positive = the customer
/// owes), not a multi-bucket ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub tenant_id: TenantId,
    pub name: String,
    pub phone: Option<String>,
    balance: i64,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn create(
        id: CustomerId,
        tenant_id: TenantId,
        input: &NewCustomer,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }
        Ok(Self {
            id,
            tenant_id,
            name: input.name.clone(),
            phone: input.phone.clone(),
            balance: 0,
            created_at,
        })
    }

    /// Current balance: `sum(sale totals) - sum(payment amounts)`.
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Debit the account at sale-creation time.
    ///
    /// Called in the same unit of work as the sale write; the amount is the
    /// sale's `total_amount` and must be positive.
    pub fn apply_sale(&mut self, amount: i64) -> DomainResult<()> {
        if amount <= 0 {
            return Err(DomainError::InvalidAmount(amount));
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| DomainError::validation("customer balance overflows"))?;
        Ok(())
    }

    /// Credit the account for a payment.
    ///
    /// Called in the same unit of work as the payment write. The balance may
    /// go negative (overpayment is credit in the customer's favour).
    pub fn apply_payment(&mut self, amount: i64) -> DomainResult<()> {
        if amount <= 0 {
            return Err(DomainError::InvalidAmount(amount));
        }
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| DomainError::validation("customer balance overflows"))?;
        Ok(())
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Customer {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Input for registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
}

/// A credit against a customer's balance. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPayment {
    pub id: PaymentId,
    pub tenant_id: TenantId,
    pub customer_id: CustomerId,
    /// Positive amount in cents.
    pub amount: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Entity for CustomerPayment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for CustomerPayment {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
