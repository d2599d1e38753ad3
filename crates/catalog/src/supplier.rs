use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tradebook_core::{DomainError, DomainResult, Entity, TenantId, TenantScoped};

/// Supplier identifier (tenant-scoped via the owning row).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(Uuid);

impl SupplierId {
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

impl Default for SupplierId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SupplierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog entry identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierItemId(Uuid);

impl SupplierItemId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SupplierItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SupplierItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Contact information for a supplier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A supplier the company buys from. Owns catalog entries and containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub tenant_id: TenantId,
    pub name: String,
    pub contact: ContactInfo,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

impl Supplier {
    pub fn create(
        id: SupplierId,
        tenant_id: TenantId,
        input: &NewSupplier,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("supplier name cannot be empty"));
        }
        Ok(Self {
            id,
            tenant_id,
            name: input.name.clone(),
            contact: input.contact.clone(),
            country: input.country.clone(),
            created_at,
        })
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl TenantScoped for Supplier {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

/// Input for registering a supplier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSupplier {
    pub name: String,
    pub contact: ContactInfo,
    pub country: String,
}

/// One price-list entry. A catalog reference, not inventory: quantities are
/// tracked on container items, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierItem {
    pub id: SupplierItemId,
    pub supplier_id: SupplierId,
    pub item_name: String,
    /// Unit price in the smallest currency unit (cents).
    pub unit_price: i64,
}

impl SupplierItem {
    pub fn create(
        id: SupplierItemId,
        supplier_id: SupplierId,
        item_name: &str,
        unit_price: i64,
    ) -> DomainResult<Self> {
        if item_name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if unit_price <= 0 {
            return Err(DomainError::InvalidAmount(unit_price));
        }
        Ok(Self {
            id,
            supplier_id,
            item_name: item_name.to_string(),
            unit_price,
        })
    }
}

impl Entity for SupplierItem {
    type Id = SupplierItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entry_requires_positive_price() {
        let err = SupplierItem::create(SupplierItemId::new(), SupplierId::new(), "WidgetA", 0)
            .unwrap_err();
        assert_eq!(err, DomainError::InvalidAmount(0));
    }

    #[test]
    fn supplier_requires_name() {
        let err = Supplier::create(
            SupplierId::new(),
            TenantId::new(),
            &NewSupplier {
                name: "".to_string(),
                contact: ContactInfo::default(),
                country: "CN".to_string(),
            },
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
