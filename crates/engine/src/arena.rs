//! Per-tenant arena: every table a company owns, in one partition.
//!
//! Ownership is tree-shaped from the company downward, so tenant deletion is
//! "drop the partition" rather than a cascading walk over foreign keys. The
//! audit trail is deliberately NOT part of the arena; it survives the
//! partition.

use std::collections::HashMap;

use tradebook_catalog::{Supplier, SupplierId, SupplierItem, SupplierItemId};
use tradebook_core::{DomainError, DomainResult, UserId};
use tradebook_identity::{Company, User};
use tradebook_ledger::{Customer, CustomerId, CustomerPayment, PaymentId};
use tradebook_receiving::{Container, ContainerId};
use tradebook_sales::{Sale, SaleId};

/// All rows owned by one company.
#[derive(Debug, Clone)]
pub struct TenantArena {
    pub company: Company,
    pub users: HashMap<UserId, User>,
    pub suppliers: HashMap<SupplierId, Supplier>,
    pub supplier_items: HashMap<SupplierItemId, SupplierItem>,
    pub containers: HashMap<ContainerId, Container>,
    pub customers: HashMap<CustomerId, Customer>,
    pub sales: HashMap<SaleId, Sale>,
    pub payments: HashMap<PaymentId, CustomerPayment>,
    /// Set under the arena lock when the company is deleted. A caller that
    /// cloned the partition handle before the deletion still acquires this
    /// lock afterwards; the tombstone stops it from writing into a partition
    /// that no longer exists.
    deleted: bool,
}

impl TenantArena {
    pub fn new(company: Company) -> Self {
        Self {
            company,
            users: HashMap::new(),
            suppliers: HashMap::new(),
            supplier_items: HashMap::new(),
            containers: HashMap::new(),
            customers: HashMap::new(),
            sales: HashMap::new(),
            payments: HashMap::new(),
            deleted: false,
        }
    }

    /// Tombstone the partition. Called with the arena lock held, immediately
    /// before the partition is removed from the tenant directory.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Fails once the partition has been tombstoned by company deletion.
    pub fn ensure_live(&self) -> DomainResult<()> {
        if self.deleted {
            return Err(DomainError::not_found(format!(
                "company {}",
                self.company.id
            )));
        }
        Ok(())
    }

    /// The acting user must exist in this partition.
    pub fn require_user(&self, user_id: UserId) -> DomainResult<&User> {
        self.users
            .get(&user_id)
            .ok_or_else(|| DomainError::unknown_user(user_id.to_string()))
    }

    pub fn require_customer(&self, customer_id: CustomerId) -> DomainResult<&Customer> {
        self.customers
            .get(&customer_id)
            .ok_or_else(|| DomainError::unknown_customer(customer_id.to_string()))
    }

    pub fn require_container(&self, container_id: ContainerId) -> DomainResult<&Container> {
        self.containers
            .get(&container_id)
            .ok_or_else(|| DomainError::not_found(format!("container {container_id}")))
    }

    pub fn require_supplier(&self, supplier_id: SupplierId) -> DomainResult<&Supplier> {
        self.suppliers
            .get(&supplier_id)
            .ok_or_else(|| DomainError::not_found(format!("supplier {supplier_id}")))
    }

    /// Cross-entity referential check, run before the partition is dropped.
    ///
    /// Every child row must reference a live parent within this partition;
    /// a violation means a write path went around the engine.
    pub fn integrity_check(&self) -> DomainResult<()> {
        for sale in self.sales.values() {
            if !self.customers.contains_key(&sale.customer_id) {
                return Err(DomainError::validation(format!(
                    "sale {} references missing customer {}",
                    sale.id, sale.customer_id
                )));
            }
        }
        for payment in self.payments.values() {
            if !self.customers.contains_key(&payment.customer_id) {
                return Err(DomainError::validation(format!(
                    "payment {} references missing customer {}",
                    payment.id, payment.customer_id
                )));
            }
        }
        for container in self.containers.values() {
            if !self.suppliers.contains_key(&container.supplier_id) {
                return Err(DomainError::validation(format!(
                    "container {} references missing supplier {}",
                    container.id, container.supplier_id
                )));
            }
        }
        for item in self.supplier_items.values() {
            if !self.suppliers.contains_key(&item.supplier_id) {
                return Err(DomainError::validation(format!(
                    "catalog entry {} references missing supplier {}",
                    item.id, item.supplier_id
                )));
            }
        }
        Ok(())
    }
}
