//! The public operation surface of the core.
//!
//! One `Engine` owns the tenant directory, a global id→tenant ownership index
//! (used to tell "does not exist" apart from "belongs to another tenant"),
//! and the audit log. Every mutating operation:
//!
//! 1. resolves the caller's tenant partition and locks it,
//! 2. verifies the acting user and every operand against the scope,
//! 3. runs all fallible validation on staged copies,
//! 4. appends exactly one audit entry and applies the writes.
//!
//! Steps 1–3 commit nothing; a failure anywhere leaves the partition exactly
//! as it was. The per-tenant mutex serializes every mutation within a tenant,
//! which is strictly stronger than the per-customer / per-container-item
//! serialization the ledger invariants require.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::Utc;
use uuid::Uuid;

use tradebook_audit::{AuditEntry, AuditLog};
use tradebook_catalog::{NewSupplier, Supplier, SupplierId, SupplierItem, SupplierItemId};
use tradebook_core::{DomainError, DomainResult, TenantId, TenantScope, UserId};
use tradebook_identity::{Company, NewCompany, NewUser, User};
use tradebook_ledger::{Customer, CustomerId, CustomerPayment, NewCustomer, PaymentId};
use tradebook_receiving::{Container, ContainerId, NewContainer, ReceiptLine, ReceivingStatus};
use tradebook_sales::{NewSale, Sale, SaleId, SaleSource};

use crate::arena::TenantArena;

/// The ledger and reconciliation engine.
///
/// Cheap to share (`Arc<Engine>`); all interior state is behind locks.
#[derive(Debug, Default)]
pub struct Engine {
    tenants: RwLock<HashMap<TenantId, Arc<Mutex<TenantArena>>>>,
    /// Which tenant owns which row id, across all partitions.
    owners: RwLock<HashMap<Uuid, TenantId>>,
    audit: AuditLog,
}

fn poisoned() -> DomainError {
    DomainError::validation("tenant lock poisoned")
}

/// Acquire a tenant partition.
///
/// A caller can hold a partition handle cloned before `delete_company` ran;
/// the tombstone check turns that into the same `NotFound` the tenant
/// directory would have returned, instead of writing into a discarded
/// partition.
fn lock(arena: &Arc<Mutex<TenantArena>>) -> DomainResult<MutexGuard<'_, TenantArena>> {
    let guard = arena.lock().map_err(|_| poisoned())?;
    guard.ensure_live()?;
    Ok(guard)
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    fn arena(&self, tenant_id: TenantId) -> DomainResult<Arc<Mutex<TenantArena>>> {
        let tenants = self.tenants.read().map_err(|_| poisoned())?;
        tenants
            .get(&tenant_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("company {tenant_id}")))
    }

    fn register_owner(&self, id: Uuid, tenant_id: TenantId) {
        if let Ok(mut owners) = self.owners.write() {
            owners.insert(id, tenant_id);
        }
    }

    /// Turn a within-partition lookup miss into the right error: if the id is
    /// owned by a different tenant this is a `CrossTenantAccess`, otherwise
    /// the original referential error stands.
    fn classify_missing(&self, scope: &TenantScope, id: Uuid, missing: DomainError) -> DomainError {
        match self.owners.read() {
            Ok(owners) => match owners.get(&id) {
                Some(found) if *found != scope.tenant_id() => {
                    DomainError::cross_tenant(scope.tenant_id(), *found)
                }
                _ => missing,
            },
            Err(_) => missing,
        }
    }

    fn require_actor(&self, scope: &TenantScope, arena: &TenantArena) -> DomainResult<()> {
        arena
            .require_user(scope.actor())
            .map(|_| ())
            .map_err(|e| self.classify_missing(scope, *scope.actor().as_uuid(), e))
    }

    /// Onboard a company together with its bootstrap admin user.
    ///
    /// The two are created in one unit so the creation itself has an actor to
    /// attribute on the audit trail.
    pub fn create_company(&self, input: &NewCompany) -> DomainResult<(TenantId, UserId)> {
        let now = Utc::now();
        let tenant_id = TenantId::new();
        let company = Company::create(tenant_id, input, now)?;
        let admin_id = UserId::new();
        let admin = User::create(admin_id, tenant_id, &input.admin, now)?;

        let mut arena = TenantArena::new(company);
        arena.users.insert(admin_id, admin);

        self.audit.append(
            tenant_id,
            admin_id,
            "company.created",
            "company",
            *tenant_id.as_uuid(),
            format!("company '{}' onboarded", input.name),
            now,
        )?;

        let mut tenants = self.tenants.write().map_err(|_| poisoned())?;
        tenants.insert(tenant_id, Arc::new(Mutex::new(arena)));
        drop(tenants);

        self.register_owner(*tenant_id.as_uuid(), tenant_id);
        self.register_owner(*admin_id.as_uuid(), tenant_id);

        tracing::info!(%tenant_id, %admin_id, "company onboarded");
        Ok((tenant_id, admin_id))
    }

    /// Drop a company's partition after an explicit referential integrity
    /// check. The audit trail is retained.
    pub fn delete_company(&self, scope: &TenantScope) -> DomainResult<()> {
        let tenant_id = scope.tenant_id();
        let arena_arc = self.arena(tenant_id)?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;
        arena.integrity_check()?;

        self.audit.append(
            tenant_id,
            scope.actor(),
            "company.deleted",
            "company",
            *tenant_id.as_uuid(),
            format!("company '{}' deleted", arena.company.name),
            Utc::now(),
        )?;

        // Remove the partition while still holding its lock, so no mutation
        // can slip in between the integrity check and the drop. The tombstone
        // covers callers that cloned the partition handle before removal.
        arena.mark_deleted();
        let mut tenants = self.tenants.write().map_err(|_| poisoned())?;
        tenants.remove(&tenant_id);
        drop(tenants);
        if let Ok(mut owners) = self.owners.write() {
            owners.retain(|_, t| *t != tenant_id);
        }

        tracing::info!(%tenant_id, "company deleted");
        Ok(())
    }

    pub fn create_user(&self, scope: &TenantScope, input: &NewUser) -> DomainResult<UserId> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let email = input.email.trim();
        if arena.users.values().any(|u| u.email == email) {
            return Err(DomainError::validation(format!(
                "email already registered: '{email}'"
            )));
        }

        let now = Utc::now();
        let user_id = UserId::new();
        let user = User::create(user_id, scope.tenant_id(), input, now)?;

        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "user.created",
            "user",
            *user_id.as_uuid(),
            format!("user '{}' created", user.email),
            now,
        )?;
        arena.users.insert(user_id, user);
        self.register_owner(*user_id.as_uuid(), scope.tenant_id());

        tracing::info!(tenant_id = %scope.tenant_id(), %user_id, "user created");
        Ok(user_id)
    }

    pub fn create_supplier(
        &self,
        scope: &TenantScope,
        input: &NewSupplier,
    ) -> DomainResult<SupplierId> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let now = Utc::now();
        let supplier_id = SupplierId::new();
        let supplier = Supplier::create(supplier_id, scope.tenant_id(), input, now)?;

        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "supplier.created",
            "supplier",
            *supplier_id.as_uuid(),
            format!("supplier '{}' created", supplier.name),
            now,
        )?;
        arena.suppliers.insert(supplier_id, supplier);
        self.register_owner(*supplier_id.as_uuid(), scope.tenant_id());

        tracing::info!(tenant_id = %scope.tenant_id(), %supplier_id, "supplier created");
        Ok(supplier_id)
    }

    pub fn add_supplier_item(
        &self,
        scope: &TenantScope,
        supplier_id: SupplierId,
        item_name: &str,
        unit_price: i64,
    ) -> DomainResult<SupplierItemId> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let supplier = arena
            .require_supplier(supplier_id)
            .map_err(|e| self.classify_missing(scope, *supplier_id.as_uuid(), e))?;
        scope.ensure(supplier)?;

        let item_id = SupplierItemId::new();
        let item = SupplierItem::create(item_id, supplier_id, item_name, unit_price)?;

        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "supplier_item.added",
            "supplier_item",
            *item_id.as_uuid(),
            format!("catalog entry '{}' at {} added", item.item_name, unit_price),
            Utc::now(),
        )?;
        arena.supplier_items.insert(item_id, item);
        self.register_owner(*item_id.as_uuid(), scope.tenant_id());

        Ok(item_id)
    }

    pub fn create_customer(
        &self,
        scope: &TenantScope,
        input: &NewCustomer,
    ) -> DomainResult<CustomerId> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let now = Utc::now();
        let customer_id = CustomerId::new();
        let customer = Customer::create(customer_id, scope.tenant_id(), input, now)?;

        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "customer.created",
            "customer",
            *customer_id.as_uuid(),
            format!("customer '{}' created", customer.name),
            now,
        )?;
        arena.customers.insert(customer_id, customer);
        self.register_owner(*customer_id.as_uuid(), scope.tenant_id());

        tracing::info!(tenant_id = %scope.tenant_id(), %customer_id, "customer created");
        Ok(customer_id)
    }

    pub fn create_container(
        &self,
        scope: &TenantScope,
        input: &NewContainer,
    ) -> DomainResult<ContainerId> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let supplier = arena
            .require_supplier(input.supplier_id)
            .map_err(|e| self.classify_missing(scope, *input.supplier_id.as_uuid(), e))?;
        scope.ensure(supplier)?;

        let now = Utc::now();
        let container_id = ContainerId::new();
        let container = Container::create(container_id, scope.tenant_id(), input, now)?;

        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "container.created",
            "container",
            *container_id.as_uuid(),
            format!(
                "container '{}' registered with {} item lines",
                container.container_no,
                container.items.len()
            ),
            now,
        )?;
        arena.containers.insert(container_id, container);
        self.register_owner(*container_id.as_uuid(), scope.tenant_id());

        tracing::info!(tenant_id = %scope.tenant_id(), %container_id, "container registered");
        Ok(container_id)
    }

    /// Reconcile a receipt batch against a container.
    ///
    /// All-or-nothing: the whole batch is validated against a staged copy;
    /// an `UnknownItem` or `OverReceipt` on any line commits nothing.
    pub fn receive_items(
        &self,
        scope: &TenantScope,
        container_id: ContainerId,
        lines: &[ReceiptLine],
    ) -> DomainResult<()> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let container = arena
            .require_container(container_id)
            .map_err(|e| self.classify_missing(scope, *container_id.as_uuid(), e))?;
        scope.ensure(container)?;

        let mut staged = container.clone();
        staged.receive(lines)?;

        let received: u64 = lines
            .iter()
            .fold(0u64, |acc, l| acc.saturating_add(l.received_delta));
        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "container.items_received",
            "container",
            *container_id.as_uuid(),
            format!(
                "received {received} units across {} lines on container '{}'",
                lines.len(),
                staged.container_no
            ),
            Utc::now(),
        )?;
        arena.containers.insert(container_id, staged);

        tracing::info!(
            tenant_id = %scope.tenant_id(),
            %container_id,
            received,
            "receipt reconciled"
        );
        Ok(())
    }

    /// Derived receiving view: the stored lifecycle tag plus whether every
    /// item line has been received in full. The tag is never auto-advanced.
    pub fn container_status(
        &self,
        scope: &TenantScope,
        container_id: ContainerId,
    ) -> DomainResult<ReceivingStatus> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let container = arena
            .require_container(container_id)
            .map_err(|e| self.classify_missing(scope, *container_id.as_uuid(), e))?;
        scope.ensure(container)?;
        Ok(container.receiving_status())
    }

    /// Record a sale: compute its total, resolve its source, debit the
    /// customer, and append the audit entry, as one unit of work.
    ///
    /// Receiving counts are untouched: selling and receiving are
    /// independently tracked ledgers.
    pub fn create_sale(&self, scope: &TenantScope, input: &NewSale) -> DomainResult<SaleId> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let mut customer = arena
            .require_customer(input.customer_id)
            .map_err(|e| self.classify_missing(scope, *input.customer_id.as_uuid(), e))?
            .clone();
        scope.ensure(&customer)?;

        let now = Utc::now();
        let sale_id = SaleId::new();
        let sale = Sale::create(sale_id, scope.tenant_id(), input, now)?;

        // Resolve the polymorphic source by explicit match on the closed union.
        match &sale.source {
            SaleSource::Container(container_id) => {
                let container = arena.containers.get(container_id).ok_or_else(|| {
                    self.classify_missing(
                        scope,
                        *container_id.as_uuid(),
                        DomainError::unknown_source(format!("container {container_id}")),
                    )
                })?;
                scope.ensure(container)?;
                sale.validate_lines_against(container)?;
            }
            SaleSource::Other { .. } => {
                // Opaque external reference; no table backs it today.
            }
        }

        customer.apply_sale(sale.total_amount)?;

        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "sale.recorded",
            "sale",
            *sale_id.as_uuid(),
            format!(
                "sale of {} to customer '{}' recorded",
                sale.total_amount, customer.name
            ),
            now,
        )?;
        let total_amount = sale.total_amount;
        arena.sales.insert(sale_id, sale);
        arena.customers.insert(input.customer_id, customer);
        self.register_owner(*sale_id.as_uuid(), scope.tenant_id());

        tracing::info!(
            tenant_id = %scope.tenant_id(),
            %sale_id,
            customer_id = %input.customer_id,
            total_amount,
            "sale recorded"
        );
        Ok(sale_id)
    }

    /// Record a customer payment and credit the balance, as one unit of work.
    pub fn apply_payment(
        &self,
        scope: &TenantScope,
        customer_id: CustomerId,
        amount: i64,
        note: Option<String>,
    ) -> DomainResult<PaymentId> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let mut arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;

        let mut customer = arena
            .require_customer(customer_id)
            .map_err(|e| self.classify_missing(scope, *customer_id.as_uuid(), e))?
            .clone();
        scope.ensure(&customer)?;

        customer.apply_payment(amount)?;

        let now = Utc::now();
        let payment_id = PaymentId::new();
        let payment = CustomerPayment {
            id: payment_id,
            tenant_id: scope.tenant_id(),
            customer_id,
            amount,
            note,
            created_at: now,
        };

        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            "payment.recorded",
            "payment",
            *payment_id.as_uuid(),
            format!("payment of {amount} from customer '{}'", customer.name),
            now,
        )?;
        arena.payments.insert(payment_id, payment);
        arena.customers.insert(customer_id, customer);
        self.register_owner(*payment_id.as_uuid(), scope.tenant_id());

        tracing::info!(
            tenant_id = %scope.tenant_id(),
            %payment_id,
            %customer_id,
            amount,
            "payment recorded"
        );
        Ok(payment_id)
    }

    /// Manual audit append for callers; fails only if the acting user does
    /// not exist within the tenant.
    pub fn record(
        &self,
        scope: &TenantScope,
        action_type: &str,
        entity_type: &str,
        entity_id: Uuid,
        description: &str,
    ) -> DomainResult<AuditEntry> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        self.require_actor(scope, &arena)?;
        self.audit.append(
            scope.tenant_id(),
            scope.actor(),
            action_type,
            entity_type,
            entity_id,
            description,
            Utc::now(),
        )
    }

    /// The tenant's full audit trail, oldest first.
    pub fn audit_trail(&self, scope: &TenantScope) -> Vec<AuditEntry> {
        self.audit.trail(scope.tenant_id())
    }

    pub fn company(&self, scope: &TenantScope) -> DomainResult<Company> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        Ok(arena.company.clone())
    }

    pub fn user_by_email(&self, scope: &TenantScope, email: &str) -> DomainResult<User> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        arena
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DomainError::unknown_user(email))
    }

    pub fn supplier(&self, scope: &TenantScope, supplier_id: SupplierId) -> DomainResult<Supplier> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let supplier = arena
            .require_supplier(supplier_id)
            .map_err(|e| self.classify_missing(scope, *supplier_id.as_uuid(), e))?;
        scope.ensure(supplier)?;
        Ok(supplier.clone())
    }

    /// Catalog price lookup; the catalog is never mutated by this path.
    pub fn catalog_price(
        &self,
        scope: &TenantScope,
        supplier_id: SupplierId,
        item_name: &str,
    ) -> DomainResult<i64> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let supplier = arena
            .require_supplier(supplier_id)
            .map_err(|e| self.classify_missing(scope, *supplier_id.as_uuid(), e))?;
        scope.ensure(supplier)?;
        arena
            .supplier_items
            .values()
            .find(|i| i.supplier_id == supplier_id && i.item_name == item_name)
            .map(|i| i.unit_price)
            .ok_or_else(|| DomainError::unknown_item(item_name))
    }

    pub fn container(
        &self,
        scope: &TenantScope,
        container_id: ContainerId,
    ) -> DomainResult<Container> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let container = arena
            .require_container(container_id)
            .map_err(|e| self.classify_missing(scope, *container_id.as_uuid(), e))?;
        scope.ensure(container)?;
        Ok(container.clone())
    }

    pub fn customer(&self, scope: &TenantScope, customer_id: CustomerId) -> DomainResult<Customer> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let customer = arena
            .require_customer(customer_id)
            .map_err(|e| self.classify_missing(scope, *customer_id.as_uuid(), e))?;
        scope.ensure(customer)?;
        Ok(customer.clone())
    }

    pub fn customer_balance(
        &self,
        scope: &TenantScope,
        customer_id: CustomerId,
    ) -> DomainResult<i64> {
        Ok(self.customer(scope, customer_id)?.balance())
    }

    pub fn sales_for_customer(
        &self,
        scope: &TenantScope,
        customer_id: CustomerId,
    ) -> DomainResult<Vec<Sale>> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let customer = arena
            .require_customer(customer_id)
            .map_err(|e| self.classify_missing(scope, *customer_id.as_uuid(), e))?;
        scope.ensure(customer)?;
        let mut sales: Vec<Sale> = arena
            .sales
            .values()
            .filter(|s| s.customer_id == customer_id)
            .cloned()
            .collect();
        sales.sort_by_key(|s| s.created_at);
        Ok(sales)
    }

    pub fn payments_for_customer(
        &self,
        scope: &TenantScope,
        customer_id: CustomerId,
    ) -> DomainResult<Vec<CustomerPayment>> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let customer = arena
            .require_customer(customer_id)
            .map_err(|e| self.classify_missing(scope, *customer_id.as_uuid(), e))?;
        scope.ensure(customer)?;
        let mut payments: Vec<CustomerPayment> = arena
            .payments
            .values()
            .filter(|p| p.customer_id == customer_id)
            .cloned()
            .collect();
        payments.sort_by_key(|p| p.created_at);
        Ok(payments)
    }

    /// Recompute a customer's balance from their sale/payment history and
    /// fail on drift. The stored balance is a materialized cache of the
    /// ledger, not an independent source of truth; drift means a write path
    /// went around `apply_sale`/`apply_payment`.
    pub fn verify_customer_ledger(
        &self,
        scope: &TenantScope,
        customer_id: CustomerId,
    ) -> DomainResult<()> {
        let arena_arc = self.arena(scope.tenant_id())?;
        let arena = lock(&arena_arc)?;
        let customer = arena
            .require_customer(customer_id)
            .map_err(|e| self.classify_missing(scope, *customer_id.as_uuid(), e))?;
        scope.ensure(customer)?;

        let debits: i64 = arena
            .sales
            .values()
            .filter(|s| s.customer_id == customer_id)
            .map(|s| s.total_amount)
            .sum();
        let credits: i64 = arena
            .payments
            .values()
            .filter(|p| p.customer_id == customer_id)
            .map(|p| p.amount)
            .sum();

        let derived = debits - credits;
        if customer.balance() != derived {
            return Err(DomainError::validation(format!(
                "ledger drift for customer {customer_id}: stored {}, derived {derived}",
                customer.balance()
            )));
        }
        Ok(())
    }
}
