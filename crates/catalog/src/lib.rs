//! `tradebook-catalog` — supplier registry and price list.
//!
//! The catalog is read by receiving reconciliation and sale costing but never
//! mutated by them; the only writers are the plain CRUD operations.

pub mod supplier;

pub use supplier::{ContactInfo, NewSupplier, Supplier, SupplierId, SupplierItem, SupplierItemId};
